//! Plane stress and plane strain elasticity on 2-D meshes.
//!
//! Both models share the same weak form; only the reduction of the 3-D
//! constitutive law differs:
//! - plane stress: C11 = E/(1-v²), C12 = vE/(1-v²)
//! - plane strain: C11 = E(1-v)/((1+v)(1-2v)), C12 = Ev/((1+v)(1-2v))
//! - both: C66 = E/2/(1+v)
//!
//! Material constants and thickness are per-element arrays; scalar input
//! is broadcast once at construction. Dofs interleave node-major as
//! (u, v) per node.

use super::{constant_field, FieldFn, Problem};
use crate::elements::Element;
use crate::error::Result;
use crate::quadrature::Quadrature;
use nalgebra::DVector;

/// Shared plane-elasticity coefficients and integration.
struct PlaneCoefficients {
    c11: Vec<f64>,
    c12: Vec<f64>,
    c66: Vec<f64>,
    thickness: Vec<f64>,
    fx: FieldFn,
    fy: FieldFn,
}

impl PlaneCoefficients {
    /// Shortest of the coefficient arrays; the formulation must not index
    /// past it.
    fn len(&self) -> usize {
        self.c11.len().min(self.thickness.len())
    }

    fn fill(&self, element: &mut Element) -> Result<()> {
        let ee = element.index;
        let (c11, c12, c66) = (self.c11[ee], self.c12[ee], self.c66[ee]);
        let t = self.thickness[ee];
        let n = element.kind.node_count();
        for gp in element.integration_data()? {
            let scale = t * gp.det_jac * gp.weight;
            let x = gp.coords.as_slice();
            let (fx, fy) = ((self.fx)(x), (self.fy)(x));
            for i in 0..n {
                let (dxi, dyi) = (gp.dpx[(0, i)], gp.dpx[(1, i)]);
                for j in 0..n {
                    let (dxj, dyj) = (gp.dpx[(0, j)], gp.dpx[(1, j)]);
                    element.ke[(2 * i, 2 * j)] += (c11 * dxi * dxj + c66 * dyi * dyj) * scale;
                    element.ke[(2 * i, 2 * j + 1)] += (c12 * dxi * dyj + c66 * dyi * dxj) * scale;
                    element.ke[(2 * i + 1, 2 * j)] += (c12 * dyi * dxj + c66 * dxi * dyj) * scale;
                    element.ke[(2 * i + 1, 2 * j + 1)] +=
                        (c11 * dyi * dyj + c66 * dxi * dxj) * scale;
                }
                element.fe[2 * i] += gp.shape[i] * fx * scale;
                element.fe[2 * i + 1] += gp.shape[i] * fy * scale;
            }
        }
        self.integrate_edge_loads(element, t)
    }

    /// Line-integrate distributed edge loads into `fe`, using linear
    /// interpolation between the edge corner nodes. Load closures take the
    /// arc length measured from the owning segment's start.
    fn integrate_edge_loads(&self, element: &mut Element, t: f64) -> Result<()> {
        if element.edge_loads.is_empty() {
            return Ok(());
        }
        let nvn = element.nvn;
        let loads = element.edge_loads.clone();
        let rule = Quadrature::line(3);
        for load in &loads {
            let (a, b) = element.kind.edges()[load.edge];
            let (c0, c1) = element.edge_coords(load.edge)?;
            let len = (&c1 - &c0).norm();
            for p in &rule.points {
                let z = p.coords[0];
                let s = load.s0 + load.direction * 0.5 * (1.0 + z) * len;
                let (na, nb) = (0.5 * (1.0 - z), 0.5 * (1.0 + z));
                let ds = 0.5 * len * p.weight;
                for (v, component) in load.components.iter().enumerate() {
                    if let Some(f) = component {
                        let q = f(s) * t * ds;
                        element.fe[a * nvn + v] += q * na;
                        element.fe[b * nvn + v] += q * nb;
                    }
                }
            }
        }
        Ok(())
    }

    /// In-plane stresses at recovery points of a solved element:
    /// (sigma_xx, sigma_yy, sigma_xy) per point.
    fn stresses(&self, element: &Element, points: &[Vec<f64>]) -> Result<Vec<(DVector<f64>, [f64; 3])>> {
        let ee = element.index;
        let samples = element.recover_field(points)?;
        Ok(samples
            .into_iter()
            .map(|s| {
                let (dudx, dudy) = (s.gradient[(0, 0)], s.gradient[(0, 1)]);
                let (dvdx, dvdy) = (s.gradient[(1, 0)], s.gradient[(1, 1)]);
                let sx = self.c11[ee] * dudx + self.c12[ee] * dvdy;
                let sy = self.c12[ee] * dudx + self.c11[ee] * dvdy;
                let sxy = self.c66[ee] * (dudy + dvdx);
                (s.coords, [sx, sy, sxy])
            })
            .collect())
    }
}

fn broadcast(value: f64, count: usize) -> Vec<f64> {
    vec![value; count]
}

/// Plane stress: thin members, zero out-of-plane stress.
pub struct PlaneStress {
    coefficients: PlaneCoefficients,
}

impl PlaneStress {
    /// Uniform material: one (E, v, t) for every element.
    pub fn new(element_count: usize, e_modulus: f64, poisson: f64, thickness: f64) -> Self {
        Self::with_properties(
            broadcast(e_modulus, element_count),
            broadcast(poisson, element_count),
            broadcast(thickness, element_count),
        )
    }

    /// Per-element material arrays (one entry per element).
    pub fn with_properties(e_modulus: Vec<f64>, poisson: Vec<f64>, thickness: Vec<f64>) -> Self {
        let mut c11 = Vec::with_capacity(e_modulus.len());
        let mut c12 = Vec::with_capacity(e_modulus.len());
        let mut c66 = Vec::with_capacity(e_modulus.len());
        for (&e, &v) in e_modulus.iter().zip(poisson.iter()) {
            c11.push(e / (1.0 - v * v));
            c12.push(v * e / (1.0 - v * v));
            c66.push(e / 2.0 / (1.0 + v));
        }
        Self {
            coefficients: PlaneCoefficients {
                c11,
                c12,
                c66,
                thickness,
                fx: constant_field(0.0),
                fy: constant_field(0.0),
            },
        }
    }

    /// Set body load components.
    pub fn body_loads(mut self, fx: FieldFn, fy: FieldFn) -> Self {
        self.coefficients.fx = fx;
        self.coefficients.fy = fy;
        self
    }

    /// In-plane stresses of a solved element at natural recovery points.
    pub fn stresses(
        &self,
        element: &Element,
        points: &[Vec<f64>],
    ) -> Result<Vec<(DVector<f64>, [f64; 3])>> {
        self.coefficients.stresses(element, points)
    }
}

impl Problem for PlaneStress {
    fn name(&self) -> &'static str {
        "PlaneStress"
    }

    fn required_nvn(&self) -> usize {
        2
    }

    fn material_len(&self) -> Option<usize> {
        Some(self.coefficients.len())
    }

    fn fill_element(&self, element: &mut Element) -> Result<()> {
        self.coefficients.fill(element)
    }
}

/// Plane strain: long prismatic members, zero out-of-plane strain.
pub struct PlaneStrain {
    coefficients: PlaneCoefficients,
}

impl PlaneStrain {
    /// Uniform material: one (E, v) for every element. The out-of-plane
    /// thickness is unity.
    pub fn new(element_count: usize, e_modulus: f64, poisson: f64) -> Self {
        Self::with_properties(
            broadcast(e_modulus, element_count),
            broadcast(poisson, element_count),
        )
    }

    /// Per-element material arrays.
    pub fn with_properties(e_modulus: Vec<f64>, poisson: Vec<f64>) -> Self {
        let count = e_modulus.len();
        let mut c11 = Vec::with_capacity(count);
        let mut c12 = Vec::with_capacity(count);
        let mut c66 = Vec::with_capacity(count);
        for (&e, &v) in e_modulus.iter().zip(poisson.iter()) {
            let den = (1.0 + v) * (1.0 - 2.0 * v);
            c11.push(e * (1.0 - v) / den);
            c12.push(e * v / den);
            c66.push(e / 2.0 / (1.0 + v));
        }
        Self {
            coefficients: PlaneCoefficients {
                c11,
                c12,
                c66,
                thickness: broadcast(1.0, count),
                fx: constant_field(0.0),
                fy: constant_field(0.0),
            },
        }
    }

    /// Set body load components.
    pub fn body_loads(mut self, fx: FieldFn, fy: FieldFn) -> Self {
        self.coefficients.fx = fx;
        self.coefficients.fy = fy;
        self
    }

    /// In-plane stresses of a solved element at natural recovery points.
    pub fn stresses(
        &self,
        element: &Element,
        points: &[Vec<f64>],
    ) -> Result<Vec<(DVector<f64>, [f64; 3])>> {
        self.coefficients.stresses(element, points)
    }
}

impl Problem for PlaneStrain {
    fn name(&self) -> &'static str {
        "PlaneStrain"
    }

    fn required_nvn(&self) -> usize {
        2
    }

    fn material_len(&self) -> Option<usize> {
        Some(self.coefficients.len())
    }

    fn fill_element(&self, element: &mut Element) -> Result<()> {
        self.coefficients.fill(element)
    }
}
