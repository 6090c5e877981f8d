//! Isotropic 3-D elasticity with a B-matrix formulation and an optional
//! consistent mass matrix for vibration eigenproblems.

use super::{constant_field, FieldFn, Problem};
use crate::elements::Element;
use crate::error::Result;
use nalgebra::DMatrix;

/// Linear elasticity on tetrahedral or hexahedral meshes, nvn = 3.
///
/// The 6x6 constitutive matrix is built from the Lamé constants
/// λ = Ev/((1+v)(1-2v)) and μ = E/2/(1+v) per element. Strain ordering is
/// (εxx, εyy, εzz, γxy, γxz, γyz).
pub struct Elasticity3d {
    lambda: Vec<f64>,
    mu: Vec<f64>,
    density: Option<Vec<f64>>,
    fx: FieldFn,
    fy: FieldFn,
    fz: FieldFn,
}

impl Elasticity3d {
    /// Uniform material: one (E, v) for every element.
    pub fn new(element_count: usize, e_modulus: f64, poisson: f64) -> Self {
        Self::with_properties(
            vec![e_modulus; element_count],
            vec![poisson; element_count],
        )
    }

    /// Per-element material arrays.
    pub fn with_properties(e_modulus: Vec<f64>, poisson: Vec<f64>) -> Self {
        let mut lambda = Vec::with_capacity(e_modulus.len());
        let mut mu = Vec::with_capacity(e_modulus.len());
        for (&e, &v) in e_modulus.iter().zip(poisson.iter()) {
            lambda.push(e * v / (1.0 + v) / (1.0 - 2.0 * v));
            mu.push(e / 2.0 / (1.0 + v));
        }
        Self {
            lambda,
            mu,
            density: None,
            fx: constant_field(0.0),
            fy: constant_field(0.0),
            fz: constant_field(0.0),
        }
    }

    /// Enable consistent mass assembly with a uniform density.
    pub fn density(mut self, rho: f64) -> Self {
        let count = self.lambda.len();
        self.density = Some(vec![rho; count]);
        self
    }

    /// Set body load components.
    pub fn body_loads(mut self, fx: FieldFn, fy: FieldFn, fz: FieldFn) -> Self {
        self.fx = fx;
        self.fy = fy;
        self.fz = fz;
        self
    }

    fn constitutive(&self, element: usize) -> DMatrix<f64> {
        let (ld, mu) = (self.lambda[element], self.mu[element]);
        let mut c = DMatrix::zeros(6, 6);
        for i in 0..3 {
            for j in 0..3 {
                c[(i, j)] = if i == j { 2.0 * mu + ld } else { ld };
            }
            c[(3 + i, 3 + i)] = mu;
        }
        c
    }

    /// Strain-displacement matrix at one quadrature point, node-major
    /// column layout (u, v, w per node).
    fn b_matrix(dpx: &DMatrix<f64>, nodes: usize) -> DMatrix<f64> {
        let mut b = DMatrix::zeros(6, 3 * nodes);
        for i in 0..nodes {
            let (dx, dy, dz) = (dpx[(0, i)], dpx[(1, i)], dpx[(2, i)]);
            b[(0, 3 * i)] = dx;
            b[(1, 3 * i + 1)] = dy;
            b[(2, 3 * i + 2)] = dz;
            b[(3, 3 * i)] = dy;
            b[(3, 3 * i + 1)] = dx;
            b[(4, 3 * i)] = dz;
            b[(4, 3 * i + 2)] = dx;
            b[(5, 3 * i + 1)] = dz;
            b[(5, 3 * i + 2)] = dy;
        }
        b
    }
}

impl Problem for Elasticity3d {
    fn name(&self) -> &'static str {
        "Elasticity3d"
    }

    fn required_nvn(&self) -> usize {
        3
    }

    fn material_len(&self) -> Option<usize> {
        let len = self.lambda.len();
        Some(match &self.density {
            Some(density) => len.min(density.len()),
            None => len,
        })
    }

    fn fill_element(&self, element: &mut Element) -> Result<()> {
        let c = self.constitutive(element.index);
        let n = element.kind.node_count();
        for gp in element.integration_data()? {
            let scale = gp.det_jac * gp.weight;
            let b = Self::b_matrix(&gp.dpx, n);
            element.ke += (b.transpose() * &c * &b) * scale;
            let x = gp.coords.as_slice();
            let f = [(self.fx)(x), (self.fy)(x), (self.fz)(x)];
            for i in 0..n {
                for (v, fv) in f.iter().enumerate() {
                    element.fe[3 * i + v] += gp.shape[i] * fv * scale;
                }
            }
        }
        Ok(())
    }

    fn fill_mass(&self, element: &mut Element) -> Result<()> {
        let Some(density) = &self.density else {
            return Ok(());
        };
        let rho = density[element.index];
        let n = element.kind.node_count();
        let dofs = element.dof_count();
        let mut me = DMatrix::zeros(dofs, dofs);
        for gp in element.integration_data()? {
            let scale = rho * gp.det_jac * gp.weight;
            for i in 0..n {
                for j in 0..n {
                    let mass = gp.shape[i] * gp.shape[j] * scale;
                    for v in 0..3 {
                        me[(3 * i + v, 3 * j + v)] += mass;
                    }
                }
            }
        }
        element.me = Some(me);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::ElementKind;
    use approx::assert_relative_eq;
    use nalgebra::DVector;

    fn unit_tet() -> Element {
        let coords = DMatrix::from_row_slice(
            4,
            3,
            &[
                0.0, 0.0, 0.0, //
                1.0, 0.0, 0.0, //
                0.0, 1.0, 0.0, //
                0.0, 0.0, 1.0,
            ],
        );
        Element::new(ElementKind::Tet4, 0, coords, 3, (0..12).collect())
    }

    #[test]
    fn stiffness_is_symmetric_positive_semidefinite() {
        let mut e = unit_tet();
        let p = Elasticity3d::new(1, 200.0, 0.3);
        p.fill_element(&mut e).unwrap();
        for i in 0..12 {
            for j in 0..12 {
                assert_relative_eq!(e.ke[(i, j)], e.ke[(j, i)], epsilon = 1e-9);
            }
        }
        // Rigid translations carry no strain energy.
        for v in 0..3 {
            let mode = DVector::from_fn(12, |i, _| if i % 3 == v { 1.0 } else { 0.0 });
            let energy = (mode.transpose() * &e.ke * &mode)[(0, 0)];
            assert!(energy.abs() < 1e-10, "translation {v} energy {energy}");
        }
    }

    #[test]
    fn mass_matrix_integrates_total_mass() {
        let rho = 7850.0;
        let mut e = unit_tet();
        let p = Elasticity3d::new(1, 200.0, 0.3).density(rho);
        p.fill_element(&mut e).unwrap();
        p.fill_mass(&mut e).unwrap();
        let me = e.me.as_ref().unwrap();
        // Sum over one displacement direction equals rho * volume.
        let mut total = 0.0;
        for i in 0..4 {
            for j in 0..4 {
                total += me[(3 * i, 3 * j)];
            }
        }
        assert_relative_eq!(total, rho / 6.0, epsilon = 1e-9);
    }

    #[test]
    fn body_load_splits_volume_force() {
        let p = Elasticity3d::new(1, 200.0, 0.3).body_loads(
            constant_field(0.0),
            constant_field(0.0),
            constant_field(-6.0),
        );
        let mut e = unit_tet();
        p.fill_element(&mut e).unwrap();
        let fz: f64 = (0..4).map(|i| e.fe[3 * i + 2]).sum();
        // total = fz * volume = -6 * 1/6
        assert_relative_eq!(fz, -1.0, epsilon = 1e-12);
        assert_relative_eq!(e.fe[0], 0.0, epsilon = 1e-12);
    }
}
