//! Element abstraction: local geometry, Jacobian mapping, local matrices
//! and solution recovery.
//!
//! An element owns its node coordinates, its precomputed local-to-global
//! dof map and its dense local matrices. Problems fill `ke`/`fe` (and `me`
//! for eigenproblems) by numerical integration; solvers write `ue` back
//! exactly once per solve.

pub mod shapes;

use crate::error::{FemError, Result};
use crate::quadrature::Quadrature;
use nalgebra::{DMatrix, DVector};
use std::sync::Arc;

pub use shapes::{hermite, hermite_derivatives, shape, shape_derivatives, ElementKind};

/// Scalar load profile along a boundary edge, parameterized by arc length
/// measured from the segment start.
pub type LoadFn = Arc<dyn Fn(f64) -> f64 + Send + Sync>;

/// A distributed load registered on one boundary edge of an element.
#[derive(Clone)]
pub struct EdgeLoad {
    /// Local edge index into `ElementKind::edges`.
    pub edge: usize,
    /// Arc-length offset of the edge start from the segment start.
    pub s0: f64,
    /// +1 when the edge runs with the segment direction, -1 against it.
    pub direction: f64,
    /// Load component per solution variable (index = variable number).
    pub components: Vec<Option<LoadFn>>,
}

/// Geometry and shape data evaluated at one quadrature point.
#[derive(Debug, Clone)]
pub struct GaussPointData {
    /// Physical coordinates of the point.
    pub coords: DVector<f64>,
    /// Shape function values, one per node.
    pub shape: DVector<f64>,
    /// Jacobian determinant (strictly positive).
    pub det_jac: f64,
    /// Shape derivatives in physical coordinates (dimension x nodes).
    pub dpx: DMatrix<f64>,
    /// Quadrature weight.
    pub weight: f64,
}

/// Interpolated solution data at one query point.
#[derive(Debug, Clone)]
pub struct FieldSample {
    /// Physical coordinates of the query point.
    pub coords: DVector<f64>,
    /// Interpolated field value, one entry per solution variable.
    pub value: DVector<f64>,
    /// Physical gradient, row = variable, column = spatial direction.
    pub gradient: DMatrix<f64>,
}

/// One finite element: topology, node coordinates, dof map, local system.
#[derive(Clone)]
pub struct Element {
    pub kind: ElementKind,
    /// Position of this element in the geometry's element list.
    pub index: usize,
    /// Node coordinates, one row per node.
    pub coords: DMatrix<f64>,
    /// Dofs per node.
    pub nvn: usize,
    /// Global dof indices, node-major: node0 vars, node1 vars, ...
    pub dof_map: Vec<usize>,
    /// Full integration rule.
    pub quadrature: Quadrature,
    /// Reduced rule for formulations that need selective integration.
    pub reduced: Quadrature,
    /// Local stiffness, zeroed at the start of every formulation pass.
    pub ke: DMatrix<f64>,
    /// Local load vector.
    pub fe: DVector<f64>,
    /// Local mass matrix, only filled by problems that need one.
    pub me: Option<DMatrix<f64>>,
    /// Local solution slice, written once per solve.
    pub ue: DVector<f64>,
    /// Distributed loads registered on boundary edges.
    pub edge_loads: Vec<EdgeLoad>,
}

impl std::fmt::Debug for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Element")
            .field("kind", &self.kind)
            .field("index", &self.index)
            .field("nodes", &self.coords.nrows())
            .field("nvn", &self.nvn)
            .field("edge_loads", &self.edge_loads.len())
            .finish()
    }
}

impl Element {
    /// Build an element from its topology, coordinates and dof map.
    pub fn new(
        kind: ElementKind,
        index: usize,
        coords: DMatrix<f64>,
        nvn: usize,
        dof_map: Vec<usize>,
    ) -> Self {
        let dofs = kind.node_count() * nvn;
        debug_assert_eq!(dof_map.len(), dofs);
        Self {
            kind,
            index,
            coords,
            nvn,
            dof_map,
            quadrature: kind.default_quadrature(),
            reduced: kind.reduced_quadrature(),
            ke: DMatrix::zeros(dofs, dofs),
            fe: DVector::zeros(dofs),
            me: None,
            ue: DVector::zeros(dofs),
            edge_loads: Vec::new(),
        }
    }

    /// Total dof count of the local system.
    pub fn dof_count(&self) -> usize {
        self.kind.node_count() * self.nvn
    }

    /// Physical element length (meaningful for 1-D kinds).
    pub fn length(&self) -> f64 {
        let first = self.coords.row(0);
        let last = self.coords.row(self.coords.nrows() - 1);
        // For Line3 the end node is the second entry, mid node last.
        let end = if self.kind == ElementKind::Line3 {
            self.coords.row(1)
        } else {
            last
        };
        (end - first).norm()
    }

    /// Zero the local matrices before a formulation pass.
    pub fn reset_local_matrices(&mut self) {
        let dofs = self.dof_count();
        self.ke = DMatrix::zeros(dofs, dofs);
        self.fe = DVector::zeros(dofs);
        if self.me.is_some() {
            self.me = Some(DMatrix::zeros(dofs, dofs));
        }
    }

    /// Jacobian matrix and natural shape derivatives at a natural point.
    ///
    /// J[r][c] = sum_i dN[r][i] * coords[i][c], the derivative of physical
    /// coordinate c with respect to natural coordinate r.
    pub fn jacobian(&self, z: &[f64]) -> (DMatrix<f64>, DMatrix<f64>) {
        let dn = shape_derivatives(self.kind, z);
        let j = &dn * &self.coords;
        (j, dn)
    }

    /// Isoparametric map from natural to physical coordinates.
    pub fn global_coords(&self, z: &[f64]) -> DVector<f64> {
        let n = shape(self.kind, z);
        let dim = self.coords.ncols();
        let mut x = DVector::zeros(dim);
        for i in 0..self.coords.nrows() {
            for d in 0..dim {
                x[d] += n[i] * self.coords[(i, d)];
            }
        }
        x
    }

    /// Shape derivatives in physical coordinates: J^-1 * dN.
    ///
    /// Fails with a geometry error when det(J) is non-positive; `point` is
    /// the caller's sample index, reported in the error.
    pub fn physical_derivatives(&self, z: &[f64], point: usize) -> Result<(f64, DMatrix<f64>)> {
        let (j, dn) = self.jacobian(z);
        let det = j.determinant();
        if det <= 0.0 {
            return Err(FemError::DegenerateElement {
                element: self.index,
                point,
                det_jac: det,
            });
        }
        let j_inv = j.try_inverse().ok_or(FemError::DegenerateElement {
            element: self.index,
            point,
            det_jac: det,
        })?;
        Ok((det, j_inv * dn))
    }

    /// Evaluate geometry and shape data at every point of a rule.
    ///
    /// This is the preamble of every weak-form integration: physical
    /// coordinates, shape values, det(J) and physical derivatives per
    /// quadrature point. A non-positive determinant anywhere aborts with
    /// the offending point index.
    pub fn integration_data_for(&self, rule: &Quadrature) -> Result<Vec<GaussPointData>> {
        let mut data = Vec::with_capacity(rule.len());
        for (k, point) in rule.points.iter().enumerate() {
            let (j, dn) = self.jacobian(&point.coords);
            let det = j.determinant();
            if det <= 0.0 {
                return Err(FemError::DegenerateElement {
                    element: self.index,
                    point: k,
                    det_jac: det,
                });
            }
            let j_inv = j.try_inverse().ok_or(FemError::DegenerateElement {
                element: self.index,
                point: k,
                det_jac: det,
            })?;
            data.push(GaussPointData {
                coords: self.global_coords(&point.coords),
                shape: shape(self.kind, &point.coords),
                det_jac: det,
                dpx: j_inv * dn,
                weight: point.weight,
            });
        }
        Ok(data)
    }

    /// Integration data for the element's full rule.
    pub fn integration_data(&self) -> Result<Vec<GaussPointData>> {
        self.integration_data_for(&self.quadrature)
    }

    /// Copy this element's dof slice out of the global solution.
    pub fn set_solution(&mut self, global_u: &DVector<f64>) {
        for (local, &global) in self.dof_map.iter().enumerate() {
            self.ue[local] = global_u[global];
        }
    }

    /// Interpolate the solved field and its physical gradient at arbitrary
    /// natural points. Not tied to the quadrature set; callers drive it for
    /// stress recovery and plotting.
    pub fn recover_field(&self, points: &[Vec<f64>]) -> Result<Vec<FieldSample>> {
        if self.kind == ElementKind::BeamHermite {
            return Err(FemError::UnsupportedKind {
                kind: self.kind.name(),
                operation: "recover_field (use recover_bending)",
            });
        }
        let dim = self.coords.ncols();
        let mut samples = Vec::with_capacity(points.len());
        for (k, z) in points.iter().enumerate() {
            let n = shape(self.kind, z);
            let (_, dpx) = self.physical_derivatives(z, k)?;
            let mut value = DVector::zeros(self.nvn);
            let mut gradient = DMatrix::zeros(self.nvn, dim);
            for i in 0..self.kind.node_count() {
                for v in 0..self.nvn {
                    let u = self.ue[i * self.nvn + v];
                    value[v] += n[i] * u;
                    for d in 0..dim {
                        gradient[(v, d)] += dpx[(d, i)] * u;
                    }
                }
            }
            samples.push(FieldSample {
                coords: self.global_coords(z),
                value,
                gradient,
            });
        }
        Ok(samples)
    }

    /// Bending recovery for Hermite beam elements: deflection plus its
    /// first three physical derivatives (rotation, moment and shear up to
    /// the EI factor) at arbitrary natural points.
    pub fn recover_bending(&self, points: &[f64]) -> Result<Vec<(DVector<f64>, [f64; 4])>> {
        if self.kind != ElementKind::BeamHermite {
            return Err(FemError::UnsupportedKind {
                kind: self.kind.name(),
                operation: "recover_bending",
            });
        }
        let he = self.length();
        // Bending dofs are (w, t) per node; with nvn = 3 the axial dof
        // comes first and the bending pair follows.
        let offset = self.nvn - 2;
        let flex = [offset, offset + 1, self.nvn + offset, self.nvn + offset + 1];
        let mut out = Vec::with_capacity(points.len());
        for &z in points {
            let h = hermite(z, he);
            let dh = hermite_derivatives(z, he);
            let mut w = 0.0;
            let mut dw = [0.0; 3];
            for (a, &dof) in flex.iter().enumerate() {
                let u = self.ue[dof];
                w += h[a] * u;
                for k in 0..3 {
                    dw[k] += dh[k][a] * u;
                }
            }
            out.push((self.global_coords(&[z]), [w, dw[0], dw[1], dw[2]]));
        }
        Ok(out)
    }

    /// Corner coordinates of a boundary edge (2-D kinds only).
    pub fn edge_coords(&self, edge: usize) -> Result<(DVector<f64>, DVector<f64>)> {
        let edges = self.kind.edges();
        let (a, b) = *edges.get(edge).ok_or(FemError::IndexOutOfRange {
            what: "edge",
            index: edge,
            count: edges.len(),
        })?;
        Ok((
            self.coords.row(a).transpose(),
            self.coords.row(b).transpose(),
        ))
    }
}
