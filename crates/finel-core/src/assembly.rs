//! Global system assembly: scatter-add of element matrices and boundary
//! condition application.
//!
//! Per-element contributions are gathered in parallel with rayon using a
//! fold/reduce over thread-local accumulators; the final global arrays are
//! produced by a single-writer merge, so no matrix is mutated from two
//! threads. Essential boundary conditions are applied by symmetric
//! elimination, which keeps the matrix symmetric and makes the prescribed
//! equation exact: after any direct solve, `u[dof] == value` bit-for-bit.

use crate::error::{FemError, Result};
use crate::geometry::Geometry;
use log::{debug, warn};
use nalgebra::{DMatrix, DVector};
use nalgebra_sparse::{CooMatrix, CscMatrix};
use rayon::prelude::*;

/// Resolve the essential BC list to at most one entry per dof.
///
/// Duplicates are legal; the last entry in authoring order wins and the
/// override is logged. Out-of-range dofs are rejected.
pub(crate) fn resolve_essential(geometry: &Geometry) -> Result<Vec<(usize, f64)>> {
    let dof_count = geometry.dof_count();
    let mut resolved: Vec<(usize, f64)> = Vec::new();
    for &(dof, value) in &geometry.cbe {
        if dof >= dof_count {
            return Err(FemError::BoundaryCondition { dof, dof_count });
        }
        if let Some(entry) = resolved.iter_mut().find(|(d, _)| *d == dof) {
            warn!(
                "duplicate essential condition on dof {}: {} overrides {}",
                dof, value, entry.1
            );
            entry.1 = value;
        } else {
            resolved.push((dof, value));
        }
    }
    Ok(resolved)
}

fn add_natural_loads(geometry: &Geometry, s: &mut DVector<f64>, factor: f64) -> Result<()> {
    let dof_count = geometry.dof_count();
    for &(dof, value) in &geometry.cbn {
        if dof >= dof_count {
            return Err(FemError::BoundaryCondition { dof, dof_count });
        }
        s[dof] += value * factor;
    }
    Ok(())
}

/// Dense global system K u = s, with an optional mass matrix M.
pub struct GlobalSystem {
    pub k: DMatrix<f64>,
    pub m: Option<DMatrix<f64>>,
    pub s: DVector<f64>,
    pub u: DVector<f64>,
    /// Essential conditions after duplicate resolution, in application order.
    pub constrained: Vec<(usize, f64)>,
}

impl GlobalSystem {
    /// Assemble from filled element matrices and apply both BC families.
    pub fn assemble(geometry: &Geometry) -> Result<Self> {
        Self::assemble_scaled(geometry, 1.0)
    }

    /// Assemble with every external load (element loads and natural BCs)
    /// scaled by `load_factor`. Essential values are not scaled; supports
    /// stay where they are under partial loading.
    pub fn assemble_scaled(geometry: &Geometry, load_factor: f64) -> Result<Self> {
        let dofs = geometry.dof_count();
        let has_mass = geometry.elements.iter().any(|e| e.me.is_some());
        let zero = || {
            (
                DMatrix::<f64>::zeros(dofs, dofs),
                has_mass.then(|| DMatrix::<f64>::zeros(dofs, dofs)),
                DVector::<f64>::zeros(dofs),
            )
        };
        let (k, m, mut s) = geometry
            .elements
            .par_iter()
            .fold(zero, |(mut k, mut m, mut s), element| {
                for (i, &gi) in element.dof_map.iter().enumerate() {
                    s[gi] += element.fe[i];
                    for (j, &gj) in element.dof_map.iter().enumerate() {
                        k[(gi, gj)] += element.ke[(i, j)];
                    }
                }
                if let (Some(m), Some(me)) = (m.as_mut(), element.me.as_ref()) {
                    for (i, &gi) in element.dof_map.iter().enumerate() {
                        for (j, &gj) in element.dof_map.iter().enumerate() {
                            m[(gi, gj)] += me[(i, j)];
                        }
                    }
                }
                (k, m, s)
            })
            .reduce(zero, |(k1, m1, s1), (k2, m2, s2)| {
                let m = match (m1, m2) {
                    (Some(a), Some(b)) => Some(a + b),
                    (a, b) => a.or(b),
                };
                (k1 + k2, m, s1 + s2)
            });
        s *= load_factor;
        add_natural_loads(geometry, &mut s, load_factor)?;
        debug!("assembled dense system: {} dofs, mass = {}", dofs, has_mass);

        let mut system = Self {
            k,
            m,
            s,
            u: DVector::zeros(dofs),
            constrained: resolve_essential(geometry)?,
        };
        system.apply_essential();
        Ok(system)
    }

    /// Symmetric elimination of the resolved essential conditions.
    fn apply_essential(&mut self) {
        let dofs = self.k.nrows();
        for &(dof, value) in &self.constrained {
            let column = self.k.column(dof).clone_owned();
            self.s -= column * value;
            for i in 0..dofs {
                self.k[(i, dof)] = 0.0;
                self.k[(dof, i)] = 0.0;
            }
            self.k[(dof, dof)] = 1.0;
            self.s[dof] = value;
        }
    }

    /// Indices not targeted by an essential condition, ascending.
    pub fn free_dofs(&self) -> Vec<usize> {
        let dofs = self.k.nrows();
        let mut constrained = vec![false; dofs];
        for &(dof, _) in &self.constrained {
            constrained[dof] = true;
        }
        (0..dofs).filter(|&i| !constrained[i]).collect()
    }
}

/// Sparse global system assembled through COO triplets into CSC.
///
/// Essential conditions are eliminated on the triplet stream before
/// conversion: rows and columns of constrained dofs never enter the
/// matrix, their load contribution moves to the right-hand side, and a
/// unit diagonal pins the prescribed value.
pub struct SparseGlobalSystem {
    pub k: CscMatrix<f64>,
    pub s: DVector<f64>,
    pub u: DVector<f64>,
    pub constrained: Vec<(usize, f64)>,
}

impl SparseGlobalSystem {
    pub fn assemble(geometry: &Geometry) -> Result<Self> {
        let dofs = geometry.dof_count();
        let constrained = resolve_essential(geometry)?;
        let mut prescribed: Vec<Option<f64>> = vec![None; dofs];
        for &(dof, value) in &constrained {
            prescribed[dof] = Some(value);
        }

        let mut s = DVector::zeros(dofs);
        add_natural_loads(geometry, &mut s, 1.0)?;
        let mut coo = CooMatrix::new(dofs, dofs);
        for element in &geometry.elements {
            for (i, &gi) in element.dof_map.iter().enumerate() {
                if prescribed[gi].is_some() {
                    continue;
                }
                s[gi] += element.fe[i];
                for (j, &gj) in element.dof_map.iter().enumerate() {
                    let value = element.ke[(i, j)];
                    match prescribed[gj] {
                        Some(prescribed_value) => s[gi] -= value * prescribed_value,
                        None => coo.push(gi, gj, value),
                    }
                }
            }
        }
        for &(dof, value) in &constrained {
            coo.push(dof, dof, 1.0);
            s[dof] = value;
        }
        debug!(
            "assembled sparse system: {} dofs, {} triplets",
            dofs,
            coo.nnz()
        );
        Ok(Self {
            k: CscMatrix::from(&coo),
            s,
            u: DVector::zeros(dofs),
            constrained,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::ElementKind;
    use crate::problems::{constant, Diffusion1d, Problem};
    use approx::assert_relative_eq;

    fn rod(elements: usize) -> Geometry {
        let nodes: Vec<Vec<f64>> = (0..=elements)
            .map(|i| vec![i as f64 / elements as f64])
            .collect();
        let connectivity: Vec<Vec<usize>> = (0..elements).map(|i| vec![i, i + 1]).collect();
        let kinds = vec![ElementKind::Line2; elements];
        Geometry::new(nodes, connectivity, kinds, 1, vec![]).unwrap()
    }

    fn filled_rod(elements: usize) -> Geometry {
        let mut g = rod(elements);
        let p = Diffusion1d::new(constant(1.0), constant(0.0), constant(1.0));
        p.fill_all(&mut g).unwrap();
        g
    }

    #[test]
    fn scatter_add_accumulates_shared_nodes() {
        let g = filled_rod(2);
        let system = GlobalSystem::assemble(&g).unwrap();
        // Interior node receives stiffness from both elements: 2 + 2.
        assert_relative_eq!(system.k[(1, 1)], 4.0, epsilon = 1e-12);
        assert_relative_eq!(system.k[(0, 0)], 2.0, epsilon = 1e-12);
        // Load: h/2 per adjacent element.
        assert_relative_eq!(system.s[1], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn essential_elimination_decouples_the_dof() {
        let mut g = filled_rod(2);
        g.add_essential_bc(0, 0.25).unwrap();
        let system = GlobalSystem::assemble(&g).unwrap();
        assert_eq!(system.k[(0, 0)], 1.0);
        assert_eq!(system.k[(0, 1)], 0.0);
        assert_eq!(system.k[(1, 0)], 0.0);
        assert_eq!(system.s[0], 0.25);
        // The neighbor's rhs picked up the eliminated column.
        assert_relative_eq!(system.s[1], 0.5 + 2.0 * 0.25, epsilon = 1e-12);
    }

    #[test]
    fn duplicate_essential_last_write_wins() {
        let mut g = filled_rod(2);
        g.add_essential_bc(0, 1.0).unwrap();
        g.add_essential_bc(0, 3.0).unwrap();
        let system = GlobalSystem::assemble(&g).unwrap();
        assert_eq!(system.constrained, vec![(0, 3.0)]);
        assert_eq!(system.s[0], 3.0);
    }

    #[test]
    fn natural_loads_add_to_rhs() {
        let mut g = filled_rod(2);
        g.add_natural_bc(2, 7.0).unwrap();
        let system = GlobalSystem::assemble(&g).unwrap();
        assert_relative_eq!(system.s[2], 0.25 + 7.0, epsilon = 1e-12);
    }

    #[test]
    fn load_factor_scales_external_loads_only() {
        let mut g = filled_rod(2);
        g.add_natural_bc(2, 4.0).unwrap();
        g.add_essential_bc(0, 0.5).unwrap();
        let system = GlobalSystem::assemble_scaled(&g, 0.5).unwrap();
        // Element load and nodal load halved; prescribed value untouched.
        assert_relative_eq!(system.s[2], 0.5 * (0.25 + 4.0), epsilon = 1e-12);
        assert_eq!(system.s[0], 0.5);
    }

    #[test]
    fn sparse_assembly_matches_dense() {
        let mut g = filled_rod(4);
        g.add_essential_bc(0, 0.0).unwrap();
        g.add_essential_bc(4, 1.0).unwrap();
        let dense = GlobalSystem::assemble(&g).unwrap();
        let sparse = SparseGlobalSystem::assemble(&g).unwrap();
        let recovered = nalgebra_sparse::convert::serial::convert_csc_dense(&sparse.k);
        assert_relative_eq!(
            (recovered - &dense.k).norm(),
            0.0,
            epsilon = 1e-12
        );
        assert_relative_eq!((&sparse.s - &dense.s).norm(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn free_dofs_excludes_constrained() {
        let mut g = filled_rod(3);
        g.add_essential_bc(0, 0.0).unwrap();
        g.add_essential_bc(3, 0.0).unwrap();
        let system = GlobalSystem::assemble(&g).unwrap();
        assert_eq!(system.free_dofs(), vec![1, 2]);
    }
}
