//! Solution drivers: dense and sparse direct solves, generalized
//! eigenvalue extraction, and an incremental load-control driver for
//! nonlinear problems.
//!
//! Every successful solve scatters the global solution back onto the
//! elements (`set_solution`) before returning, so post-processing can
//! recover fields immediately.

use crate::assembly::{GlobalSystem, SparseGlobalSystem};
use crate::error::{FemError, Result};
use crate::geometry::Geometry;
use crate::problems::Problem;
use log::{debug, info};
use nalgebra::{Cholesky, DMatrix, DVector, SymmetricEigen};
use nalgebra_sparse::factorization::CscCholesky;

/// Eigenpairs of the generalized problem K φ = λ M φ.
#[derive(Debug)]
pub struct EigenSolution {
    /// Eigenvalues sorted ascending.
    pub values: DVector<f64>,
    /// Mode shapes as columns, index-matched to `values`. Constrained
    /// dofs carry zeros.
    pub vectors: DMatrix<f64>,
}

/// Solution strategy for linear and incremental problems.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Solver {
    /// Dense LU factorization. Handles the nonsymmetric tangents of the
    /// nonlinear beam formulation.
    DenseDirect,
    /// Sparse Cholesky on the BC-eliminated matrix. Requires a symmetric
    /// positive definite system.
    SparseDirect,
    /// Incremental load control: the external load is applied in equal
    /// increments, each converged by fixed-point re-formulation from the
    /// current solution.
    LoadControl {
        increments: usize,
        max_iterations: usize,
        tolerance: f64,
    },
}

impl Solver {
    /// Formulate, assemble and solve; returns the global solution vector.
    pub fn run(&self, problem: &dyn Problem, geometry: &mut Geometry) -> Result<DVector<f64>> {
        match *self {
            Self::DenseDirect => {
                info!("dense direct solve: {}", problem.name());
                problem.fill_all(geometry)?;
                let system = GlobalSystem::assemble(geometry)?;
                let u = solve_dense(&system.k, &system.s)?;
                scatter(geometry, &u);
                info!("dense direct solve finished");
                Ok(u)
            }
            Self::SparseDirect => {
                info!("sparse direct solve: {}", problem.name());
                problem.fill_all(geometry)?;
                let system = SparseGlobalSystem::assemble(geometry)?;
                let u = solve_sparse(&system)?;
                scatter(geometry, &u);
                info!("sparse direct solve finished");
                Ok(u)
            }
            Self::LoadControl {
                increments,
                max_iterations,
                tolerance,
            } => load_control(
                problem,
                geometry,
                increments.max(1),
                max_iterations,
                tolerance,
            ),
        }
    }
}

fn solve_dense(k: &DMatrix<f64>, s: &DVector<f64>) -> Result<DVector<f64>> {
    k.clone().lu().solve(s).ok_or(FemError::SingularSystem {
        context: "dense LU factorization failed",
    })
}

fn solve_sparse(system: &SparseGlobalSystem) -> Result<DVector<f64>> {
    let factor = CscCholesky::factor(&system.k).map_err(|_| FemError::SingularSystem {
        context: "sparse Cholesky factorization failed",
    })?;
    let rhs = DMatrix::from_column_slice(system.s.len(), 1, system.s.as_slice());
    let solution = factor.solve(&rhs);
    Ok(DVector::from_column_slice(solution.as_slice()))
}

fn scatter(geometry: &mut Geometry, u: &DVector<f64>) {
    for element in &mut geometry.elements {
        element.set_solution(u);
    }
}

/// Incremental nonlinear driver.
///
/// Per increment the external load is scaled to `inc / increments`; the
/// increment converges when the relative solution change drops under the
/// tolerance. Exceeding the iteration cap aborts with the last iterate
/// attached for diagnostics.
fn load_control(
    problem: &dyn Problem,
    geometry: &mut Geometry,
    increments: usize,
    max_iterations: usize,
    tolerance: f64,
) -> Result<DVector<f64>> {
    info!(
        "load control: {} increments, cap {} iterations, tolerance {:.1e}",
        increments, max_iterations, tolerance
    );
    let mut u = DVector::zeros(geometry.dof_count());
    for inc in 1..=increments {
        let factor = inc as f64 / increments as f64;
        let mut converged = false;
        let mut last_change = f64::INFINITY;
        for iteration in 1..=max_iterations {
            problem.fill_all(geometry)?;
            let system = GlobalSystem::assemble_scaled(geometry, factor)?;
            let next = solve_dense(&system.k, &system.s)?;
            last_change = (&next - &u).norm() / next.norm().max(1.0);
            u = next;
            scatter(geometry, &u);
            debug!(
                "increment {} iteration {}: relative change {:.3e}",
                inc, iteration, last_change
            );
            if last_change < tolerance {
                converged = true;
                break;
            }
        }
        if !converged {
            return Err(FemError::Convergence {
                iterations: max_iterations,
                last_change,
                last_iterate: u.as_slice().to_vec(),
            });
        }
        info!("increment {}/{} converged", inc, increments);
    }
    Ok(u)
}

/// Solve the generalized eigenproblem K φ = λ M φ for the smallest modes.
///
/// The problem must fill element mass matrices. Constrained dofs are
/// removed, M is Cholesky-factored (M = L Lᵀ) and the reduced standard
/// problem L⁻¹ K L⁻ᵀ y = λ y is handed to `SymmetricEigen`; mode shapes
/// are back-transformed as φ = L⁻ᵀ y and padded with zeros at the
/// constrained dofs.
pub fn solve_eigen(
    problem: &dyn Problem,
    geometry: &mut Geometry,
    modes: usize,
) -> Result<EigenSolution> {
    info!("eigen solve: {} modes of {}", modes, problem.name());
    problem.fill_all(geometry)?;
    let system = GlobalSystem::assemble(geometry)?;
    let m = system.m.as_ref().ok_or(FemError::MissingMass)?;

    let free = system.free_dofs();
    let k_ff = system.k.select_rows(&free).select_columns(&free);
    let m_ff = m.select_rows(&free).select_columns(&free);

    let chol = Cholesky::new(m_ff).ok_or(FemError::SingularSystem {
        context: "mass matrix is not positive definite",
    })?;
    let l = chol.l();
    // A = L⁻¹ K L⁻ᵀ, symmetric by construction.
    let y = l
        .solve_lower_triangular(&k_ff)
        .ok_or(FemError::SingularSystem {
            context: "mass Cholesky forward solve failed",
        })?;
    let a = l
        .solve_lower_triangular(&y.transpose())
        .ok_or(FemError::SingularSystem {
            context: "mass Cholesky forward solve failed",
        })?
        .transpose();
    let eigen = SymmetricEigen::new(a);

    let mut order: Vec<usize> = (0..eigen.eigenvalues.len()).collect();
    order.sort_by(|&a, &b| {
        eigen.eigenvalues[a]
            .partial_cmp(&eigen.eigenvalues[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let count = modes.min(order.len());
    let lt = l.transpose();

    let mut values = DVector::zeros(count);
    let mut vectors = DMatrix::zeros(system.k.nrows(), count);
    for (col, &idx) in order.iter().take(count).enumerate() {
        values[col] = eigen.eigenvalues[idx];
        let y = eigen.eigenvectors.column(idx).clone_owned();
        let phi = lt
            .solve_upper_triangular(&y)
            .ok_or(FemError::SingularSystem {
                context: "mass Cholesky back substitution failed",
            })?;
        for (row, &dof) in free.iter().enumerate() {
            vectors[(dof, col)] = phi[row];
        }
    }
    info!("eigen solve finished: {} modes", count);
    Ok(EigenSolution { values, vectors })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::ElementKind;
    use crate::problems::{constant, Diffusion1d};
    use approx::assert_relative_eq;

    fn rod(elements: usize) -> Geometry {
        let nodes: Vec<Vec<f64>> = (0..=elements)
            .map(|i| vec![i as f64 / elements as f64])
            .collect();
        let connectivity: Vec<Vec<usize>> = (0..elements).map(|i| vec![i, i + 1]).collect();
        let kinds = vec![ElementKind::Line2; elements];
        Geometry::new(nodes, connectivity, kinds, 1, vec![]).unwrap()
    }

    #[test]
    fn dense_and_sparse_agree() {
        let p = Diffusion1d::new(constant(1.0), constant(0.0), constant(1.0));
        let mut g1 = rod(8);
        g1.add_essential_bc(0, 0.0).unwrap();
        g1.add_essential_bc(8, 0.0).unwrap();
        let mut g2 = rod(8);
        g2.add_essential_bc(0, 0.0).unwrap();
        g2.add_essential_bc(8, 0.0).unwrap();
        let u_dense = Solver::DenseDirect.run(&p, &mut g1).unwrap();
        let u_sparse = Solver::SparseDirect.run(&p, &mut g2).unwrap();
        assert_relative_eq!((u_dense - u_sparse).norm(), 0.0, epsilon = 1e-10);
    }

    #[test]
    fn prescribed_values_are_bit_exact() {
        let p = Diffusion1d::new(constant(1.0), constant(0.0), constant(1.0));
        let mut g = rod(4);
        g.add_essential_bc(0, 0.125).unwrap();
        g.add_essential_bc(4, -2.5).unwrap();
        let u = Solver::DenseDirect.run(&p, &mut g).unwrap();
        assert_eq!(u[0], 0.125);
        assert_eq!(u[4], -2.5);
    }

    #[test]
    fn singular_system_is_reported() {
        // No essential conditions: pure Neumann Laplacian is singular.
        let p = Diffusion1d::new(constant(1.0), constant(0.0), constant(1.0));
        let mut g = rod(3);
        let err = Solver::DenseDirect.run(&p, &mut g).unwrap_err();
        assert!(matches!(err, FemError::SingularSystem { .. }));
    }

    #[test]
    fn solution_is_scattered_to_elements() {
        let p = Diffusion1d::new(constant(1.0), constant(0.0), constant(1.0));
        let mut g = rod(4);
        g.add_essential_bc(0, 0.0).unwrap();
        g.add_essential_bc(4, 0.0).unwrap();
        let u = Solver::DenseDirect.run(&p, &mut g).unwrap();
        assert_eq!(g.elements[1].ue[0], u[1]);
        assert_eq!(g.elements[1].ue[1], u[2]);
    }
}
