//! Finite element analysis engine.
//!
//! The pipeline is: build a [`Geometry`] (nodes, connectivity, boundary
//! conditions), pick a [`Problem`] (the physical model that fills element
//! matrices), then run a [`Solver`] which assembles the global system,
//! applies boundary conditions and scatters the solution back onto the
//! elements for recovery.

pub mod assembly;
pub mod elements;
pub mod error;
pub mod geometry;
pub mod problems;
pub mod quadrature;
pub mod solver;

pub use assembly::{GlobalSystem, SparseGlobalSystem};
pub use elements::{Element, ElementKind, FieldSample};
pub use error::{FemError, Result};
pub use geometry::Geometry;
pub use problems::{
    Diffusion1d, Elasticity3d, EulerBernoulliBeam, EulerBernoulliBeamNonLinear, PlaneStrain,
    PlaneStress, Problem, Torsion2d,
};
pub use quadrature::{Quadrature, QuadraturePoint};
pub use solver::{solve_eigen, EigenSolution, Solver};
