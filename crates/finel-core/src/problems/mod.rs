//! Weak-form problem definitions.
//!
//! A `Problem` turns the physics (coefficients, material constants, load
//! functions) into filled element matrices. The formulation pass runs in
//! parallel over elements with rayon; each element's matrices are written
//! only by the worker that owns it, so there is no shared mutable state.

pub mod beam;
pub mod diffusion;
pub mod elasticity;
pub mod plane;
pub mod torsion;

pub use beam::{EulerBernoulliBeam, EulerBernoulliBeamNonLinear};
pub use diffusion::Diffusion1d;
pub use elasticity::Elasticity3d;
pub use plane::{PlaneStrain, PlaneStress};
pub use torsion::Torsion2d;

use crate::elements::Element;
use crate::error::{FemError, Result};
use crate::geometry::Geometry;
use log::info;
use rayon::prelude::*;
use std::sync::Arc;

/// Coefficient or load as a function of one physical coordinate.
pub type ScalarFn = Arc<dyn Fn(f64) -> f64 + Send + Sync>;

/// Coefficient or load as a function of a physical position.
pub type FieldFn = Arc<dyn Fn(&[f64]) -> f64 + Send + Sync>;

/// Wrap a constant as a coordinate function.
pub fn constant(value: f64) -> ScalarFn {
    Arc::new(move |_| value)
}

/// Wrap a constant as a position function.
pub fn constant_field(value: f64) -> FieldFn {
    Arc::new(move |_| value)
}

/// A physical model expressed as element-level weak-form integrals.
pub trait Problem: Sync {
    /// Human-readable model name for diagnostics.
    fn name(&self) -> &'static str;

    /// Dofs per node the model requires of the geometry.
    fn required_nvn(&self) -> usize;

    /// Number of elements the model's per-element material arrays cover.
    /// Models with purely functional coefficients return `None`.
    fn material_len(&self) -> Option<usize> {
        None
    }

    /// Integrate stiffness and load contributions into one element.
    ///
    /// Local matrices are already zeroed; `element.ue` holds the current
    /// solution estimate for formulations that depend on it.
    fn fill_element(&self, element: &mut Element) -> Result<()>;

    /// Integrate the element mass matrix. Models without inertia leave the
    /// default no-op.
    fn fill_mass(&self, _element: &mut Element) -> Result<()> {
        Ok(())
    }

    /// Formulate every element of the geometry.
    ///
    /// Re-entrant: nonlinear drivers call this once per iteration with the
    /// updated element solutions in place.
    fn fill_all(&self, geometry: &mut Geometry) -> Result<()> {
        if geometry.nvn != self.required_nvn() {
            return Err(FemError::NvnMismatch {
                problem: self.name(),
                required: self.required_nvn(),
                actual: geometry.nvn,
            });
        }
        if let Some(provided) = self.material_len() {
            if provided != geometry.elements.len() {
                return Err(FemError::MaterialLength {
                    problem: self.name(),
                    provided,
                    elements: geometry.elements.len(),
                });
            }
        }
        info!(
            "{}: formulating {} elements",
            self.name(),
            geometry.elements.len()
        );
        geometry.elements.par_iter_mut().try_for_each(|element| {
            element.reset_local_matrices();
            self.fill_element(element)?;
            self.fill_mass(element)
        })
    }
}
