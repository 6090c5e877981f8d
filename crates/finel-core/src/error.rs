//! Error taxonomy for the finite element engine.
//!
//! Element-local geometry errors abort only the formulation pass that hit
//! them; system-level errors (singular matrix, non-convergence) abort the
//! whole solve. Nothing is swallowed silently.

use thiserror::Error;

/// Result type alias used across the engine.
pub type Result<T> = std::result::Result<T, FemError>;

/// Errors raised by geometry construction, formulation, assembly and solve.
#[derive(Error, Debug)]
pub enum FemError {
    /// An element's Jacobian determinant is non-positive at a quadrature
    /// point. The element is inverted or collapsed; its matrices are unusable.
    #[error("degenerate element {element}: det(J) = {det_jac:.6e} at quadrature point {point}")]
    DegenerateElement {
        element: usize,
        point: usize,
        det_jac: f64,
    },

    /// Element connectivity references a node outside the node collection.
    #[error("element {element} references node {node}, but only {node_count} nodes exist")]
    InvalidConnectivity {
        element: usize,
        node: usize,
        node_count: usize,
    },

    /// Topology tag list and connectivity list disagree in length.
    #[error("{kinds} topology tags for {elements} connectivity rows")]
    KindCountMismatch { kinds: usize, elements: usize },

    /// A connectivity row's node count disagrees with its topology.
    #[error("element {element} ({kind}) lists {actual} nodes, topology has {expected}")]
    ElementArity {
        element: usize,
        kind: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A problem's per-element material arrays do not cover the mesh.
    #[error("{problem} carries material data for {provided} elements, geometry has {elements}")]
    MaterialLength {
        problem: &'static str,
        provided: usize,
        elements: usize,
    },

    /// A problem requires a specific dof-per-node count the geometry lacks.
    #[error("{problem} requires nvn = {required}, geometry has nvn = {actual}")]
    NvnMismatch {
        problem: &'static str,
        required: usize,
        actual: usize,
    },

    /// A boundary condition references a dof outside the assembled system.
    #[error("boundary condition targets dof {dof}, system has {dof_count} dofs")]
    BoundaryCondition { dof: usize, dof_count: usize },

    /// A segment or element index is out of range for the geometry.
    #[error("{what} index {index} out of range ({count} available)")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        count: usize,
    },

    /// Direct solve on a non-invertible stiffness matrix.
    #[error("singular system: {context}")]
    SingularSystem { context: &'static str },

    /// Iterative solve exceeded its cap. Carries the last iterate for
    /// diagnostics.
    #[error(
        "no convergence after {iterations} iterations (last relative change {last_change:.3e})"
    )]
    Convergence {
        iterations: usize,
        last_change: f64,
        last_iterate: Vec<f64>,
    },

    /// An operation that needs a mass matrix found none assembled.
    #[error("mass matrix not assembled; the problem must fill element mass matrices")]
    MissingMass,

    /// Unsupported element kind for the requested operation.
    #[error("element kind {kind} does not support {operation}")]
    UnsupportedKind {
        kind: &'static str,
        operation: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_context() {
        let err = FemError::DegenerateElement {
            element: 4,
            point: 2,
            det_jac: -0.5,
        };
        let text = err.to_string();
        assert!(text.contains("element 4"), "got: {}", text);
        assert!(text.contains("-5.0"), "got: {}", text);

        let err = FemError::NvnMismatch {
            problem: "PlaneStress",
            required: 2,
            actual: 1,
        };
        assert!(err.to_string().contains("nvn = 2"));
    }
}
