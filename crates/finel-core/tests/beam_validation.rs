//! Beam bending validation against classical closed-form solutions.

use approx::assert_relative_eq;
use finel_core::problems::constant;
use finel_core::{
    ElementKind, EulerBernoulliBeam, EulerBernoulliBeamNonLinear, Geometry, Solver,
};

fn beam_mesh(elements: usize, length: f64, nvn: usize) -> Geometry {
    let nodes: Vec<Vec<f64>> = (0..=elements)
        .map(|i| vec![length * i as f64 / elements as f64])
        .collect();
    let connectivity: Vec<Vec<usize>> = (0..elements).map(|i| vec![i, i + 1]).collect();
    let kinds = vec![ElementKind::BeamHermite; elements];
    Geometry::new(nodes, connectivity, kinds, nvn, vec![]).unwrap()
}

#[test]
fn cantilever_under_uniform_load_matches_fl4_over_8ei() {
    // Clamped at x = 0, free at x = L, uniform load f:
    // tip deflection w(L) = f L^4 / (8 EI). Hermite elements are nodally
    // exact for this problem.
    let (length, ei, f) = (2.0, 4.0, 3.0);
    let elements = 4;
    let mut g = beam_mesh(elements, length, 2);
    g.add_essential_bc(0, 0.0).unwrap(); // w(0) = 0
    g.add_essential_bc(1, 0.0).unwrap(); // rotation(0) = 0

    let p = EulerBernoulliBeam::new(constant(ei), constant(f));
    let u = Solver::DenseDirect.run(&p, &mut g).unwrap();

    let tip = elements * 2;
    let expected = f * length.powi(4) / (8.0 * ei);
    assert_relative_eq!(u[tip], expected, max_relative = 1e-9);
}

#[test]
fn simply_supported_midspan_deflection() {
    // w(L/2) = 5 f L^4 / (384 EI) for a uniformly loaded span.
    let (length, ei, f) = (1.0, 1.0, 1.0);
    let elements = 4; // even, so a node sits at midspan
    let mut g = beam_mesh(elements, length, 2);
    g.add_essential_bc(0, 0.0).unwrap();
    g.add_essential_bc(elements * 2, 0.0).unwrap();

    let p = EulerBernoulliBeam::new(constant(ei), constant(f));
    let u = Solver::DenseDirect.run(&p, &mut g).unwrap();

    let mid = elements; // node index of the midspan node
    let expected = 5.0 * f * length.powi(4) / (384.0 * ei);
    assert_relative_eq!(u[mid * 2], expected, max_relative = 1e-9);
}

#[test]
fn bending_recovery_returns_moment_curvature() {
    // For the cantilever, w''(0) = f L^2 / (2 EI) at the clamp.
    let (length, ei, f) = (1.0, 1.0, 1.0);
    let elements = 8;
    let mut g = beam_mesh(elements, length, 2);
    g.add_essential_bc(0, 0.0).unwrap();
    g.add_essential_bc(1, 0.0).unwrap();

    let p = EulerBernoulliBeam::new(constant(ei), constant(f));
    Solver::DenseDirect.run(&p, &mut g).unwrap();

    let out = g.elements[0].recover_bending(&[-1.0]).unwrap();
    let (_, sample) = &out[0];
    let curvature = sample[2];
    assert_relative_eq!(
        curvature,
        f * length * length / (2.0 * ei),
        max_relative = 1e-2
    );
}

#[test]
fn small_load_nonlinear_beam_approaches_linear_answer() {
    // At small deflection the axial coupling is negligible and the
    // incremental solution must match the linear cantilever.
    let (length, ei, ea, f) = (1.0, 1.0, 1000.0, 0.01);
    let elements = 4;

    let mut linear = beam_mesh(elements, length, 2);
    linear.add_essential_bc(0, 0.0).unwrap();
    linear.add_essential_bc(1, 0.0).unwrap();
    let u_linear = Solver::DenseDirect
        .run(
            &EulerBernoulliBeam::new(constant(ei), constant(f)),
            &mut linear,
        )
        .unwrap();

    let mut nonlinear = beam_mesh(elements, length, 3);
    // Clamp all three dofs at the support.
    nonlinear.add_essential_bc(0, 0.0).unwrap();
    nonlinear.add_essential_bc(1, 0.0).unwrap();
    nonlinear.add_essential_bc(2, 0.0).unwrap();
    let p = EulerBernoulliBeamNonLinear::new(
        constant(ea),
        constant(ei),
        constant(0.0),
        constant(f),
    );
    let solver = Solver::LoadControl {
        increments: 4,
        max_iterations: 50,
        tolerance: 1e-10,
    };
    let u = solver.run(&p, &mut nonlinear).unwrap();

    let tip_linear = u_linear[elements * 2];
    let tip_nonlinear = u[elements * 3 + 1];
    let relative = (tip_nonlinear - tip_linear).abs() / tip_linear.abs();
    assert!(
        relative < 1e-3,
        "nonlinear tip {tip_nonlinear} vs linear {tip_linear}"
    );
}

#[test]
fn load_control_reports_non_convergence() {
    let mut g = beam_mesh(2, 1.0, 3);
    g.add_essential_bc(0, 0.0).unwrap();
    g.add_essential_bc(1, 0.0).unwrap();
    g.add_essential_bc(2, 0.0).unwrap();
    // Soft axial stiffness and a heavy load make the fixed point wander.
    let p = EulerBernoulliBeamNonLinear::new(
        constant(1e-3),
        constant(1e-3),
        constant(0.0),
        constant(10.0),
    );
    let solver = Solver::LoadControl {
        increments: 1,
        max_iterations: 2,
        tolerance: 1e-16,
    };
    let err = solver.run(&p, &mut g).unwrap_err();
    match err {
        finel_core::FemError::Convergence { last_iterate, .. } => {
            assert_eq!(last_iterate.len(), g.dof_count());
        }
        other => panic!("expected Convergence, got {other:?}"),
    }
}
