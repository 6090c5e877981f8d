//! Generalized eigenvalue validation: mode ordering and residuals of
//! K phi = lambda M phi on a constrained solid.

use finel_core::{solve_eigen, Elasticity3d, ElementKind, Geometry, GlobalSystem, Problem};

/// One Brick8 element on the unit cube, clamped on the z = 0 face.
fn clamped_cube() -> Geometry {
    let nodes = vec![
        vec![0.0, 0.0, 0.0],
        vec![1.0, 0.0, 0.0],
        vec![1.0, 1.0, 0.0],
        vec![0.0, 1.0, 0.0],
        vec![0.0, 0.0, 1.0],
        vec![1.0, 0.0, 1.0],
        vec![1.0, 1.0, 1.0],
        vec![0.0, 1.0, 1.0],
    ];
    let connectivity = vec![(0..8).collect::<Vec<_>>()];
    let mut g = Geometry::new(nodes, connectivity, vec![ElementKind::Brick8], 3, vec![]).unwrap();
    for node in 0..4 {
        for v in 0..3 {
            g.add_essential_bc(node * 3 + v, 0.0).unwrap();
        }
    }
    g
}

#[test]
fn eigenvalues_come_back_sorted_ascending() {
    let mut g = clamped_cube();
    let p = Elasticity3d::new(1, 100.0, 0.3).density(1.0);
    let solution = solve_eigen(&p, &mut g, 6).unwrap();
    assert_eq!(solution.values.len(), 6);
    for i in 1..solution.values.len() {
        assert!(
            solution.values[i] >= solution.values[i - 1],
            "eigenvalues not ascending at {i}: {} < {}",
            solution.values[i],
            solution.values[i - 1]
        );
    }
    // A constrained elastic solid has strictly positive frequencies.
    assert!(solution.values[0] > 0.0);
}

#[test]
fn eigenpairs_satisfy_the_generalized_problem() {
    let mut g = clamped_cube();
    let p = Elasticity3d::new(1, 100.0, 0.3).density(2.0);
    let solution = solve_eigen(&p, &mut g, 4).unwrap();

    // Re-assemble K and M to evaluate the residual on the free dofs.
    let mut g2 = clamped_cube();
    p.fill_all(&mut g2).unwrap();
    let system = GlobalSystem::assemble(&g2).unwrap();
    let m = system.m.as_ref().unwrap();
    let free = system.free_dofs();

    for mode in 0..solution.values.len() {
        let v = solution.vectors.column(mode).clone_owned();
        let lambda = solution.values[mode];
        let kv = &system.k * &v;
        let mv = m * &v;
        let mut residual: f64 = 0.0;
        let mut scale: f64 = 0.0;
        for &dof in &free {
            residual += (kv[dof] - lambda * mv[dof]).powi(2);
            scale += (lambda * mv[dof]).powi(2);
        }
        let relative = residual.sqrt() / scale.sqrt().max(1e-30);
        assert!(
            relative < 1e-8,
            "mode {mode} residual {relative} at lambda {lambda}"
        );
    }
}

#[test]
fn constrained_dofs_stay_zero_in_mode_shapes() {
    let mut g = clamped_cube();
    let p = Elasticity3d::new(1, 50.0, 0.25).density(1.0);
    let solution = solve_eigen(&p, &mut g, 3).unwrap();
    for mode in 0..3 {
        for dof in 0..12 {
            assert_eq!(solution.vectors[(dof, mode)], 0.0);
        }
    }
}

#[test]
fn missing_mass_is_an_error() {
    let mut g = clamped_cube();
    // No density: the problem never fills element mass matrices.
    let p = Elasticity3d::new(1, 100.0, 0.3);
    let err = solve_eigen(&p, &mut g, 2).unwrap_err();
    assert!(matches!(err, finel_core::FemError::MissingMass));
}
