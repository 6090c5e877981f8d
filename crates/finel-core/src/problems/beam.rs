//! Euler-Bernoulli beam bending, linear and geometrically nonlinear.
//!
//! Both models run on `BeamHermite` elements: a 2-node segment with a
//! linear geometric map and cubic Hermite interpolation of the deflection.
//! The rotation dof follows Reddy's convention t = -dw/dx.

use super::{Problem, ScalarFn};
use crate::elements::shapes::{hermite, hermite_derivatives};
use crate::elements::Element;
use crate::error::Result;

/// Linear bending: (EI w'')'' = f, nvn = 2 (deflection, rotation).
pub struct EulerBernoulliBeam {
    ei: ScalarFn,
    f: ScalarFn,
}

impl EulerBernoulliBeam {
    pub fn new(ei: ScalarFn, f: ScalarFn) -> Self {
        Self { ei, f }
    }
}

impl Problem for EulerBernoulliBeam {
    fn name(&self) -> &'static str {
        "EulerBernoulliBeam"
    }

    fn required_nvn(&self) -> usize {
        2
    }

    fn fill_element(&self, element: &mut Element) -> Result<()> {
        let he = element.length();
        let det = 0.5 * he;
        let points = element.quadrature.points.clone();
        for p in &points {
            let z = p.coords[0];
            let x = element.global_coords(&p.coords)[0];
            let h = hermite(z, he);
            let dh = hermite_derivatives(z, he);
            let scale = det * p.weight;
            let (ei, f) = ((self.ei)(x), (self.f)(x));
            for i in 0..4 {
                for j in 0..4 {
                    element.ke[(i, j)] += ei * dh[1][i] * dh[1][j] * scale;
                }
                element.fe[i] += f * h[i] * scale;
            }
        }
        Ok(())
    }
}

/// Geometrically nonlinear bending with axial coupling, nvn = 3
/// (axial displacement, deflection, rotation per node).
///
/// The linear axial and flexural blocks integrate with the full rule; the
/// displacement-coupled blocks use the element's reduced rule to avoid
/// membrane locking. The tangent depends on the current `ue`, so the
/// formulation must be re-run at every iteration of an incremental solve.
pub struct EulerBernoulliBeamNonLinear {
    ea: ScalarFn,
    ei: ScalarFn,
    fx: ScalarFn,
    fy: ScalarFn,
}

impl EulerBernoulliBeamNonLinear {
    pub fn new(ea: ScalarFn, ei: ScalarFn, fx: ScalarFn, fy: ScalarFn) -> Self {
        Self { ea, ei, fx, fy }
    }
}

/// Node-major local dof indices for a 2-node, nvn = 3 beam element.
const AXIAL: [usize; 2] = [0, 3];
const FLEX: [usize; 4] = [1, 2, 4, 5];

impl Problem for EulerBernoulliBeamNonLinear {
    fn name(&self) -> &'static str {
        "EulerBernoulliBeamNonLinear"
    }

    fn required_nvn(&self) -> usize {
        3
    }

    fn fill_element(&self, element: &mut Element) -> Result<()> {
        let he = element.length();
        let det = 0.5 * he;
        let mut k11 = [[0.0; 2]; 2];
        let mut k12 = [[0.0; 4]; 2];
        let mut k22 = [[0.0; 4]; 4];
        let mut f1 = [0.0; 2];
        let mut f2 = [0.0; 4];

        // Full integration: linear axial and flexural blocks plus loads.
        let full = element.quadrature.points.clone();
        for (k, p) in full.iter().enumerate() {
            let z = p.coords[0];
            let x = element.global_coords(&p.coords)[0];
            let (_, dpx) = element.physical_derivatives(&p.coords, k)?;
            let h = hermite(z, he);
            let dh = hermite_derivatives(z, he);
            let scale = det * p.weight;
            let (ea, ei) = ((self.ea)(x), (self.ei)(x));
            let (fx, fy) = ((self.fx)(x), (self.fy)(x));
            for i in 0..4 {
                for j in 0..4 {
                    k22[i][j] += ei * dh[1][i] * dh[1][j] * scale;
                    if i < 2 && j < 2 {
                        k11[i][j] += ea * dpx[(0, i)] * dpx[(0, j)] * scale;
                    }
                }
                if i < 2 {
                    f1[i] += fx * shape_line(z)[i] * scale;
                }
                f2[i] += fy * h[i] * scale;
            }
        }

        // Reduced integration: displacement-coupled blocks from the
        // current solution estimate.
        let reduced = element.reduced.points.clone();
        for (k, p) in reduced.iter().enumerate() {
            let z = p.coords[0];
            let x = element.global_coords(&p.coords)[0];
            let (_, dpx) = element.physical_derivatives(&p.coords, k)?;
            let dh = hermite_derivatives(z, he);
            let scale = det * p.weight;
            let ea = (self.ea)(x);
            let dw: f64 = FLEX
                .iter()
                .enumerate()
                .map(|(a, &dof)| element.ue[dof] * dh[0][a])
                .sum();
            for i in 0..4 {
                for j in 0..4 {
                    if i < 2 {
                        k12[i][j] += 0.5 * ea * dw * dpx[(0, i)] * dh[0][j] * scale;
                    }
                    k22[i][j] += 0.5 * ea * dw * dw * dh[0][i] * dh[0][j] * scale;
                }
            }
        }

        for (i, &gi) in AXIAL.iter().enumerate() {
            for (j, &gj) in AXIAL.iter().enumerate() {
                element.ke[(gi, gj)] = k11[i][j];
            }
            for (j, &gj) in FLEX.iter().enumerate() {
                element.ke[(gi, gj)] = k12[i][j];
                element.ke[(gj, gi)] = 2.0 * k12[i][j];
            }
            element.fe[gi] = f1[i];
        }
        for (i, &gi) in FLEX.iter().enumerate() {
            for (j, &gj) in FLEX.iter().enumerate() {
                element.ke[(gi, gj)] = k22[i][j];
            }
            element.fe[gi] = f2[i];
        }
        Ok(())
    }
}

/// Linear interpolation values on [-1, 1] for the axial dofs.
fn shape_line(z: f64) -> [f64; 2] {
    [0.5 * (1.0 - z), 0.5 * (1.0 + z)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::ElementKind;
    use crate::problems::constant;
    use approx::assert_relative_eq;
    use nalgebra::DMatrix;

    fn beam_element(length: f64, nvn: usize) -> Element {
        let coords = DMatrix::from_row_slice(2, 1, &[0.0, length]);
        let dof_map = (0..2 * nvn).collect();
        Element::new(ElementKind::BeamHermite, 0, coords, nvn, dof_map)
    }

    #[test]
    fn linear_stiffness_matches_textbook_matrix() {
        // ke = (EI/h³) [[12, -6h, -12, -6h], [-6h, 4h², 6h, 2h²], ...]
        // with the t = -dw/dx sign convention.
        let h = 2.0;
        let ei = 5.0;
        let mut e = beam_element(h, 2);
        EulerBernoulliBeam::new(constant(ei), constant(0.0))
            .fill_element(&mut e)
            .unwrap();
        let c = ei / h.powi(3);
        assert_relative_eq!(e.ke[(0, 0)], 12.0 * c, epsilon = 1e-9);
        assert_relative_eq!(e.ke[(0, 2)], -12.0 * c, epsilon = 1e-9);
        assert_relative_eq!(e.ke[(0, 1)], -6.0 * h * c, epsilon = 1e-9);
        assert_relative_eq!(e.ke[(1, 1)], 4.0 * h * h * c, epsilon = 1e-9);
        assert_relative_eq!(e.ke[(1, 3)], 2.0 * h * h * c, epsilon = 1e-9);
    }

    #[test]
    fn uniform_load_gives_consistent_nodal_forces() {
        // fe = f [h/2, -h²/12, h/2, h²/12] for the Reddy sign convention.
        let h = 3.0;
        let f = 4.0;
        let mut e = beam_element(h, 2);
        EulerBernoulliBeam::new(constant(1.0), constant(f))
            .fill_element(&mut e)
            .unwrap();
        assert_relative_eq!(e.fe[0], f * h / 2.0, epsilon = 1e-9);
        assert_relative_eq!(e.fe[1], -f * h * h / 12.0, epsilon = 1e-9);
        assert_relative_eq!(e.fe[2], f * h / 2.0, epsilon = 1e-9);
        assert_relative_eq!(e.fe[3], f * h * h / 12.0, epsilon = 1e-9);
    }

    #[test]
    fn nonlinear_reduces_to_decoupled_blocks_at_zero_state() {
        // With ue = 0 the coupling blocks vanish and the flexural block
        // equals the linear beam stiffness.
        let h = 1.5;
        let (ea, ei) = (10.0, 3.0);
        let mut e = beam_element(h, 3);
        EulerBernoulliBeamNonLinear::new(constant(ea), constant(ei), constant(0.0), constant(0.0))
            .fill_element(&mut e)
            .unwrap();
        // Axial block: EA/h [[1, -1], [-1, 1]]
        assert_relative_eq!(e.ke[(0, 0)], ea / h, epsilon = 1e-9);
        assert_relative_eq!(e.ke[(0, 3)], -ea / h, epsilon = 1e-9);
        // Coupling blocks zero.
        assert_relative_eq!(e.ke[(0, 1)], 0.0, epsilon = 1e-12);
        assert_relative_eq!(e.ke[(1, 0)], 0.0, epsilon = 1e-12);
        // Flexural block matches the linear matrix.
        let c = ei / h.powi(3);
        assert_relative_eq!(e.ke[(1, 1)], 12.0 * c, epsilon = 1e-9);
        assert_relative_eq!(e.ke[(1, 4)], -12.0 * c, epsilon = 1e-9);
    }

    #[test]
    fn nonlinear_coupling_appears_with_deflection() {
        let mut e = beam_element(1.0, 3);
        // Impose a deflection gradient: w varies between the nodes.
        e.ue[1] = 0.0;
        e.ue[4] = 0.1;
        EulerBernoulliBeamNonLinear::new(
            constant(100.0),
            constant(1.0),
            constant(0.0),
            constant(0.0),
        )
        .fill_element(&mut e)
        .unwrap();
        // Axial-flexural coupling is now nonzero, and the lower block is
        // twice the transpose of the upper.
        assert!(e.ke[(0, 1)].abs() > 1e-6);
        assert_relative_eq!(e.ke[(1, 0)], 2.0 * e.ke[(0, 1)], epsilon = 1e-12);
    }
}
