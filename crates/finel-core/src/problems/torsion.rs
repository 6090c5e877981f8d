//! Saint-Venant torsion of a prismatic member via the Prandtl stress
//! function: G ∇²φ = -2 G θ on the cross-section, φ = 0 on the boundary.

use super::Problem;
use crate::elements::Element;
use crate::error::Result;

/// Torsion model on a 2-D cross-section mesh. One dof per node (the
/// stress function φ); shear modulus per element, twist angle per unit
/// length shared by the section.
pub struct Torsion2d {
    shear_modulus: Vec<f64>,
    twist: f64,
}

impl Torsion2d {
    /// Uniform shear modulus.
    pub fn new(element_count: usize, shear_modulus: f64, twist: f64) -> Self {
        Self {
            shear_modulus: vec![shear_modulus; element_count],
            twist,
        }
    }

    /// Per-element shear modulus array.
    pub fn with_moduli(shear_modulus: Vec<f64>, twist: f64) -> Self {
        Self {
            shear_modulus,
            twist,
        }
    }
}

impl Problem for Torsion2d {
    fn name(&self) -> &'static str {
        "Torsion2d"
    }

    fn required_nvn(&self) -> usize {
        1
    }

    fn material_len(&self) -> Option<usize> {
        Some(self.shear_modulus.len())
    }

    fn fill_element(&self, element: &mut Element) -> Result<()> {
        let g = self.shear_modulus[element.index];
        let n = element.kind.node_count();
        for gp in element.integration_data()? {
            let scale = gp.det_jac * gp.weight;
            for i in 0..n {
                for j in 0..n {
                    element.ke[(i, j)] += g
                        * (gp.dpx[(0, i)] * gp.dpx[(0, j)] + gp.dpx[(1, i)] * gp.dpx[(1, j)])
                        * scale;
                }
                element.fe[i] += 2.0 * g * self.twist * gp.shape[i] * scale;
            }
        }
        Ok(())
    }
}
