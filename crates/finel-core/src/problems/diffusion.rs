//! 1-D diffusion-reaction model: -(a u')' + c u = f on a line mesh.

use super::{Problem, ScalarFn};
use crate::elements::Element;
use crate::error::Result;

/// Second-order two-point boundary value problem with coefficient
/// functions a(x), c(x) and source f(x). One dof per node; Line2 and
/// Line3 meshes.
pub struct Diffusion1d {
    a: ScalarFn,
    c: ScalarFn,
    f: ScalarFn,
}

impl Diffusion1d {
    pub fn new(a: ScalarFn, c: ScalarFn, f: ScalarFn) -> Self {
        Self { a, c, f }
    }
}

impl Problem for Diffusion1d {
    fn name(&self) -> &'static str {
        "Diffusion1d"
    }

    fn required_nvn(&self) -> usize {
        1
    }

    fn fill_element(&self, element: &mut Element) -> Result<()> {
        let n = element.kind.node_count();
        for gp in element.integration_data()? {
            let x = gp.coords[0];
            let (a, c, f) = ((self.a)(x), (self.c)(x), (self.f)(x));
            let scale = gp.det_jac * gp.weight;
            for i in 0..n {
                for j in 0..n {
                    element.ke[(i, j)] +=
                        (a * gp.dpx[(0, i)] * gp.dpx[(0, j)] + c * gp.shape[i] * gp.shape[j])
                            * scale;
                }
                element.fe[i] += f * gp.shape[i] * scale;
            }
        }
        Ok(())
    }
}
