//! Shape function families for every supported element topology.
//!
//! Conventions:
//! - line/quad/brick kinds live on [-1, 1]^d
//! - triangle/tetrahedron kinds live on the unit simplex
//! - `shape` returns a vector of length `node_count`
//! - `shape_derivatives` returns a (dimension x node_count) matrix of
//!   natural-coordinate derivatives, row r = d/dz_r
//!
//! Every family satisfies the Kronecker delta property at its own reference
//! nodes and the partition of unity everywhere (values sum to 1, natural
//! derivatives sum to 0). Both are covered by the tests below.

use crate::quadrature::Quadrature;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

/// Closed set of element topologies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    /// 2-node linear segment.
    Line2,
    /// 3-node quadratic segment (corner, corner, midpoint).
    Line3,
    /// 3-node linear triangle.
    Tri3,
    /// 6-node quadratic triangle (corners then midsides).
    Tri6,
    /// 4-node bilinear quadrilateral.
    Quad4,
    /// 8-node serendipity quadrilateral.
    Quad8,
    /// 4-node linear tetrahedron.
    Tet4,
    /// 8-node trilinear hexahedron.
    Brick8,
    /// 2-node Euler-Bernoulli beam segment with cubic Hermite interpolation.
    BeamHermite,
}

impl ElementKind {
    /// Spatial dimension of the reference domain.
    pub fn dimension(self) -> usize {
        match self {
            Self::Line2 | Self::Line3 | Self::BeamHermite => 1,
            Self::Tri3 | Self::Tri6 | Self::Quad4 | Self::Quad8 => 2,
            Self::Tet4 | Self::Brick8 => 3,
        }
    }

    /// Number of nodes defining the topology.
    pub fn node_count(self) -> usize {
        match self {
            Self::Line2 | Self::BeamHermite => 2,
            Self::Line3 | Self::Tri3 => 3,
            Self::Quad4 | Self::Tet4 => 4,
            Self::Tri6 => 6,
            Self::Quad8 | Self::Brick8 => 8,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Line2 => "Line2",
            Self::Line3 => "Line3",
            Self::Tri3 => "Tri3",
            Self::Tri6 => "Tri6",
            Self::Quad4 => "Quad4",
            Self::Quad8 => "Quad8",
            Self::Tet4 => "Tet4",
            Self::Brick8 => "Brick8",
            Self::BeamHermite => "BeamHermite",
        }
    }

    /// Quadrature rule that integrates this kind's stiffness integrand
    /// exactly for undistorted geometry.
    pub fn default_quadrature(self) -> Quadrature {
        match self {
            Self::Line2 => Quadrature::line(2),
            Self::Line3 | Self::BeamHermite => Quadrature::line(3),
            Self::Tri3 => Quadrature::triangle(2),
            Self::Tri6 => Quadrature::triangle(5),
            Self::Quad4 => Quadrature::quad(2),
            Self::Quad8 => Quadrature::quad(3),
            Self::Tet4 => Quadrature::tetrahedron(2),
            Self::Brick8 => Quadrature::brick(2),
        }
    }

    /// One-point rule on this kind's own reference domain, for selective
    /// (reduced) integration.
    pub fn reduced_quadrature(self) -> Quadrature {
        match self {
            Self::Line2 | Self::Line3 | Self::BeamHermite => Quadrature::line(1),
            Self::Tri3 | Self::Tri6 => Quadrature::triangle(1),
            Self::Quad4 | Self::Quad8 => Quadrature::quad(1),
            Self::Tet4 => Quadrature::tetrahedron(1),
            Self::Brick8 => Quadrature::brick(1),
        }
    }

    /// Natural coordinates of the reference nodes, in connectivity order.
    pub fn reference_nodes(self) -> Vec<Vec<f64>> {
        match self {
            Self::Line2 | Self::BeamHermite => vec![vec![-1.0], vec![1.0]],
            Self::Line3 => vec![vec![-1.0], vec![1.0], vec![0.0]],
            Self::Tri3 => vec![vec![0.0, 0.0], vec![1.0, 0.0], vec![0.0, 1.0]],
            Self::Tri6 => vec![
                vec![0.0, 0.0],
                vec![1.0, 0.0],
                vec![0.0, 1.0],
                vec![0.5, 0.0],
                vec![0.5, 0.5],
                vec![0.0, 0.5],
            ],
            Self::Quad4 => vec![
                vec![-1.0, -1.0],
                vec![1.0, -1.0],
                vec![1.0, 1.0],
                vec![-1.0, 1.0],
            ],
            Self::Quad8 => vec![
                vec![-1.0, -1.0],
                vec![1.0, -1.0],
                vec![1.0, 1.0],
                vec![-1.0, 1.0],
                vec![0.0, -1.0],
                vec![1.0, 0.0],
                vec![0.0, 1.0],
                vec![-1.0, 0.0],
            ],
            Self::Tet4 => vec![
                vec![0.0, 0.0, 0.0],
                vec![1.0, 0.0, 0.0],
                vec![0.0, 1.0, 0.0],
                vec![0.0, 0.0, 1.0],
            ],
            Self::Brick8 => vec![
                vec![-1.0, -1.0, -1.0],
                vec![1.0, -1.0, -1.0],
                vec![1.0, 1.0, -1.0],
                vec![-1.0, 1.0, -1.0],
                vec![-1.0, -1.0, 1.0],
                vec![1.0, -1.0, 1.0],
                vec![1.0, 1.0, 1.0],
                vec![-1.0, 1.0, 1.0],
            ],
        }
    }

    /// Corner-edge list for 2-D kinds, as local node index pairs. Used to
    /// locate boundary edges for distributed loads.
    pub fn edges(self) -> Vec<(usize, usize)> {
        match self {
            Self::Tri3 | Self::Tri6 => vec![(0, 1), (1, 2), (2, 0)],
            Self::Quad4 | Self::Quad8 => vec![(0, 1), (1, 2), (2, 3), (3, 0)],
            _ => Vec::new(),
        }
    }
}

/// Shape function values at a natural coordinate.
pub fn shape(kind: ElementKind, z: &[f64]) -> DVector<f64> {
    match kind {
        ElementKind::Line2 | ElementKind::BeamHermite => {
            let x = z[0];
            DVector::from_vec(vec![0.5 * (1.0 - x), 0.5 * (1.0 + x)])
        }
        ElementKind::Line3 => {
            let x = z[0];
            DVector::from_vec(vec![
                0.5 * x * (x - 1.0),
                0.5 * x * (x + 1.0),
                1.0 - x * x,
            ])
        }
        ElementKind::Tri3 => {
            let (x, y) = (z[0], z[1]);
            DVector::from_vec(vec![1.0 - x - y, x, y])
        }
        ElementKind::Tri6 => {
            let (x, y) = (z[0], z[1]);
            let l1 = 1.0 - x - y;
            DVector::from_vec(vec![
                l1 * (2.0 * l1 - 1.0),
                x * (2.0 * x - 1.0),
                y * (2.0 * y - 1.0),
                4.0 * l1 * x,
                4.0 * x * y,
                4.0 * y * l1,
            ])
        }
        ElementKind::Quad4 => {
            let (x, y) = (z[0], z[1]);
            DVector::from_vec(vec![
                0.25 * (1.0 - x) * (1.0 - y),
                0.25 * (1.0 + x) * (1.0 - y),
                0.25 * (1.0 + x) * (1.0 + y),
                0.25 * (1.0 - x) * (1.0 + y),
            ])
        }
        ElementKind::Quad8 => {
            let (x, y) = (z[0], z[1]);
            DVector::from_vec(vec![
                0.25 * (1.0 - x) * (1.0 - y) * (-1.0 - x - y),
                0.25 * (1.0 + x) * (1.0 - y) * (-1.0 + x - y),
                0.25 * (1.0 + x) * (1.0 + y) * (-1.0 + x + y),
                0.25 * (1.0 - x) * (1.0 + y) * (-1.0 - x + y),
                0.5 * (1.0 - x * x) * (1.0 - y),
                0.5 * (1.0 + x) * (1.0 - y * y),
                0.5 * (1.0 - x * x) * (1.0 + y),
                0.5 * (1.0 - x) * (1.0 - y * y),
            ])
        }
        ElementKind::Tet4 => {
            let (x, y, w) = (z[0], z[1], z[2]);
            DVector::from_vec(vec![1.0 - x - y - w, x, y, w])
        }
        ElementKind::Brick8 => {
            let (x, y, w) = (z[0], z[1], z[2]);
            DVector::from_vec(vec![
                0.125 * (1.0 - x) * (1.0 - y) * (1.0 - w),
                0.125 * (1.0 + x) * (1.0 - y) * (1.0 - w),
                0.125 * (1.0 + x) * (1.0 + y) * (1.0 - w),
                0.125 * (1.0 - x) * (1.0 + y) * (1.0 - w),
                0.125 * (1.0 - x) * (1.0 - y) * (1.0 + w),
                0.125 * (1.0 + x) * (1.0 - y) * (1.0 + w),
                0.125 * (1.0 + x) * (1.0 + y) * (1.0 + w),
                0.125 * (1.0 - x) * (1.0 + y) * (1.0 + w),
            ])
        }
    }
}

/// Natural-coordinate derivatives of the shape functions at `z`.
/// Row r is d/dz_r, one column per node.
pub fn shape_derivatives(kind: ElementKind, z: &[f64]) -> DMatrix<f64> {
    match kind {
        ElementKind::Line2 | ElementKind::BeamHermite => {
            DMatrix::from_row_slice(1, 2, &[-0.5, 0.5])
        }
        ElementKind::Line3 => {
            let x = z[0];
            DMatrix::from_row_slice(1, 3, &[x - 0.5, x + 0.5, -2.0 * x])
        }
        ElementKind::Tri3 => DMatrix::from_row_slice(2, 3, &[-1.0, 1.0, 0.0, -1.0, 0.0, 1.0]),
        ElementKind::Tri6 => {
            let (x, y) = (z[0], z[1]);
            let l1 = 1.0 - x - y;
            DMatrix::from_row_slice(
                2,
                6,
                &[
                    1.0 - 4.0 * l1,
                    4.0 * x - 1.0,
                    0.0,
                    4.0 * (l1 - x),
                    4.0 * y,
                    -4.0 * y,
                    //
                    1.0 - 4.0 * l1,
                    0.0,
                    4.0 * y - 1.0,
                    -4.0 * x,
                    4.0 * x,
                    4.0 * (l1 - y),
                ],
            )
        }
        ElementKind::Quad4 => {
            let (x, y) = (z[0], z[1]);
            DMatrix::from_row_slice(
                2,
                4,
                &[
                    -0.25 * (1.0 - y),
                    0.25 * (1.0 - y),
                    0.25 * (1.0 + y),
                    -0.25 * (1.0 + y),
                    //
                    -0.25 * (1.0 - x),
                    -0.25 * (1.0 + x),
                    0.25 * (1.0 + x),
                    0.25 * (1.0 - x),
                ],
            )
        }
        ElementKind::Quad8 => {
            let (x, y) = (z[0], z[1]);
            DMatrix::from_row_slice(
                2,
                8,
                &[
                    -0.25 * (y - 1.0) * (2.0 * x + y),
                    -0.25 * (y - 1.0) * (2.0 * x - y),
                    0.25 * (y + 1.0) * (2.0 * x + y),
                    0.25 * (y + 1.0) * (2.0 * x - y),
                    (y - 1.0) * x,
                    -0.5 * (y * y - 1.0),
                    -(y + 1.0) * x,
                    0.5 * (y * y - 1.0),
                    //
                    -0.25 * (x - 1.0) * (2.0 * y + x),
                    0.25 * (x + 1.0) * (2.0 * y - x),
                    0.25 * (x + 1.0) * (2.0 * y + x),
                    -0.25 * (x - 1.0) * (2.0 * y - x),
                    0.5 * (x * x - 1.0),
                    -y * (x + 1.0),
                    -0.5 * (x * x - 1.0),
                    y * (x - 1.0),
                ],
            )
        }
        ElementKind::Tet4 => DMatrix::from_row_slice(
            3,
            4,
            &[
                -1.0, 1.0, 0.0, 0.0, //
                -1.0, 0.0, 1.0, 0.0, //
                -1.0, 0.0, 0.0, 1.0,
            ],
        ),
        ElementKind::Brick8 => {
            let (x, y, w) = (z[0], z[1], z[2]);
            let xi = [-1.0, 1.0, 1.0, -1.0, -1.0, 1.0, 1.0, -1.0];
            let eta = [-1.0, -1.0, 1.0, 1.0, -1.0, -1.0, 1.0, 1.0];
            let zeta = [-1.0, -1.0, -1.0, -1.0, 1.0, 1.0, 1.0, 1.0];
            let mut d = DMatrix::zeros(3, 8);
            for i in 0..8 {
                d[(0, i)] = 0.125 * xi[i] * (1.0 + y * eta[i]) * (1.0 + w * zeta[i]);
                d[(1, i)] = 0.125 * (1.0 + x * xi[i]) * eta[i] * (1.0 + w * zeta[i]);
                d[(2, i)] = 0.125 * (1.0 + x * xi[i]) * (1.0 + y * eta[i]) * zeta[i];
            }
            d
        }
    }
}

/// Cubic Hermite interpolation for Euler-Bernoulli bending. `z` is the
/// natural coordinate on [-1, 1] and `he` the physical element length.
///
/// Ordering is (w1, t1, w2, t2) where t = -dw/dx, following Reddy's sign
/// convention for the rotation dof.
pub fn hermite(z: f64, he: f64) -> [f64; 4] {
    let s = 0.5 * (1.0 + z);
    [
        1.0 - 3.0 * s * s + 2.0 * s * s * s,
        -he * (s - 2.0 * s * s + s * s * s),
        3.0 * s * s - 2.0 * s * s * s,
        -he * (s * s * s - s * s),
    ]
}

/// Physical-coordinate derivatives of the Hermite functions, orders 1..=3.
/// Row k-1 holds the k-th derivative of (h1, h2, h3, h4) with respect to x.
pub fn hermite_derivatives(z: f64, he: f64) -> [[f64; 4]; 3] {
    let s = 0.5 * (1.0 + z);
    // d/dx = (1/he) d/ds for polynomials written in s = x/he.
    let j1 = 1.0 / he;
    let j2 = j1 * j1;
    let j3 = j2 * j1;
    [
        [
            (-6.0 * s + 6.0 * s * s) * j1,
            -he * (1.0 - 4.0 * s + 3.0 * s * s) * j1,
            (6.0 * s - 6.0 * s * s) * j1,
            -he * (3.0 * s * s - 2.0 * s) * j1,
        ],
        [
            (-6.0 + 12.0 * s) * j2,
            -he * (-4.0 + 6.0 * s) * j2,
            (6.0 - 12.0 * s) * j2,
            -he * (6.0 * s - 2.0) * j2,
        ],
        [
            12.0 * j3,
            -he * 6.0 * j3,
            -12.0 * j3,
            -he * 6.0 * j3,
        ],
    ]
}
