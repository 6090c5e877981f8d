//! Numerical quadrature rules on reference domains.
//!
//! Each rule is a fixed ordered list of (natural coordinate, weight) pairs
//! that integrates polynomials exactly up to the stated degree:
//! - line: Gauss–Legendre on [-1, 1]
//! - quad/brick: tensor products of the line rule
//! - triangle/tetrahedron: interior-point rules on the unit simplex
//!
//! Rule selection is the problem's responsibility. Beam formulations keep a
//! full and a reduced rule on the same element at once.

/// One quadrature sample: natural coordinates and weight.
#[derive(Debug, Clone, PartialEq)]
pub struct QuadraturePoint {
    pub coords: Vec<f64>,
    pub weight: f64,
}

/// An ordered quadrature rule on a reference domain.
#[derive(Debug, Clone, PartialEq)]
pub struct Quadrature {
    pub points: Vec<QuadraturePoint>,
}

impl Quadrature {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Gauss–Legendre rule on [-1, 1] with `n` points (n in 1..=4).
    /// Exact for polynomials of degree 2n - 1. The 1-point rule is the
    /// reduced rule used for selective integration.
    pub fn line(n: usize) -> Self {
        let pairs: Vec<(f64, f64)> = match n {
            1 => vec![(0.0, 2.0)],
            2 => {
                let a = 1.0 / 3.0_f64.sqrt();
                vec![(-a, 1.0), (a, 1.0)]
            }
            3 => {
                let a = (3.0 / 5.0_f64).sqrt();
                vec![(-a, 5.0 / 9.0), (0.0, 8.0 / 9.0), (a, 5.0 / 9.0)]
            }
            _ => {
                // 4-point rule; also the fallback for n outside 2..=4.
                let a = (3.0 / 7.0 - 2.0 / 7.0 * (6.0 / 5.0_f64).sqrt()).sqrt();
                let b = (3.0 / 7.0 + 2.0 / 7.0 * (6.0 / 5.0_f64).sqrt()).sqrt();
                let wa = (18.0 + 30.0_f64.sqrt()) / 36.0;
                let wb = (18.0 - 30.0_f64.sqrt()) / 36.0;
                vec![(-b, wb), (-a, wa), (a, wa), (b, wb)]
            }
        };
        Self {
            points: pairs
                .into_iter()
                .map(|(z, w)| QuadraturePoint {
                    coords: vec![z],
                    weight: w,
                })
                .collect(),
        }
    }

    /// Tensor product of two `line(n)` rules on [-1, 1]².
    pub fn quad(n: usize) -> Self {
        let line = Self::line(n);
        let mut points = Vec::with_capacity(n * n);
        for pi in &line.points {
            for pj in &line.points {
                points.push(QuadraturePoint {
                    coords: vec![pi.coords[0], pj.coords[0]],
                    weight: pi.weight * pj.weight,
                });
            }
        }
        Self { points }
    }

    /// Tensor product of three `line(n)` rules on [-1, 1]³.
    pub fn brick(n: usize) -> Self {
        let line = Self::line(n);
        let mut points = Vec::with_capacity(n * n * n);
        for pi in &line.points {
            for pj in &line.points {
                for pk in &line.points {
                    points.push(QuadraturePoint {
                        coords: vec![pi.coords[0], pj.coords[0], pk.coords[0]],
                        weight: pi.weight * pj.weight * pk.weight,
                    });
                }
            }
        }
        Self { points }
    }

    /// Interior rule on the unit reference triangle {x >= 0, y >= 0,
    /// x + y <= 1}. Weights sum to 1/2 (the reference area).
    ///
    /// `order` selects the polynomial degree integrated exactly:
    /// 1 -> centroid rule, 2 -> 3 points, anything higher -> 7 points
    /// (degree 5).
    pub fn triangle(order: usize) -> Self {
        let triples: Vec<(f64, f64, f64)> = match order {
            0 | 1 => vec![(1.0 / 3.0, 1.0 / 3.0, 0.5)],
            2 => vec![
                (1.0 / 6.0, 1.0 / 6.0, 1.0 / 6.0),
                (2.0 / 3.0, 1.0 / 6.0, 1.0 / 6.0),
                (1.0 / 6.0, 2.0 / 3.0, 1.0 / 6.0),
            ],
            _ => {
                let a = 0.059_715_871_789_77;
                let b = 0.470_142_064_105_115;
                let c = 0.797_426_985_353_087;
                let d = 0.101_286_507_323_456;
                let wa = 0.066_197_076_394_253;
                let wb = 0.062_969_590_272_414;
                vec![
                    (1.0 / 3.0, 1.0 / 3.0, 0.112_5),
                    (a, b, wa),
                    (b, a, wa),
                    (b, b, wa),
                    (c, d, wb),
                    (d, c, wb),
                    (d, d, wb),
                ]
            }
        };
        Self {
            points: triples
                .into_iter()
                .map(|(x, y, w)| QuadraturePoint {
                    coords: vec![x, y],
                    weight: w,
                })
                .collect(),
        }
    }

    /// Interior rule on the unit reference tetrahedron. Weights sum to 1/6.
    pub fn tetrahedron(order: usize) -> Self {
        let quads: Vec<(f64, f64, f64, f64)> = match order {
            0 | 1 => vec![(0.25, 0.25, 0.25, 1.0 / 6.0)],
            _ => {
                let a = 0.585_410_196_624_969;
                let b = 0.138_196_601_125_011;
                let w = 1.0 / 24.0;
                vec![(a, b, b, w), (b, a, b, w), (b, b, a, w), (b, b, b, w)]
            }
        };
        Self {
            points: quads
                .into_iter()
                .map(|(x, y, z, w)| QuadraturePoint {
                    coords: vec![x, y, z],
                    weight: w,
                })
                .collect(),
        }
    }
}
