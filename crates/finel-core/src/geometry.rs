//! Geometry: node set, element collection, boundary conditions and
//! boundary segments.
//!
//! The geometry is handed over fully formed by an external meshing
//! collaborator: node coordinates, connectivity with topology tags, the
//! dof-per-node count `nvn`, and boundary segments available for
//! distributed loads. Everything is stored in flat indexed arrays; the
//! local-to-global dof map of each element is precomputed at construction.

use crate::elements::{Element, ElementKind, LoadFn};
use crate::error::{FemError, Result};
use log::{info, warn};
use nalgebra::DMatrix;

/// Default tolerance for point-on-segment tests.
pub const SEGMENT_TOL: f64 = 1e-5;

/// A discretized domain with boundary conditions.
#[derive(Debug)]
pub struct Geometry {
    /// Node coordinates, one entry per node.
    pub nodes: Vec<Vec<f64>>,
    /// Node indices per element, in shape-function order.
    pub connectivity: Vec<Vec<usize>>,
    /// Topology tag per element.
    pub kinds: Vec<ElementKind>,
    /// Dofs per node, uniform across the geometry.
    pub nvn: usize,
    /// Boundary segments (node index pairs) for distributed loads.
    pub segments: Vec<(usize, usize)>,
    /// Essential (Dirichlet) conditions: (global dof, prescribed value).
    pub cbe: Vec<(usize, f64)>,
    /// Natural (Neumann) conditions: (global dof, nodal load).
    pub cbn: Vec<(usize, f64)>,
    /// Elements built from the connectivity.
    pub elements: Vec<Element>,
}

impl Geometry {
    /// Build a geometry and its elements, validating connectivity.
    pub fn new(
        nodes: Vec<Vec<f64>>,
        connectivity: Vec<Vec<usize>>,
        kinds: Vec<ElementKind>,
        nvn: usize,
        segments: Vec<(usize, usize)>,
    ) -> Result<Self> {
        let mut geometry = Self {
            nodes,
            connectivity,
            kinds,
            nvn,
            segments,
            cbe: Vec::new(),
            cbn: Vec::new(),
            elements: Vec::new(),
        };
        geometry.build_elements()?;
        Ok(geometry)
    }

    fn build_elements(&mut self) -> Result<()> {
        if self.kinds.len() != self.connectivity.len() {
            return Err(FemError::KindCountMismatch {
                kinds: self.kinds.len(),
                elements: self.connectivity.len(),
            });
        }
        let node_count = self.nodes.len();
        let mut elements = Vec::with_capacity(self.connectivity.len());
        for (index, (nodes, &kind)) in self
            .connectivity
            .iter()
            .zip(self.kinds.iter())
            .enumerate()
        {
            if nodes.len() != kind.node_count() {
                return Err(FemError::ElementArity {
                    element: index,
                    kind: kind.name(),
                    expected: kind.node_count(),
                    actual: nodes.len(),
                });
            }
            let dim = self.nodes[0].len();
            let mut coords = DMatrix::zeros(nodes.len(), dim);
            let mut dof_map = Vec::with_capacity(nodes.len() * self.nvn);
            for (row, &node) in nodes.iter().enumerate() {
                if node >= node_count {
                    return Err(FemError::InvalidConnectivity {
                        element: index,
                        node,
                        node_count,
                    });
                }
                for d in 0..dim {
                    coords[(row, d)] = self.nodes[node][d];
                }
                for v in 0..self.nvn {
                    dof_map.push(node * self.nvn + v);
                }
            }
            elements.push(Element::new(kind, index, coords, self.nvn, dof_map));
        }
        self.elements = elements;
        Ok(())
    }

    /// Total dof count of the assembled system.
    pub fn dof_count(&self) -> usize {
        self.nodes.len() * self.nvn
    }

    /// Rebuild elements for a different dof-per-node count.
    ///
    /// Any previously set boundary conditions reference the old dof
    /// numbering and are cleared; the caller is warned because they must be
    /// re-applied.
    pub fn regenerate(&mut self, nvn: usize) -> Result<()> {
        if !self.cbe.is_empty() || !self.cbn.is_empty() {
            warn!(
                "regenerating geometry with nvn = {}: clearing {} essential and {} natural boundary conditions",
                nvn,
                self.cbe.len(),
                self.cbn.len()
            );
        }
        self.nvn = nvn;
        self.cbe.clear();
        self.cbn.clear();
        self.build_elements()
    }

    /// Add one essential boundary condition on a global dof.
    pub fn add_essential_bc(&mut self, dof: usize, value: f64) -> Result<()> {
        self.check_dof(dof)?;
        self.cbe.push((dof, value));
        Ok(())
    }

    /// Add one natural boundary condition (nodal load) on a global dof.
    pub fn add_natural_bc(&mut self, dof: usize, value: f64) -> Result<()> {
        self.check_dof(dof)?;
        self.cbn.push((dof, value));
        Ok(())
    }

    fn check_dof(&self, dof: usize) -> Result<()> {
        if dof >= self.dof_count() {
            return Err(FemError::BoundaryCondition {
                dof,
                dof_count: self.dof_count(),
            });
        }
        Ok(())
    }

    /// Node indices lying on a boundary segment, within tolerance.
    pub fn segment_nodes(&self, segment: usize, tol: f64) -> Result<Vec<usize>> {
        let (a, b) = self.segment_endpoints(segment)?;
        Ok((0..self.nodes.len())
            .filter(|&i| on_segment(&a, &b, &self.nodes[i], tol))
            .collect())
    }

    /// Essential boundary conditions for variable `variable` on every node
    /// of a segment.
    pub fn essential_bc_on_segment(
        &mut self,
        segment: usize,
        value: f64,
        variable: usize,
        tol: f64,
    ) -> Result<()> {
        let nodes = self.segment_nodes(segment, tol)?;
        for node in nodes {
            self.add_essential_bc(node * self.nvn + variable, value)?;
        }
        Ok(())
    }

    /// Essential boundary condition on the node nearest a physical point.
    pub fn nearest_node_bc(&mut self, point: &[f64], value: f64, variable: usize) -> Result<()> {
        let node = self.nearest_node(point);
        self.add_essential_bc(node * self.nvn + variable, value)
    }

    /// Index of the node nearest a physical point.
    pub fn nearest_node(&self, point: &[f64]) -> usize {
        let mut best = 0;
        let mut best_dist = f64::INFINITY;
        for (i, node) in self.nodes.iter().enumerate() {
            let dist: f64 = node
                .iter()
                .zip(point.iter())
                .map(|(a, b)| (a - b) * (a - b))
                .sum();
            if dist < best_dist {
                best_dist = dist;
                best = i;
            }
        }
        best
    }

    /// Elements with at least one full edge on the segment.
    pub fn elements_on_segment(&self, segment: usize, tol: f64) -> Result<Vec<usize>> {
        let (a, b) = self.segment_endpoints(segment)?;
        let mut found = Vec::new();
        for element in &self.elements {
            for (edge, _) in element.kind.edges().iter().enumerate() {
                let (c0, c1) = element.edge_coords(edge)?;
                if on_segment(&a, &b, c0.as_slice(), tol) && on_segment(&a, &b, c1.as_slice(), tol)
                {
                    found.push(element.index);
                    break;
                }
            }
        }
        Ok(found)
    }

    /// Register a distributed load over a boundary segment.
    ///
    /// `components[v]` is the load profile for solution variable `v`,
    /// parameterized by arc length measured from the segment start. Every
    /// element edge lying on the segment records the load together with its
    /// arc-length offset and orientation; the problem formulation
    /// integrates the edge contributions into the element load vector.
    pub fn load_on_segment(
        &mut self,
        segment: usize,
        components: Vec<Option<LoadFn>>,
        tol: f64,
    ) -> Result<()> {
        let (a, b) = self.segment_endpoints(segment)?;
        let seg_vec: Vec<f64> = a.iter().zip(b.iter()).map(|(s, e)| e - s).collect();
        let mut touched = 0usize;
        for element in &mut self.elements {
            for edge in 0..element.kind.edges().len() {
                let (c0, c1) = element.edge_coords(edge)?;
                if !(on_segment(&a, &b, c0.as_slice(), tol)
                    && on_segment(&a, &b, c1.as_slice(), tol))
                {
                    continue;
                }
                let edge_vec: Vec<f64> = (0..c0.len()).map(|d| c1[d] - c0[d]).collect();
                let dot: f64 = seg_vec.iter().zip(edge_vec.iter()).map(|(s, e)| s * e).sum();
                let s0: f64 = c0
                    .iter()
                    .zip(a.iter())
                    .map(|(c, s)| (c - s) * (c - s))
                    .sum::<f64>()
                    .sqrt();
                element.edge_loads.push(crate::elements::EdgeLoad {
                    edge,
                    s0,
                    direction: if dot >= 0.0 { 1.0 } else { -1.0 },
                    components: components.clone(),
                });
                touched += 1;
            }
        }
        info!(
            "distributed load on segment {}: {} element edge(s) registered",
            segment, touched
        );
        Ok(())
    }

    fn segment_endpoints(&self, segment: usize) -> Result<(Vec<f64>, Vec<f64>)> {
        let &(start, end) = self.segments.get(segment).ok_or(FemError::IndexOutOfRange {
            what: "segment",
            index: segment,
            count: self.segments.len(),
        })?;
        Ok((self.nodes[start].clone(), self.nodes[end].clone()))
    }
}

/// Point-on-segment test: p lies between a and b when the two partial
/// distances add up to the full distance, within tolerance.
fn on_segment(a: &[f64], b: &[f64], p: &[f64], tol: f64) -> bool {
    let dist = |x: &[f64], y: &[f64]| -> f64 {
        x.iter()
            .zip(y.iter())
            .map(|(u, v)| (u - v) * (u - v))
            .sum::<f64>()
            .sqrt()
    };
    (dist(a, p) + dist(p, b) - dist(a, b)).abs() < tol
}
