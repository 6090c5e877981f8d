//! JSON geometry + solution document.
//!
//! The document captures everything needed to rebuild a [`Geometry`] and
//! re-run post-processing: nodes, connectivity with topology tags, dof
//! count, both boundary condition lists, segments and the solved vector.

use crate::error::IoError;
use finel_core::{ElementKind, Geometry};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub schema_version: u32,
    pub nodes: Vec<Vec<f64>>,
    pub connectivity: Vec<Vec<usize>>,
    pub kinds: Vec<ElementKind>,
    pub nvn: usize,
    pub segments: Vec<(usize, usize)>,
    pub cbe: Vec<(usize, f64)>,
    pub cbn: Vec<(usize, f64)>,
    pub solution: Vec<f64>,
}

impl Document {
    /// Capture a geometry and its global solution.
    pub fn from_geometry(geometry: &Geometry, solution: &[f64]) -> Self {
        Self {
            schema_version: 1,
            nodes: geometry.nodes.clone(),
            connectivity: geometry.connectivity.clone(),
            kinds: geometry.kinds.clone(),
            nvn: geometry.nvn,
            segments: geometry.segments.clone(),
            cbe: geometry.cbe.clone(),
            cbn: geometry.cbn.clone(),
            solution: solution.to_vec(),
        }
    }

    /// Rebuild the geometry, re-validating connectivity and BC ranges.
    /// The solution is not scattered; callers decide whether to re-solve
    /// or post-process the stored vector.
    pub fn build_geometry(&self) -> Result<Geometry, IoError> {
        let mut geometry = Geometry::new(
            self.nodes.clone(),
            self.connectivity.clone(),
            self.kinds.clone(),
            self.nvn,
            self.segments.clone(),
        )?;
        for &(dof, value) in &self.cbe {
            geometry.add_essential_bc(dof, value)?;
        }
        for &(dof, value) in &self.cbn {
            geometry.add_natural_bc(dof, value)?;
        }
        Ok(geometry)
    }
}

/// Persist a geometry and solution as a pretty-printed JSON document.
pub fn save_document(
    path: impl AsRef<Path>,
    geometry: &Geometry,
    solution: &[f64],
) -> Result<(), IoError> {
    let document = Document::from_geometry(geometry, solution);
    let bytes = serde_json::to_vec_pretty(&document)?;
    fs::write(path, bytes)?;
    Ok(())
}

/// Load a previously saved document.
pub fn load_document(path: impl AsRef<Path>) -> Result<Document, IoError> {
    let bytes = fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_geometry() -> Geometry {
        let mut g = Geometry::new(
            vec![vec![0.0, 0.0], vec![1.0, 0.0], vec![0.0, 1.0]],
            vec![vec![0, 1, 2]],
            vec![ElementKind::Tri3],
            2,
            vec![(0, 1)],
        )
        .unwrap();
        g.add_essential_bc(0, 0.0).unwrap();
        g.add_natural_bc(3, -1.5).unwrap();
        g
    }

    #[test]
    fn document_roundtrip_preserves_everything() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let geometry = sample_geometry();
        let u = vec![0.0, 0.1, 0.2, 0.3, 0.4, 0.5];
        save_document(&path, &geometry, &u).unwrap();
        let loaded = load_document(&path).unwrap();
        assert_eq!(loaded, Document::from_geometry(&geometry, &u));

        let rebuilt = loaded.build_geometry().unwrap();
        assert_eq!(rebuilt.cbe, geometry.cbe);
        assert_eq!(rebuilt.cbn, geometry.cbn);
        assert_eq!(rebuilt.elements.len(), 1);
    }

    #[test]
    fn load_fails_for_missing_file() {
        let err = load_document("/nonexistent/model.json").unwrap_err();
        assert!(matches!(err, IoError::Io(_)));
    }

    #[test]
    fn corrupt_document_reports_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, b"{ not json").unwrap();
        let err = load_document(&path).unwrap_err();
        assert!(matches!(err, IoError::Json(_)));
    }
}
