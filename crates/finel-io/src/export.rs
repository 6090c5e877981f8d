//! Delimited text writers for solution vectors and eigen modes.

use crate::error::IoError;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// Write a solution vector, one value per line.
pub fn write_solution_csv(path: impl AsRef<Path>, solution: &[f64]) -> Result<(), IoError> {
    let mut out = String::with_capacity(solution.len() * 24);
    for value in solution {
        // write! to a String cannot fail.
        let _ = writeln!(out, "{value:e}");
    }
    fs::write(path, out)?;
    Ok(())
}

/// Write mode shapes as comma-delimited rows: one line per dof, one
/// column per mode.
pub fn write_modes_csv(path: impl AsRef<Path>, rows: &[Vec<f64>]) -> Result<(), IoError> {
    let mut out = String::new();
    for row in rows {
        let line: Vec<String> = row.iter().map(|v| format!("{v:e}")).collect();
        let _ = writeln!(out, "{}", line.join(","));
    }
    fs::write(path, out)?;
    Ok(())
}
