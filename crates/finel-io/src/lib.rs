//! Persistence for the finel engine.
//!
//! This crate provides:
//! - **Delimited text export** of solution vectors and mode shapes
//! - **JSON document** persistence of a geometry plus its solution,
//!   sufficient to reload and re-run post-processing

pub mod document;
mod error;
pub mod export;

pub use document::{load_document, save_document, Document};
pub use error::IoError;
pub use export::{write_modes_csv, write_solution_csv};
