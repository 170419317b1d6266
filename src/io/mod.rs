//! Input/output helpers.
//!
//! - parameter lists and batch descriptors (`ingest`)
//! - CSV/JSON exports (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
