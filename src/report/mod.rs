//! Reporting utilities: formatted terminal output.
//!
//! Formatting lives here so the decoder and classifier only ever return data.

pub mod format;

pub use format::*;
