//! `model-insight` library crate.
//!
//! Two pure components for introspecting fitted statistical models:
//!
//! - `decode`: raw parameter names → canonical taxonomy records, per back-end
//!   naming scheme
//! - `classify`: model type tag + family → sampling distribution of its test
//!   statistics
//!
//! The binary (`insight`) is a thin wrapper around this library.

pub mod app;
pub mod batch;
pub mod classify;
pub mod cli;
pub mod decode;
pub mod domain;
pub mod error;
pub mod io;
pub mod report;

pub use classify::{ModelQuery, classify, is_model};
pub use decode::{DecodeHints, NamingScheme, decode, decode_backend};
pub use error::InsightError;
