//! Domain types used throughout the crate.
//!
//! This module defines:
//!
//! - taxonomy output (`TaxonomyRecord`, `ParameterTable`, `Column`)
//! - the closed vocabularies (`Effects`, `Component`, `TermFunction`, `LevelMode`)
//! - classifier output (`Statistic`)

pub mod types;

pub use types::*;
