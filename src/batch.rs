//! Batch processing of model descriptors.
//!
//! Each descriptor carries everything needed to classify one model and,
//! optionally, decode its parameters. Descriptors are independent, so they
//! are processed in parallel; results come back in input order and a failing
//! descriptor reports its error in-line.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::classify::{ModelQuery, classify};
use crate::decode::{DecodeHints, NamingScheme, decode};
use crate::domain::{LevelMode, ParameterTable, statistic_token};
use crate::error::InsightError;

/// One model in a batch file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub name: String,
    #[serde(flatten)]
    pub query: ModelQuery,
    /// Naming scheme tag; defaults to the scheme registered for `class`.
    #[serde(default)]
    pub scheme: Option<String>,
    #[serde(default)]
    pub levels: LevelMode,
    #[serde(default)]
    pub parameters: Vec<String>,
    #[serde(default)]
    pub hints: DecodeHints,
}

/// Outcome for one descriptor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchResult {
    pub name: String,
    /// Statistic token (`unsupported` for no known distribution); absent when
    /// classification failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statistic: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<ParameterTable>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub fn run_batch(descriptors: &[ModelDescriptor]) -> Vec<BatchResult> {
    descriptors.par_iter().map(process).collect()
}

fn process(descriptor: &ModelDescriptor) -> BatchResult {
    let mut errors = Vec::new();

    let statistic = match classify(&descriptor.query) {
        Ok(stat) => Some(statistic_token(stat)),
        Err(err) => {
            tracing::warn!(model = %descriptor.name, error = %err, "classification failed");
            errors.push(err.to_string());
            None
        }
    };

    let table = if descriptor.parameters.is_empty() {
        None
    } else {
        match decode_descriptor(descriptor) {
            Ok(table) => Some(table),
            Err(err) => {
                tracing::warn!(model = %descriptor.name, error = %err, "decode failed");
                errors.push(err.to_string());
                None
            }
        }
    };

    BatchResult {
        name: descriptor.name.clone(),
        statistic,
        table,
        error: (!errors.is_empty()).then(|| errors.join("; ")),
    }
}

fn decode_descriptor(descriptor: &ModelDescriptor) -> Result<ParameterTable, InsightError> {
    let scheme = resolve_scheme(descriptor)?.with_levels(descriptor.levels);
    decode(&descriptor.parameters, scheme, &descriptor.hints)
}

/// An explicit scheme must exist; a scheme inferred from the class degrades to
/// `generic` when the back-end has none registered.
fn resolve_scheme(descriptor: &ModelDescriptor) -> Result<NamingScheme, InsightError> {
    if let Some(tag) = &descriptor.scheme {
        return NamingScheme::lookup(tag);
    }
    match NamingScheme::lookup(&descriptor.query.class) {
        Ok(scheme) => Ok(scheme),
        Err(InsightError::UnsupportedBackend(_)) => {
            tracing::debug!(model = %descriptor.name, class = %descriptor.query.class, "using generic naming scheme");
            Ok(NamingScheme::Generic {
                levels: LevelMode::default(),
            })
        }
        Err(err) => Err(err),
    }
}
