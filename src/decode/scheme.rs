//! Naming-scheme registry.
//!
//! Every back-end mangles parameter names its own way. A `NamingScheme` selects
//! the rule table for one convention; `lookup` maps scheme tags and back-end
//! model classes onto schemes.

use std::fmt;
use std::str::FromStr;

use regex::{Captures, Regex};

use crate::decode::DecodeHints;
use crate::decode::rule::Rule;
use crate::domain::LevelMode;
use crate::error::InsightError;

/// Which naming convention produced a set of raw parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamingScheme {
    /// Frequentist back-ends and tidied summaries.
    Generic { levels: LevelMode },
    /// `brms` (Stan) draws.
    Brms { levels: LevelMode },
    /// `rstanarm` (Stan) draws.
    Rstanarm { levels: LevelMode },
    /// `bamlss` samples.
    Bamlss,
}

/// Canonical tags and the aliases that resolve to them.
pub const SCHEME_TAGS: &[(&str, &[&str])] = &[
    ("generic", &[]),
    ("stan-brms", &["brms", "brmsfit"]),
    ("stan-rstanarm", &["rstanarm", "stanreg", "stanmvreg"]),
    ("bamlss", &[]),
];

impl NamingScheme {
    /// Resolve a scheme tag or a back-end model class.
    pub fn lookup(tag: &str) -> Result<Self, InsightError> {
        let levels = LevelMode::default();
        match tag {
            "generic" => Ok(NamingScheme::Generic { levels }),
            "stan-brms" | "brms" | "brmsfit" => Ok(NamingScheme::Brms { levels }),
            "stan-rstanarm" | "rstanarm" | "stanreg" | "stanmvreg" => Ok(NamingScheme::Rstanarm { levels }),
            "bamlss" => Ok(NamingScheme::Bamlss),
            other => Err(InsightError::UnsupportedBackend(other.to_string())),
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            NamingScheme::Generic { .. } => "generic",
            NamingScheme::Brms { .. } => "stan-brms",
            NamingScheme::Rstanarm { .. } => "stan-rstanarm",
            NamingScheme::Bamlss => "bamlss",
        }
    }

    pub fn levels(self) -> LevelMode {
        match self {
            NamingScheme::Generic { levels }
            | NamingScheme::Brms { levels }
            | NamingScheme::Rstanarm { levels } => levels,
            NamingScheme::Bamlss => LevelMode::Separate,
        }
    }

    /// Same scheme with another level mode. `bamlss` has no per-level entries.
    pub fn with_levels(self, levels: LevelMode) -> Self {
        match self {
            NamingScheme::Generic { .. } => NamingScheme::Generic { levels },
            NamingScheme::Brms { .. } => NamingScheme::Brms { levels },
            NamingScheme::Rstanarm { .. } => NamingScheme::Rstanarm { levels },
            NamingScheme::Bamlss => NamingScheme::Bamlss,
        }
    }

    pub(crate) fn rules(self) -> &'static dyn SchemeRules {
        match self {
            NamingScheme::Generic { .. } => &super::generic::GenericScheme,
            NamingScheme::Brms { .. } => &super::brms::BrmsScheme,
            NamingScheme::Rstanarm { .. } => &super::rstanarm::RstanarmScheme,
            NamingScheme::Bamlss => &super::bamlss::BamlssScheme,
        }
    }
}

impl FromStr for NamingScheme {
    type Err = InsightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::lookup(s)
    }
}

impl fmt::Display for NamingScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Rule table and conventions of one scheme.
pub(crate) trait SchemeRules: Send + Sync {
    /// Priority-ordered rules. Patterns depending on `hints` are compiled here.
    fn rules(&self, hints: &DecodeHints) -> Vec<Rule>;

    /// How a response label is embedded in raw names, if the scheme has
    /// multivariate models at all.
    fn response_scope(&self, response: &str) -> Option<ResponseScope>;

    /// Cleaned names rewritten to `(Intercept)`.
    fn intercept_markers(&self) -> &'static [&'static str];

    /// The name alone shows the model is a mixture.
    fn implies_mixture(&self, _subject: &str) -> bool {
        false
    }

    /// Scheme spelling of the interaction operator, when it differs from `:`.
    fn interaction_separator(&self) -> Option<&'static str> {
        None
    }
}

/// Response label embedded in raw names, plus how to strip it.
pub(crate) struct ResponseScope {
    pub response: String,
    pub pattern: Regex,
    pub replace: fn(&Captures<'_>) -> String,
}
