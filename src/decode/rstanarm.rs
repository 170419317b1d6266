//! `rstanarm` naming scheme.
//!
//! Random effects are written `b[term group:level]`, covariance entries
//! `Sigma[group:a,b]`, and multivariate models prefix terms with `y1|`.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::DecodeHints;
use super::rule::{Decoded, Rule, RuleContext, join_operands, named, random_effect};
use super::scheme::{ResponseScope, SchemeRules};
use crate::domain::Component;

static RANDOM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^b\[(?P<term>[^ \]]+) (?P<group>[^\]]+):(?P<level>[^:\]]+)\]$").unwrap());
static SIGMA_MATRIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Sigma\[(?P<group>[^,\]]+):(?P<a>[^:,\]]+),(?P<b>[^\]]+)\]$").unwrap());
static SMOOTH_SD: Lazy<Regex> = Lazy::new(|| Regex::new(r"^smooth_sd\[(?P<name>.+)\]$").unwrap());
static SMOOTH: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:s|te|ti|t2)\(.+\)\.\d+$").unwrap());
static PHI_MODEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\(phi\)_(?P<name>.+)$").unwrap());
static SIGMA: Lazy<Regex> = Lazy::new(|| Regex::new(r"^sigma$").unwrap());
static RECIPROCAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^reciprocal_dispersion$").unwrap());
static AUXILIARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\(?(?P<name>phi|shape|lambda|overdispersion|aux)\)?$").unwrap());
static DIAGNOSTIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:mean_PPD|log-posterior|log-fit_ratio)$").unwrap());

pub(crate) struct RstanarmScheme;

impl SchemeRules for RstanarmScheme {
    fn rules(&self, _hints: &DecodeHints) -> Vec<Rule> {
        vec![
            Rule::new("random", &RANDOM, random),
            Rule::new("sigma_matrix", &SIGMA_MATRIX, sigma_matrix),
            Rule::new("smooth_sd", &SMOOTH_SD, |c, _| {
                Decoded::smooth(Component::SmoothTerms, named(c, "name"))
            }),
            Rule::new("smooth", &SMOOTH, |c, _| {
                Decoded::smooth(Component::SmoothTerms, c.get(0).map_or("", |m| m.as_str()))
            }),
            Rule::new("precision_model", &PHI_MODEL, |c, _| {
                Decoded::fixed(Component::Dispersion, named(c, "name"))
            }),
            Rule::new("sigma", &SIGMA, |_, _| Decoded::fixed(Component::Sigma, "sigma")),
            Rule::new("reciprocal_dispersion", &RECIPROCAL, |_, _| {
                Decoded::fixed(Component::Dispersion, "reciprocal_dispersion")
            }),
            Rule::new("auxiliary", &AUXILIARY, |c, _| {
                Decoded::fixed(Component::Auxiliary, named(c, "name"))
            }),
            Rule::new("diagnostic", &DIAGNOSTIC, |c, _| {
                Decoded::fixed(Component::Auxiliary, c.get(0).map_or("", |m| m.as_str()))
            }),
        ]
    }

    fn response_scope(&self, response: &str) -> Option<ResponseScope> {
        let pattern = Regex::new(&format!(r"(^|[\[ :,]){}\|", regex::escape(response))).ok()?;
        Some(ResponseScope {
            response: response.to_string(),
            pattern,
            replace: |caps| caps.get(1).map_or("", |m| m.as_str()).to_string(),
        })
    }

    fn intercept_markers(&self) -> &'static [&'static str] {
        &["(Intercept)"]
    }
}

fn random(c: &Captures<'_>, ctx: &RuleContext) -> Decoded {
    random_effect(
        Component::Conditional,
        named(c, "term"),
        named(c, "group"),
        named(c, "level"),
        ctx,
    )
}

fn sigma_matrix(c: &Captures<'_>, _: &RuleContext) -> Decoded {
    let cleaned = join_operands(named(c, "a"), named(c, "b"));
    Decoded::variance(Component::Conditional, "Var/Cov", named(c, "group"), cleaned)
}
