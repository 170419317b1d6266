//! Parameter taxonomy decoder.
//!
//! `decode` turns the raw parameter names of one fitted model into a
//! `ParameterTable`: one `TaxonomyRecord` per name, in input order.
//!
//! Per name:
//! - strip embedded multivariate response labels, if any
//! - run the scheme's rules top to bottom; the first match wins
//! - fall back to a fixed/conditional record holding the name unchanged
//!
//! Whole-table passes (`postprocess`) then normalise mixture classes,
//! intercept spellings, interaction separators and random-effect smooths.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::domain::{Effects, ParameterTable, TaxonomyRecord};
use crate::error::InsightError;

mod bamlss;
mod brms;
mod generic;
mod postprocess;
mod rstanarm;
mod rule;
mod scheme;

pub use scheme::{NamingScheme, SCHEME_TAGS};

use rule::{Decoded, OPERAND_SEPARATOR, Rule, RuleContext};
use scheme::{ResponseScope, SchemeRules};

/// Structural metadata about the model the names came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeHints {
    /// Response names of a multivariate model.
    pub responses: Vec<String>,
    /// Declared random-effect grouping factors.
    pub random_factors: Vec<String>,
    /// Model terms in call form, e.g. `s(Subject, bs = "re")`.
    pub terms: Vec<String>,
    /// The model uses a mixture family.
    pub mixture: bool,
}

impl DecodeHints {
    pub fn with_responses<I, S>(mut self, responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.responses = responses.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_random_factors<I, S>(mut self, factors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.random_factors = factors.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_terms<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.terms = terms.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_mixture(mut self, mixture: bool) -> Self {
        self.mixture = mixture;
        self
    }
}

/// Decode raw parameter names under a naming scheme.
pub fn decode<S: AsRef<str>>(
    raw: &[S],
    scheme: NamingScheme,
    hints: &DecodeHints,
) -> Result<ParameterTable, InsightError> {
    let conventions = scheme.rules();
    let rules = conventions.rules(hints);
    let scopes = response_scopes(conventions, &hints.responses);
    let ctx = RuleContext {
        levels: scheme.levels(),
    };

    let mut records = Vec::with_capacity(raw.len());
    let mut fallbacks = 0usize;
    let mut mixture = hints.mixture;
    for parameter in raw {
        let parameter = parameter.as_ref();
        let (response, subject) = split_response(&scopes, parameter);
        mixture |= conventions.implies_mixture(&subject);

        let record = match first_match(&rules, &subject, &ctx) {
            Some((rule, decoded)) => {
                tracing::trace!(parameter, rule = rule.name, "rule matched");
                build_record(rule, parameter, response, decoded)?
            }
            None => {
                fallbacks += 1;
                TaxonomyRecord {
                    response,
                    cleaned_parameter: subject,
                    ..TaxonomyRecord::fallback(parameter)
                }
            }
        };
        records.push(record);
    }

    if mixture {
        postprocess::mixture_classes(&mut records);
    }
    postprocess::normalize_intercepts(&mut records, conventions.intercept_markers());
    if let Some(separator) = conventions.interaction_separator() {
        postprocess::normalize_interactions(&mut records, separator);
    }
    postprocess::random_effect_smooths(&mut records, &hints.terms);

    tracing::debug!(
        scheme = %scheme,
        parameters = records.len(),
        matched = records.len() - fallbacks,
        fallbacks,
        "decoded parameters"
    );
    Ok(ParameterTable::new(records))
}

/// Resolve `tag` to a naming scheme, then decode.
pub fn decode_backend<S: AsRef<str>>(
    raw: &[S],
    tag: &str,
    hints: &DecodeHints,
) -> Result<ParameterTable, InsightError> {
    decode(raw, NamingScheme::lookup(tag)?, hints)
}

/// Response scopes, longest response first so `y1` never claims `y10`.
fn response_scopes(conventions: &dyn SchemeRules, responses: &[String]) -> Vec<ResponseScope> {
    let mut responses: Vec<&String> = responses.iter().filter(|r| !r.is_empty()).collect();
    responses.sort_by(|a, b| b.len().cmp(&a.len()));
    responses
        .into_iter()
        .filter_map(|r| conventions.response_scope(r))
        .collect()
}

/// Strip every listed response out of `parameter`.
///
/// A shorter response never claims text already matched by a longer one. The
/// Response label lists the responses in order of appearance, joined like
/// correlation operands when a name spans several (`y1 ~ y2`).
fn split_response(scopes: &[ResponseScope], parameter: &str) -> (String, String) {
    let mut spans: Vec<(Range<usize>, &str, String)> = Vec::new();
    for scope in scopes {
        for caps in scope.pattern.captures_iter(parameter) {
            let Some(m) = caps.get(0) else { continue };
            let range = m.range();
            if spans.iter().any(|(claimed, ..)| range.start < claimed.end && claimed.start < range.end) {
                continue;
            }
            spans.push((range, scope.response.as_str(), (scope.replace)(&caps)));
        }
    }
    if spans.is_empty() {
        return (String::new(), parameter.to_string());
    }
    spans.sort_by_key(|(range, ..)| range.start);

    let mut labels: Vec<&str> = Vec::new();
    let mut subject = String::with_capacity(parameter.len());
    let mut cursor = 0;
    for (range, response, replacement) in &spans {
        subject.push_str(&parameter[cursor..range.start]);
        subject.push_str(replacement);
        cursor = range.end;
        if !labels.contains(response) {
            labels.push(*response);
        }
    }
    subject.push_str(&parameter[cursor..]);
    (labels.join(OPERAND_SEPARATOR), subject)
}

fn first_match<'r>(rules: &'r [Rule], subject: &str, ctx: &RuleContext) -> Option<(&'r Rule, Decoded)> {
    rules.iter().find_map(|rule| {
        let caps = rule.pattern.captures(subject)?;
        Some((rule, (rule.extract)(&caps, ctx)))
    })
}

fn build_record(
    rule: &Rule,
    parameter: &str,
    response: String,
    decoded: Decoded,
) -> Result<TaxonomyRecord, InsightError> {
    let malformed = |what: &'static str| InsightError::MalformedName {
        rule: rule.name,
        parameter: parameter.to_string(),
        what,
    };
    if decoded.cleaned.is_empty() {
        return Err(malformed("cleaned name"));
    }
    if decoded.effects == Effects::Random && decoded.group.is_empty() {
        return Err(malformed("group"));
    }
    Ok(TaxonomyRecord {
        parameter: parameter.to_string(),
        effects: decoded.effects,
        component: decoded.component,
        group: decoded.group,
        response,
        function: decoded.function,
        level: decoded.level,
        cleaned_parameter: decoded.cleaned,
    })
}
