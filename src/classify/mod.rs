//! Statistic family classifier.
//!
//! `classify` picks the sampling distribution of a model's test statistics
//! from its type tag and fitted family. Stages run in a fixed order and the
//! first one that answers wins:
//!
//! 1. named hypothesis tests (by description)
//! 2. tweedie pre-check
//! 3. unsupported tags
//! 4. tags with a fixed statistic
//! 5. mixed bag: family or degrees of freedom decide
//! 6. ambiguous: per-type exception, else summary-column sniffing
//!
//! Anything else is unsupported (`None`).

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::Statistic;
use crate::error::InsightError;

mod htest;
mod registry;

pub use registry::is_model;

use registry::{Bucket, REFERENCE_GRID, T_FAMILIES, TWEEDIE};

static TWEEDIE_FAMILY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(?:gaussian|normal|student|tweedie)").unwrap());
static COUNT_FAMILY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)binomial|poisson").unwrap());

const T_COLUMNS: &[&str] = &["t", "t-value", "t value", "t.value", "Pr(>|t|)"];
const Z_COLUMNS: &[&str] = &[
    "z",
    "z-value",
    "z value",
    "z.value",
    "Pr(>|z|)",
    "Pr(>|Z|)",
    "Naive z",
    "Robust z",
    "san.z",
    "Wald Z",
];
const F_COLUMNS: &[&str] = &["F", "F-value", "F value", "F.value", "Pr(>F)"];
const CHI_COLUMNS: &[&str] = &[
    "Chisq",
    "chi-sq",
    "chi.sq",
    "Chi.sq",
    "Chi-Square",
    "X2",
    "Wald",
    "Pr(>Chisq)",
    "Pr(>Chi)",
];

/// What the classifier needs to know about a fitted model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelQuery {
    /// Back-end type tag, e.g. `lm` or `glmerMod`.
    pub class: String,
    #[serde(default)]
    pub family: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    /// Description of a hypothesis test object.
    #[serde(default)]
    pub test_method: Option<String>,
    /// Column names of the coefficient summary.
    #[serde(default)]
    pub summary_columns: Vec<String>,
    /// Residual degrees of freedom; `NaN` marks an undefined value.
    #[serde(default, deserialize_with = "degrees_of_freedom")]
    pub degrees_of_freedom: Option<Vec<f64>>,
    #[serde(default = "default_univariate")]
    pub univariate: bool,
}

fn default_univariate() -> bool {
    true
}

/// JSON has no infinities: accept numbers, `"Inf"`/`"NaN"` strings, and `null`
/// for an undefined value.
fn degrees_of_freedom<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Vec<f64>>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Df {
        Number(f64),
        Text(String),
    }

    let raw: Option<Vec<Option<Df>>> = Option::deserialize(deserializer)?;
    raw.map(|values| {
        values
            .into_iter()
            .map(|v| match v {
                None => Ok(f64::NAN),
                Some(Df::Number(x)) => Ok(x),
                Some(Df::Text(s)) => s
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| D::Error::custom(format!("invalid degrees of freedom `{s}`"))),
            })
            .collect::<Result<Vec<f64>, D::Error>>()
    })
    .transpose()
}

impl ModelQuery {
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            family: None,
            link: None,
            test_method: None,
            summary_columns: Vec::new(),
            degrees_of_freedom: None,
            univariate: true,
        }
    }

    pub fn with_family(mut self, family: impl Into<String>) -> Self {
        self.family = Some(family.into());
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub fn with_test_method(mut self, method: impl Into<String>) -> Self {
        self.test_method = Some(method.into());
        self
    }

    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.summary_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_df(mut self, df: impl Into<Vec<f64>>) -> Self {
        self.degrees_of_freedom = Some(df.into());
        self
    }

    pub fn multivariate(mut self) -> Self {
        self.univariate = false;
        self
    }
}

/// Sampling distribution of the model's test statistics; `None` when no known
/// distribution applies.
pub fn classify(query: &ModelQuery) -> Result<Option<Statistic>, InsightError> {
    if !is_model(&query.class) {
        return Err(InsightError::NotAModel(query.class.clone()));
    }
    let (stage, statistic) = resolve(query);
    tracing::debug!(
        class = %query.class,
        family = query.family.as_deref().unwrap_or(""),
        stage,
        statistic = crate::domain::statistic_token(statistic),
        "classified model"
    );
    Ok(statistic)
}

fn resolve(query: &ModelQuery) -> (&'static str, Option<Statistic>) {
    if let Some(known) = query.test_method.as_deref().and_then(htest::lookup) {
        return ("hypothesis test", known);
    }
    if is_tweedie(query) {
        return ("tweedie", Some(Statistic::T));
    }
    match registry::bucket(&query.class) {
        Some(Bucket::Unsupported) => ("unsupported", None),
        Some(Bucket::Fixed(statistic)) => ("type tag", Some(statistic)),
        Some(Bucket::MixedBag) => ("mixed bag", mixed_bag(query)),
        Some(Bucket::Ambiguous) => ("ambiguous", ambiguous(query)),
        None => ("unlisted", None),
    }
}

/// Univariate models only; a tweedie type tag qualifies regardless of family.
fn is_tweedie(query: &ModelQuery) -> bool {
    if !query.univariate {
        return false;
    }
    if TWEEDIE.contains(&query.class.as_str()) {
        return true;
    }
    let family = query.family.as_deref().unwrap_or("");
    let link = query.link.as_deref().unwrap_or("");
    let mentions_tweedie = |s: &str| s.to_ascii_lowercase().contains("tweedie");
    TWEEDIE_FAMILY.is_match(family) && (mentions_tweedie(family) || mentions_tweedie(link))
}

fn mixed_bag(query: &ModelQuery) -> Option<Statistic> {
    if REFERENCE_GRID.contains(&query.class.as_str()) {
        return Some(reference_grid_statistic(query.degrees_of_freedom.as_deref()));
    }
    let t_family = query
        .family
        .as_deref()
        .is_some_and(|f| T_FAMILIES.iter().any(|t| t.eq_ignore_ascii_case(f.trim())));
    Some(if t_family { Statistic::T } else { Statistic::Z })
}

/// Asymptotic (`z`) unless some degrees of freedom are finite.
fn reference_grid_statistic(df: Option<&[f64]>) -> Statistic {
    match df {
        Some(values) if values.iter().any(|v| v.is_finite()) => Statistic::T,
        _ => Statistic::Z,
    }
}

fn ambiguous(query: &ModelQuery) -> Option<Statistic> {
    if query.class == "glmmPQL" {
        let family = query.family.as_deref().unwrap_or("");
        return Some(if COUNT_FAMILY.is_match(family) {
            Statistic::Z
        } else {
            Statistic::T
        });
    }
    sniff_columns(&query.summary_columns)
}

/// First vocabulary (t, z, F, chi-squared) with a matching column wins.
fn sniff_columns(columns: &[String]) -> Option<Statistic> {
    let vocabularies = [
        (T_COLUMNS, Statistic::T),
        (Z_COLUMNS, Statistic::Z),
        (F_COLUMNS, Statistic::F),
        (CHI_COLUMNS, Statistic::ChiSquared),
    ];
    vocabularies.into_iter().find_map(|(vocabulary, statistic)| {
        columns
            .iter()
            .any(|c| vocabulary.contains(&c.trim()))
            .then_some(statistic)
    })
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn stat(query: ModelQuery) -> Option<Statistic> {
        classify(&query).unwrap()
    }

    #[test]
    fn t_set_ignores_family() {
        assert_eq!(stat(ModelQuery::new("lm")), Some(Statistic::T));
        assert_eq!(stat(ModelQuery::new("lm").with_family("poisson")), Some(Statistic::T));
    }

    #[test]
    fn fixed_buckets() {
        assert_eq!(stat(ModelQuery::new("coxph")), Some(Statistic::Z));
        assert_eq!(stat(ModelQuery::new("aov")), Some(Statistic::F));
        assert_eq!(stat(ModelQuery::new("vgam")), Some(Statistic::ChiSquared));
    }

    #[test]
    fn reference_grid_uses_degrees_of_freedom() {
        let inf = ModelQuery::new("emmGrid").with_df([f64::INFINITY, f64::INFINITY]);
        assert_eq!(stat(inf), Some(Statistic::Z));
        let finite = ModelQuery::new("emmGrid").with_df([17.0, 17.0]);
        assert_eq!(stat(finite), Some(Statistic::T));
        let undefined = ModelQuery::new("emm_list").with_df([f64::NAN]);
        assert_eq!(stat(undefined), Some(Statistic::Z));
        assert_eq!(stat(ModelQuery::new("emmGrid")), Some(Statistic::Z));
    }

    #[test]
    fn tweedie_precheck_runs_before_the_unsupported_set() {
        let query = ModelQuery::new("cpglmm").with_family("Tweedie");
        assert_eq!(stat(query), Some(Statistic::T));
        let glm = ModelQuery::new("glm").with_family("gaussian").with_link("tweedie");
        assert_eq!(stat(glm), Some(Statistic::T));
    }

    #[test]
    fn tweedie_family_needs_univariate_model() {
        let query = ModelQuery::new("glmmTMB").with_family("tweedie").multivariate();
        assert_eq!(stat(query), Some(Statistic::Z));
        let query = ModelQuery::new("glmmTMB").with_family("tweedie");
        assert_eq!(stat(query), Some(Statistic::T));
    }

    #[test]
    fn tweedie_type_tag_needs_univariate_model() {
        let query = ModelQuery::new("cpglmm").with_family("Tweedie").multivariate();
        assert_eq!(stat(query), None);
        assert_eq!(stat(ModelQuery::new("bcplm")), Some(Statistic::T));
    }

    #[test]
    fn unsupported_is_not_an_error() {
        assert_eq!(stat(ModelQuery::new("survfit")), None);
        assert_eq!(stat(ModelQuery::new("glmnet")), None);
    }

    #[test]
    fn unknown_tag_is_not_a_model() {
        let err = classify(&ModelQuery::new("data.frame")).unwrap_err();
        assert_eq!(err, InsightError::NotAModel("data.frame".to_string()));
    }

    #[test]
    fn glm_family_decides() {
        assert_eq!(stat(ModelQuery::new("glm").with_family("Gamma")), Some(Statistic::T));
        assert_eq!(stat(ModelQuery::new("glm").with_family("quasipoisson")), Some(Statistic::T));
        assert_eq!(stat(ModelQuery::new("glm").with_family("binomial")), Some(Statistic::Z));
        assert_eq!(stat(ModelQuery::new("svyglm")), Some(Statistic::Z));
    }

    #[test]
    fn glmm_pql_inspects_its_family() {
        let binomial = ModelQuery::new("glmmPQL").with_family("binomial");
        assert_eq!(stat(binomial), Some(Statistic::Z));
        let gaussian = ModelQuery::new("glmmPQL").with_family("gaussian");
        assert_eq!(stat(gaussian), Some(Statistic::T));
    }

    #[test]
    fn ambiguous_models_sniff_summary_columns() {
        let glmer = ModelQuery::new("glmerMod").with_columns(["Estimate", "Std. Error", "z value", "Pr(>|z|)"]);
        assert_eq!(stat(glmer), Some(Statistic::Z));
        let both = ModelQuery::new("coeftest").with_columns(["z value", "t value"]);
        assert_eq!(stat(both), Some(Statistic::T));
        let chisq = ModelQuery::new("gam").with_columns(["edf", "Chi.sq"]);
        assert_eq!(stat(chisq), Some(Statistic::ChiSquared));
        assert_eq!(stat(ModelQuery::new("polr").with_columns(["Value"])), None);
    }

    #[test]
    fn hypothesis_tests_resolve_by_description() {
        let welch = ModelQuery::new("htest").with_test_method("Welch Two Sample t-test");
        assert_eq!(stat(welch), Some(Statistic::T));
        let fisher = ModelQuery::new("htest").with_test_method("Fisher's Exact Test for Count Data");
        assert_eq!(stat(fisher), None);
        let unknown = ModelQuery::new("htest").with_test_method("Shapiro-Wilk normality test");
        assert_eq!(stat(unknown), None);
    }

    #[test]
    fn query_deserializes_with_defaults() {
        let query: ModelQuery = serde_json::from_str(r#"{"class": "glm", "family": "gaussian"}"#).unwrap();
        assert!(query.univariate);
        assert!(query.summary_columns.is_empty());
        assert_eq!(stat(query), Some(Statistic::T));
    }

    proptest! {
        #[test]
        fn registered_models_never_error(idx in 0usize..registry::BUCKETS.len()) {
            let tag = registry::BUCKETS.keys().nth(idx).copied().unwrap_or("lm");
            prop_assert!(classify(&ModelQuery::new(tag)).is_ok());
        }
    }
}
