//! Generic naming scheme: frequentist back-ends and tidied summaries.
//!
//! Handles component prefixes (`count_`, `zero_`, `disp_`), per-level random
//! effects keyed by a declared grouping factor (`Subject[308,(Intercept)]`),
//! variance-component labels (`SD (Intercept: Subject)`), and smooth terms.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::DecodeHints;
use super::rule::{Decoded, Rule, RuleContext, join_operands, named, random_effect};
use super::scheme::{ResponseScope, SchemeRules};
use crate::domain::Component;

static ZERO_INFLATED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:zero|zi)_(?P<name>.+)$").unwrap());
static CONDITIONAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:count|cond)_(?P<name>.+)$").unwrap());
static DISPERSION: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:disp|dispersion)_(?P<name>.+)$").unwrap());
static RESIDUAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:SD|Var) \(Observations(?:: Residual)?\)$").unwrap());
// Term stops at the first `": "`; nested factors such as `Site:Subject` stay whole.
static SD: Lazy<Regex> = Lazy::new(|| Regex::new(r"^SD \((?P<term>.+?): (?P<group>.+)\)$").unwrap());
static COR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Cor \((?P<a>.+?)~(?P<b>.+?): (?P<group>.+)\)$").unwrap());
static VAR_COV: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:Var|Cov) \((?P<a>.+?)(?:~(?P<b>.+?))?: (?P<group>.+)\)$").unwrap());
static PHI_MODEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\(phi\)_(?P<name>.+)$").unwrap());
static PHI: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\(phi\)$").unwrap());
static SIGMA: Lazy<Regex> = Lazy::new(|| Regex::new(r"^sigma$").unwrap());
static LOG_SCALE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^Log\((?:scale|theta)\)$").unwrap());
static SMOOTH: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:s|te|ti|t2)\(.+\)(?:\.\d+)?$").unwrap());

pub(crate) struct GenericScheme;

impl SchemeRules for GenericScheme {
    fn rules(&self, hints: &DecodeHints) -> Vec<Rule> {
        let mut rules = vec![
            Rule::new("zero_inflated", &ZERO_INFLATED, |c, _| {
                Decoded::fixed(Component::ZeroInflated, named(c, "name"))
            }),
            Rule::new("conditional", &CONDITIONAL, |c, _| {
                Decoded::fixed(Component::Conditional, named(c, "name"))
            }),
            Rule::new("dispersion", &DISPERSION, |c, _| {
                Decoded::fixed(Component::Dispersion, named(c, "name"))
            }),
        ];

        // Longest factor first so `Subject` never claims `Subject2[...]` entries.
        let mut factors: Vec<&String> = hints.random_factors.iter().filter(|f| !f.is_empty()).collect();
        factors.sort_by(|a, b| b.len().cmp(&a.len()));
        for factor in factors {
            let pattern = format!(
                r"^(?P<group>{})\[(?P<level>[^,\]]+),(?P<term>[^\]]+)\]$",
                regex::escape(factor)
            );
            if let Ok(re) = Regex::new(&pattern) {
                rules.push(Rule::dynamic("random_factor", re, factor_level));
            }
        }

        rules.extend([
            Rule::new("residual", &RESIDUAL, |_, _| {
                Decoded::fixed(Component::Sigma, "Observations")
            }),
            Rule::new("sd", &SD, |c, _| {
                Decoded::variance(Component::Conditional, "SD/Cor", named(c, "group"), named(c, "term"))
            }),
            Rule::new("cor", &COR, |c, _| {
                let cleaned = join_operands(named(c, "a"), named(c, "b"));
                Decoded::variance(Component::Conditional, "SD/Cor", named(c, "group"), cleaned)
            }),
            Rule::new("var_cov", &VAR_COV, var_cov),
            Rule::new("precision_model", &PHI_MODEL, |c, _| {
                Decoded::fixed(Component::Dispersion, named(c, "name"))
            }),
            Rule::new("precision", &PHI, |_, _| Decoded::fixed(Component::Auxiliary, "phi")),
            Rule::new("sigma", &SIGMA, |_, _| Decoded::fixed(Component::Sigma, "sigma")),
            Rule::new("log_scale", &LOG_SCALE, |c, _| {
                Decoded::fixed(Component::Auxiliary, c.get(0).map_or("", |m| m.as_str()))
            }),
            Rule::new("smooth", &SMOOTH, |c, _| {
                Decoded::smooth(Component::SmoothTerms, c.get(0).map_or("", |m| m.as_str()))
            }),
        ]);
        rules
    }

    fn response_scope(&self, response: &str) -> Option<ResponseScope> {
        let pattern = Regex::new(&format!("^{}:", regex::escape(response))).ok()?;
        Some(ResponseScope {
            response: response.to_string(),
            pattern,
            replace: |_| String::new(),
        })
    }

    fn intercept_markers(&self) -> &'static [&'static str] {
        &["(Intercept)", "Intercept"]
    }

    fn interaction_separator(&self) -> Option<&'static str> {
        Some(".")
    }
}

fn factor_level(c: &Captures<'_>, ctx: &RuleContext) -> Decoded {
    random_effect(
        Component::Conditional,
        named(c, "term"),
        named(c, "group"),
        named(c, "level"),
        ctx,
    )
}

fn var_cov(c: &Captures<'_>, _: &RuleContext) -> Decoded {
    let a = named(c, "a");
    let cleaned = match c.name("b") {
        Some(b) => join_operands(a, b.as_str()),
        None => a.to_string(),
    };
    Decoded::variance(Component::Conditional, "Var/Cov", named(c, "group"), cleaned)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::decode::{DecodeHints, NamingScheme, decode};
    use crate::domain::{Component, Effects, LevelMode, TermFunction};

    fn generic() -> NamingScheme {
        NamingScheme::Generic {
            levels: LevelMode::Separate,
        }
    }

    #[test]
    fn hurdle_prefixes_split_components() {
        let table = decode(
            &["count_(Intercept)", "count_x", "zero_(Intercept)", "zero_x"],
            generic(),
            &DecodeHints::default(),
        )
        .unwrap();
        let components: Vec<Component> = table.records().iter().map(|r| r.component).collect();
        assert_eq!(
            components,
            vec![
                Component::Conditional,
                Component::Conditional,
                Component::ZeroInflated,
                Component::ZeroInflated
            ]
        );
        let cleaned: Vec<&str> = table.records().iter().map(|r| r.cleaned_parameter.as_str()).collect();
        assert_eq!(cleaned, vec!["(Intercept)", "x", "(Intercept)", "x"]);
    }

    #[test]
    fn declared_factor_brackets_decode_as_random() {
        let hints = DecodeHints::default().with_random_factors(["Subject"]);
        let table = decode(&["Subject[308,(Intercept)]", "Days"], generic(), &hints).unwrap();
        let r = &table.records()[0];
        assert_eq!(r.effects, Effects::Random);
        assert_eq!(r.group, "Intercept: Subject");
        assert_eq!(r.level, "308");
        assert_eq!(r.cleaned_parameter, "(Intercept)");
        assert_eq!(table.records()[1].effects, Effects::Fixed);
    }

    #[test]
    fn undeclared_factor_brackets_fall_back() {
        let table = decode(&["Subject[308,(Intercept)]"], generic(), &DecodeHints::default()).unwrap();
        let r = &table.records()[0];
        assert_eq!(r.effects, Effects::Fixed);
        assert_eq!(r.cleaned_parameter, "Subject[308,(Intercept)]");
    }

    #[test]
    fn variance_component_labels() {
        let table = decode(
            &[
                "SD (Intercept: Subject)",
                "SD (Days: Subject)",
                "Cor (Intercept~Days: Subject)",
                "Var (Intercept: Site)",
                "SD (Observations)",
            ],
            generic(),
            &DecodeHints::default(),
        )
        .unwrap();
        let groups: Vec<&str> = table.records().iter().map(|r| r.group.as_str()).collect();
        assert_eq!(
            groups,
            vec!["SD/Cor: Subject", "SD/Cor: Subject", "SD/Cor: Subject", "Var/Cov: Site", ""]
        );
        let cleaned: Vec<&str> = table.records().iter().map(|r| r.cleaned_parameter.as_str()).collect();
        assert_eq!(
            cleaned,
            vec!["(Intercept)", "Days", "(Intercept) ~ Days", "(Intercept)", "Observations"]
        );
        assert_eq!(table.records()[4].component, Component::Sigma);
    }

    #[test]
    fn nested_grouping_factors_keep_their_colons() {
        let table = decode(
            &[
                "SD (Intercept: Site:Subject)",
                "Cor (Intercept~Days: Site:Subject)",
                "Cov (Intercept~Days: Site:Subject)",
                "Var (Observations)",
                "Var (Observations: Residual)",
            ],
            generic(),
            &DecodeHints::default(),
        )
        .unwrap();
        let groups: Vec<&str> = table.records().iter().map(|r| r.group.as_str()).collect();
        assert_eq!(
            groups,
            vec!["SD/Cor: Site:Subject", "SD/Cor: Site:Subject", "Var/Cov: Site:Subject", "", ""]
        );
        let cleaned: Vec<&str> = table.records().iter().map(|r| r.cleaned_parameter.as_str()).collect();
        assert_eq!(
            cleaned,
            vec![
                "(Intercept)",
                "(Intercept) ~ Days",
                "(Intercept) ~ Days",
                "Observations",
                "Observations"
            ]
        );
        assert!(table.records()[..3].iter().all(|r| r.effects == Effects::Random));
        assert!(table.records()[3..].iter().all(|r| r.component == Component::Sigma));
    }

    #[test]
    fn smooth_terms_carry_function() {
        let table = decode(&["s(x)", "s(x).1", "te(x,z)"], generic(), &DecodeHints::default()).unwrap();
        for r in table.records() {
            assert_eq!(r.component, Component::SmoothTerms);
            assert_eq!(r.function, Some(TermFunction::Smooth));
        }
    }

    #[test]
    fn dotted_interactions_are_normalised_only_between_known_names() {
        let table = decode(
            &["x", "z", "x.z", "Petal.Length"],
            generic(),
            &DecodeHints::default(),
        )
        .unwrap();
        let cleaned: Vec<&str> = table.records().iter().map(|r| r.cleaned_parameter.as_str()).collect();
        assert_eq!(cleaned, vec!["x", "z", "x:z", "Petal.Length"]);
    }

    #[test]
    fn response_prefix_is_recorded() {
        let hints = DecodeHints::default().with_responses(["y1", "y2"]);
        let table = decode(&["y1:(Intercept)", "y2:x"], generic(), &hints).unwrap();
        let r = &table.records()[1];
        assert_eq!(r.response, "y2");
        assert_eq!(r.cleaned_parameter, "x");
    }
}
