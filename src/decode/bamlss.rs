//! `bamlss` naming scheme: `{par}.p.{term}` and `{par}.s.{smooth}`.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::DecodeHints;
use super::rule::{Decoded, Rule, RuleContext, named};
use super::scheme::{ResponseScope, SchemeRules};
use crate::domain::Component;

static PARAMETRIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<par>[A-Za-z][A-Za-z0-9]*)\.p\.(?P<name>.+)$").unwrap());
static SMOOTH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<par>[A-Za-z][A-Za-z0-9]*)\.s\.(?P<name>.+)$").unwrap());
static SAMPLER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:logLik|logPost|DIC|pd|AICc|alpha|accepted)$").unwrap());

pub(crate) struct BamlssScheme;

impl SchemeRules for BamlssScheme {
    fn rules(&self, _hints: &DecodeHints) -> Vec<Rule> {
        vec![
            Rule::new("parametric", &PARAMETRIC, parametric),
            Rule::new("smooth", &SMOOTH, smooth),
            Rule::new("sampler", &SAMPLER, |c, _| {
                Decoded::fixed(Component::Auxiliary, c.get(0).map_or("", |m| m.as_str()))
            }),
        ]
    }

    fn response_scope(&self, _response: &str) -> Option<ResponseScope> {
        None
    }

    fn intercept_markers(&self) -> &'static [&'static str] {
        &["(Intercept)"]
    }
}

fn parameter_component(par: &str, smooth: bool) -> Component {
    match par {
        "mu" if smooth => Component::SmoothTerms,
        "mu" => Component::Conditional,
        "sigma" => Component::Sigma,
        "pi" => Component::ZeroInflated,
        _ => Component::Distributional,
    }
}

fn parametric(c: &Captures<'_>, _: &RuleContext) -> Decoded {
    Decoded::fixed(parameter_component(named(c, "par"), false), named(c, "name"))
}

fn smooth(c: &Captures<'_>, _: &RuleContext) -> Decoded {
    Decoded::smooth(parameter_component(named(c, "par"), true), named(c, "name"))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::decode::{DecodeHints, NamingScheme, decode};
    use crate::domain::{Component, TermFunction};

    #[test]
    fn distributional_parameters_map_to_components() {
        let table = decode(
            &[
                "mu.p.(Intercept)",
                "mu.p.x1",
                "mu.s.s(x2).b1",
                "sigma.p.(Intercept)",
                "sigma.s.s(x3).tau21",
                "nu.p.(Intercept)",
                "logLik",
            ],
            NamingScheme::Bamlss,
            &DecodeHints::default(),
        )
        .unwrap();
        let components: Vec<Component> = table.records().iter().map(|r| r.component).collect();
        assert_eq!(
            components,
            vec![
                Component::Conditional,
                Component::Conditional,
                Component::SmoothTerms,
                Component::Sigma,
                Component::Sigma,
                Component::Distributional,
                Component::Auxiliary,
            ]
        );
        let cleaned: Vec<&str> = table.records().iter().map(|r| r.cleaned_parameter.as_str()).collect();
        assert_eq!(
            cleaned,
            vec![
                "(Intercept)",
                "x1",
                "s(x2).b1",
                "(Intercept)",
                "s(x3).tau21",
                "(Intercept)",
                "logLik"
            ]
        );
        assert_eq!(table.records()[2].function, Some(TermFunction::Smooth));
        assert_eq!(table.records()[4].function, Some(TermFunction::Smooth));
    }
}
