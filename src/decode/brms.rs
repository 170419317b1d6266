//! `brms` naming scheme.
//!
//! brms encodes the role of a draw in a prefix (`b_`, `r_`, `sd_`, `cor_`,
//! `sds_`, `simo_`, `prior_`, ...) and the distributional parameter (dpar) as a
//! second prefix or a `__dpar` suffix on the grouping factor:
//!
//! - `b_zi_x`, `b_sigma_x`: fixed effects of a dpar model
//! - `r_Subject__zi[308,Intercept]`: per-level random effect of a dpar model
//! - `sd_Subject__Intercept`, `cor_Subject__Intercept__Days`: variance components
//!
//! Multivariate models add the response name (`b_y1_x`, `sigma_y1`,
//! `r_Subject__y1[...]`). Mixture models use `mu1`, `mu2`, ... as dpars.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::DecodeHints;
use super::rule::{Decoded, Rule, RuleContext, join_operands, named, random_effect};
use super::scheme::{ResponseScope, SchemeRules};
use crate::domain::Component;

const DPARS: &str = r"zi|hu|sigma|phi|shape|disc|beta|ndt|nu|bs|bias|zoi|coi|kappa|alpha|xi|quantile|mu\d+";

static PRIOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^prior_(?P<name>.+)$").unwrap());
static ZI_FIXED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^b_(?:zi|hu)_(?P<name>.+)$").unwrap());
static DPAR_FIXED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^b_(?P<dpar>sigma|phi|shape|disc|beta|ndt|nu|bs|bias|zoi|coi|kappa|alpha|xi|quantile|mu\d+)_(?P<name>.+)$",
    )
    .unwrap()
});
static SMOOTH_FIXED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^bs_(?P<name>.+)$").unwrap());
static FIXED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:b|bsp|bcs)_(?P<name>.+)$").unwrap());
static RANDOM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^r_(?P<group>.+?)(?:__(?P<dpar>{DPARS}))?\[(?P<level>[^,\]]+),(?P<term>[^\]]+)\]$"
    ))
    .unwrap()
});
static SMOOTH_SD: Lazy<Regex> = Lazy::new(|| Regex::new(r"^sds_(?P<name>.+)$").unwrap());
static SMOOTH_COEF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:s|zs)_(?P<name>.+?)(?:\[(?P<idx>\d+)\])?$").unwrap());
static SD_COR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<kind>sd|cor)_(?P<group>.+?)__(?P<rest>.+)$").unwrap());
static SIMPLEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^simo_(?P<name>.+?)(?:\[(?P<idx>\d+)\])?$").unwrap());
static SIGMA: Lazy<Regex> = Lazy::new(|| Regex::new(r"^sigma$").unwrap());
static MIXTURE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^theta\d+$").unwrap());
static SHIFTPROP: Lazy<Regex> = Lazy::new(|| Regex::new(r"^shiftprop$").unwrap());
static SCALAR_DPAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<dpar>zi|hu|phi|shape|disc|beta|ndt|nu|bs|bias|zoi|coi|kappa|alpha|xi|quantile)$").unwrap()
});
static SAMPLER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:lp__|lprior)$").unwrap());
static DPAR_OPERAND: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"^(?P<dpar>{DPARS})_(?P<term>.+)$")).unwrap());
static MIXTURE_DPAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^mu\d+$").unwrap());
static MIXTURE_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:b_mu\d+_|r_.+__mu\d+\[|(?:sd|cor)_.+?__mu\d+_|theta\d+$)").unwrap()
});

pub(crate) struct BrmsScheme;

impl SchemeRules for BrmsScheme {
    fn rules(&self, _hints: &DecodeHints) -> Vec<Rule> {
        vec![
            Rule::new("prior", &PRIOR, |c, _| Decoded::fixed(Component::Priors, named(c, "name"))),
            // Must precede the generic `b_` rule, which would otherwise claim `b_zi_*`.
            Rule::new("zero_inflated", &ZI_FIXED, |c, _| {
                Decoded::fixed(Component::ZeroInflated, named(c, "name"))
            }),
            Rule::new("dpar_fixed", &DPAR_FIXED, |c, _| {
                let dpar = named(c, "dpar");
                Decoded::fixed(dpar_component(dpar), with_mixture_marker(dpar, named(c, "name")))
            }),
            Rule::new("smooth_fixed", &SMOOTH_FIXED, |c, _| {
                Decoded::smooth(Component::SmoothTerms, named(c, "name"))
            }),
            Rule::new("fixed", &FIXED, |c, _| Decoded::fixed(Component::Conditional, named(c, "name"))),
            Rule::new("random", &RANDOM, random),
            Rule::new("smooth_sd", &SMOOTH_SD, |c, _| {
                Decoded::smooth(Component::SmoothTerms, named(c, "name"))
            }),
            Rule::new("smooth_coef", &SMOOTH_COEF, |c, _| {
                Decoded::smooth(Component::SmoothTerms, indexed(c))
            }),
            Rule::new("sd_cor", &SD_COR, sd_cor),
            Rule::new("simplex", &SIMPLEX, |c, _| Decoded::fixed(Component::Simplex, indexed(c))),
            Rule::new("sigma", &SIGMA, |_, _| Decoded::fixed(Component::Sigma, "sigma")),
            Rule::new("mixture", &MIXTURE, |c, _| {
                Decoded::fixed(Component::Mixture, c.get(0).map_or("", |m| m.as_str()))
            }),
            Rule::new("shiftprop", &SHIFTPROP, |_, _| {
                Decoded::fixed(Component::ShiftedProportion, "shiftprop")
            }),
            Rule::new("auxiliary", &SCALAR_DPAR, |c, _| {
                let dpar = named(c, "dpar");
                let component = match dpar {
                    "zi" | "hu" => Component::ZeroInflated,
                    "beta" => Component::Beta,
                    _ => Component::Auxiliary,
                };
                Decoded::fixed(component, dpar)
            }),
            Rule::new("sampler", &SAMPLER, |c, _| {
                Decoded::fixed(Component::Auxiliary, c.get(0).map_or("", |m| m.as_str()))
            }),
        ]
    }

    fn response_scope(&self, response: &str) -> Option<ResponseScope> {
        let pattern = Regex::new(&format!(r"(_{{1,2}}){}(_|\[|$)", regex::escape(response))).ok()?;
        Some(ResponseScope {
            response: response.to_string(),
            pattern,
            replace: |caps| match caps.get(2).map_or("", |m| m.as_str()) {
                "_" => caps[1].to_string(),
                "[" => "[".to_string(),
                _ => String::new(),
            },
        })
    }

    fn intercept_markers(&self) -> &'static [&'static str] {
        &["Intercept"]
    }

    /// Only mixture families have `mu1`, `mu2`, ... dpars or `theta` weights.
    fn implies_mixture(&self, subject: &str) -> bool {
        MIXTURE_NAME.is_match(subject)
    }
}

/// Component of a distributional-parameter model.
fn dpar_component(dpar: &str) -> Component {
    match dpar {
        "zi" | "hu" => Component::ZeroInflated,
        "sigma" => Component::Sigma,
        "phi" | "shape" | "disc" => Component::Dispersion,
        "beta" => Component::Beta,
        d if MIXTURE_DPAR.is_match(d) => Component::Conditional,
        _ => Component::Distributional,
    }
}

/// Mixture dpars stay on the cleaned name (`mu1_x`) for the mixture post-pass,
/// which runs whenever a name implies a mixture.
fn with_mixture_marker(dpar: &str, name: &str) -> String {
    if MIXTURE_DPAR.is_match(dpar) {
        format!("{dpar}_{name}")
    } else {
        name.to_string()
    }
}

/// `name[3]` becomes `name.3`.
fn indexed(c: &Captures<'_>) -> String {
    let name = named(c, "name");
    match c.name("idx") {
        Some(idx) => format!("{name}.{}", idx.as_str()),
        None => name.to_string(),
    }
}

fn random(c: &Captures<'_>, ctx: &RuleContext) -> Decoded {
    let dpar = named(c, "dpar");
    let term = named(c, "term");
    let component = if dpar.is_empty() {
        Component::Conditional
    } else {
        dpar_component(dpar)
    };
    let mut decoded = random_effect(component, term, named(c, "group"), named(c, "level"), ctx);
    decoded.cleaned = with_mixture_marker(dpar, term);
    decoded
}

fn sd_cor(c: &Captures<'_>, _: &RuleContext) -> Decoded {
    let rest = named(c, "rest");
    let group = named(c, "group");

    let (first, second) = match (named(c, "kind"), rest.split_once("__")) {
        ("cor", Some((a, b))) => (a, Some(b)),
        _ => (rest, None),
    };
    let (component, a) = split_dpar(first);
    let cleaned = match second {
        Some(b) => join_operands(&a, &split_dpar(b).1),
        None => a,
    };
    Decoded::variance(component, "SD/Cor", group, cleaned)
}

/// Split an optional dpar prefix off a variance-component operand.
fn split_dpar(operand: &str) -> (Component, String) {
    match DPAR_OPERAND.captures(operand) {
        Some(c) => {
            let dpar = named(&c, "dpar");
            (dpar_component(dpar), with_mixture_marker(dpar, named(&c, "term")))
        }
        None => (Component::Conditional, operand.to_string()),
    }
}
