//! Passes over decoded records that need to see the whole table.
//!
//! Applied in order after rule matching:
//!
//! 1. mixture classes (`mu1_x` → `x`, class 1)
//! 2. intercept spelling (`Intercept`, `zi_Intercept` → `(Intercept)`)
//! 3. interaction separators (`x.z` → `x:z` when `x` and `z` are known terms)
//! 4. random-effect smooths declared with `bs = "re"`

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use super::rule::OPERAND_SEPARATOR;
use crate::domain::{Effects, TaxonomyRecord};

const INTERCEPT: &str = "(Intercept)";

static MIXTURE_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^mu(?P<class>\d+)_(?P<rest>.+)$").unwrap());
static SMOOTH_TERM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?P<fun>s|te|ti|t2)\(\s*(?P<var>[^,()\s]+)(?P<rest>.*)\)\s*$").unwrap()
});
static RE_BASIS: Lazy<Regex> = Lazy::new(|| Regex::new(r#"bs\s*=\s*["']re["']"#).unwrap());
static BASIS_INDEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:_\d+)?(?:\.\d+)?$").unwrap());

/// Apply `f` to every ` ~ `-separated operand of a cleaned name.
fn map_operands(cleaned: &str, mut f: impl FnMut(&str) -> String) -> String {
    cleaned
        .split(OPERAND_SEPARATOR)
        .map(|op| f(op))
        .collect::<Vec<_>>()
        .join(OPERAND_SEPARATOR)
}

/// Strip `mu{n}_` class markers and record the class.
///
/// Random records carry the class as their group; fixed records keep an empty
/// group and carry it as their level.
pub(crate) fn mixture_classes(records: &mut [TaxonomyRecord]) {
    for record in records.iter_mut() {
        let mut class = None;
        let cleaned = map_operands(&record.cleaned_parameter, |op| match MIXTURE_MARKER.captures(op) {
            Some(c) => {
                class.get_or_insert_with(|| c["class"].to_string());
                c["rest"].to_string()
            }
            None => op.to_string(),
        });
        let Some(class) = class else { continue };
        record.cleaned_parameter = cleaned;
        let label = format!("Class {class}");
        match record.effects {
            Effects::Random => record.group = label,
            Effects::Fixed => record.level = label,
        }
    }
}

/// Rewrite every spelling of the intercept to `(Intercept)`.
pub(crate) fn normalize_intercepts(records: &mut [TaxonomyRecord], markers: &[&str]) {
    for record in records.iter_mut() {
        record.cleaned_parameter = map_operands(&record.cleaned_parameter, |op| {
            if is_intercept(op, markers) {
                INTERCEPT.to_string()
            } else {
                op.to_string()
            }
        });
    }
}

fn is_intercept(operand: &str, markers: &[&str]) -> bool {
    markers.iter().any(|marker| {
        operand == *marker
            || operand
                .strip_suffix(marker)
                .is_some_and(|head| head.ends_with(['_', '.', ':']))
    })
}

/// Respell `a{sep}b` as `a:b` when every part is itself a cleaned name in the table.
pub(crate) fn normalize_interactions(records: &mut [TaxonomyRecord], separator: &str) {
    let known: HashSet<String> = records.iter().map(|r| r.cleaned_parameter.clone()).collect();
    for record in records.iter_mut() {
        let parts: Vec<&str> = record.cleaned_parameter.split(separator).collect();
        if parts.len() < 2 || parts.iter().any(|p| p.is_empty()) {
            continue;
        }
        if parts.iter().all(|p| known.contains(*p)) {
            record.cleaned_parameter = parts.join(":");
        }
    }
}

/// Smooth term declared as a random effect, e.g. `s(Subject, bs = "re")`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RandomSmooth {
    label: String,
    group: String,
}

/// Pick the random-effect smooths out of a model's term list.
pub(crate) fn random_smooths(terms: &[String]) -> Vec<RandomSmooth> {
    terms
        .iter()
        .filter_map(|term| {
            let c = SMOOTH_TERM.captures(term)?;
            if !RE_BASIS.is_match(&c["rest"]) {
                return None;
            }
            Some(RandomSmooth {
                label: format!("{}({})", &c["fun"], &c["var"]),
                group: c["var"].to_string(),
            })
        })
        .collect()
}

/// Letters and digits only, lower-cased: `s(Subject)` and `sSubject` agree.
fn squash(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

fn matches_smooth(cleaned: &str, smooth: &RandomSmooth) -> bool {
    if cleaned == smooth.label || cleaned.starts_with(&format!("{}.", smooth.label)) {
        return true;
    }
    let base = BASIS_INDEX.replace(cleaned, "");
    !base.is_empty() && squash(&base) == squash(&smooth.label)
}

/// Reclassify coefficients of `bs = "re"` smooths as random effects.
pub(crate) fn random_effect_smooths(records: &mut [TaxonomyRecord], terms: &[String]) {
    let smooths = random_smooths(terms);
    if smooths.is_empty() {
        return;
    }
    for record in records.iter_mut() {
        if record.effects == Effects::Random {
            continue;
        }
        if let Some(smooth) = smooths.iter().find(|s| matches_smooth(&record.cleaned_parameter, s)) {
            tracing::trace!(parameter = %record.parameter, group = %smooth.group, "random-effect smooth");
            record.effects = Effects::Random;
            record.group = smooth.group.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Component;

    fn record(cleaned: &str) -> TaxonomyRecord {
        TaxonomyRecord {
            cleaned_parameter: cleaned.to_string(),
            ..TaxonomyRecord::fallback(cleaned)
        }
    }

    #[test]
    fn intercept_spellings() {
        let markers = ["(Intercept)", "Intercept"];
        assert!(is_intercept("Intercept", &markers));
        assert!(is_intercept("zi_Intercept", &markers));
        assert!(is_intercept("cond.(Intercept)", &markers));
        assert!(!is_intercept("NoIntercept", &markers));
        assert!(!is_intercept("Intercepts", &markers));
    }

    #[test]
    fn intercepts_rewritten_per_operand() {
        let mut records = vec![record("Intercept ~ Days"), record("Days")];
        normalize_intercepts(&mut records, &["Intercept"]);
        assert_eq!(records[0].cleaned_parameter, "(Intercept) ~ Days");
        assert_eq!(records[1].cleaned_parameter, "Days");
    }

    #[test]
    fn interaction_needs_every_part_known() {
        let mut records = vec![record("a"), record("b"), record("a.b"), record("a.c"), record("a..b")];
        normalize_interactions(&mut records, ".");
        let cleaned: Vec<&str> = records.iter().map(|r| r.cleaned_parameter.as_str()).collect();
        assert_eq!(cleaned, vec!["a", "b", "a:b", "a.c", "a..b"]);
    }

    #[test]
    fn mixture_marker_on_fixed_record_sets_level() {
        let mut records = vec![record("mu2_x"), record("mux")];
        mixture_classes(&mut records);
        assert_eq!(records[0].cleaned_parameter, "x");
        assert_eq!(records[0].level, "Class 2");
        assert!(records[0].group.is_empty());
        assert_eq!(records[1].cleaned_parameter, "mux");
        assert!(records[1].level.is_empty());
    }

    #[test]
    fn random_smooths_need_re_basis() {
        let terms = vec![
            "s(x)".to_string(),
            "s(Subject, bs = \"re\")".to_string(),
            "te(a, b, bs='re')".to_string(),
            "Days".to_string(),
        ];
        let smooths = random_smooths(&terms);
        assert_eq!(
            smooths,
            vec![
                RandomSmooth {
                    label: "s(Subject)".to_string(),
                    group: "Subject".to_string()
                },
                RandomSmooth {
                    label: "te(a)".to_string(),
                    group: "a".to_string()
                },
            ]
        );
    }

    #[test]
    fn smooth_coefficients_become_random() {
        let terms = vec!["s(Subject, bs = \"re\")".to_string()];
        let mut records = vec![
            TaxonomyRecord {
                component: Component::SmoothTerms,
                ..record("s(Subject).1")
            },
            record("sSubject_1"),
            record("s(x).1"),
        ];
        random_effect_smooths(&mut records, &terms);
        assert_eq!(records[0].effects, Effects::Random);
        assert_eq!(records[0].group, "Subject");
        assert_eq!(records[1].effects, Effects::Random);
        assert_eq!(records[2].effects, Effects::Fixed);
        assert!(records[2].group.is_empty());
    }
}
