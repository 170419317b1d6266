//! Decode rules and the shared extraction helpers.
//!
//! A rule is a regex predicate plus an extraction function. Schemes hand the
//! engine an ordered list of rules; the first rule whose pattern matches wins.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::domain::{Component, Effects, LevelMode, TermFunction};

pub(crate) type Extract = fn(&Captures<'_>, &RuleContext) -> Decoded;

/// One entry of a scheme's priority-ordered rule list.
#[derive(Clone)]
pub(crate) struct Rule {
    pub name: &'static str,
    pub pattern: Regex,
    pub extract: Extract,
}

impl Rule {
    /// Rule over one of the scheme's static patterns.
    pub fn new(name: &'static str, pattern: &Lazy<Regex>, extract: Extract) -> Self {
        Self {
            name,
            pattern: Regex::clone(pattern),
            extract,
        }
    }

    /// Rule over a pattern compiled for a single decode call.
    pub fn dynamic(name: &'static str, pattern: Regex, extract: Extract) -> Self {
        Self {
            name,
            pattern,
            extract,
        }
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("pattern", &self.pattern.as_str())
            .finish()
    }
}

/// Scheme configuration visible to extraction functions.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RuleContext {
    pub levels: LevelMode,
}

/// Fragments produced by a matching rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Decoded {
    pub effects: Effects,
    pub component: Component,
    pub group: String,
    pub level: String,
    pub function: Option<TermFunction>,
    pub cleaned: String,
}

impl Decoded {
    pub fn fixed(component: Component, cleaned: impl Into<String>) -> Self {
        Self {
            effects: Effects::Fixed,
            component,
            group: String::new(),
            level: String::new(),
            function: None,
            cleaned: cleaned.into(),
        }
    }

    pub fn smooth(component: Component, cleaned: impl Into<String>) -> Self {
        Self {
            function: Some(TermFunction::Smooth),
            ..Self::fixed(component, cleaned)
        }
    }

    /// Variance/covariance style entry: `"{tag}: {group}"`.
    pub fn variance(component: Component, tag: &str, group: &str, cleaned: impl Into<String>) -> Self {
        Self {
            effects: Effects::Random,
            group: format!("{tag}: {group}"),
            ..Self::fixed(component, cleaned)
        }
    }
}

/// Per-level random effect (`term` varying over `group`, observed at `level`).
pub(crate) fn random_effect(
    component: Component,
    term: &str,
    group: &str,
    level: &str,
    ctx: &RuleContext,
) -> Decoded {
    let label = format!("{}: {group}", term_label(term));
    let (group, level) = match ctx.levels {
        LevelMode::Separate => (label, level.to_string()),
        LevelMode::Collapsed => (format!("{label}:{level}"), String::new()),
    };
    Decoded {
        effects: Effects::Random,
        component,
        group,
        level,
        function: None,
        cleaned: term.to_string(),
    }
}

/// Human label of a term: `(Intercept)` becomes `Intercept`.
pub(crate) fn term_label(term: &str) -> &str {
    term.strip_prefix('(')
        .and_then(|t| t.strip_suffix(')'))
        .unwrap_or(term)
}

/// Cleaned name of a correlation: a single operand when both are equal.
pub(crate) fn join_operands(a: &str, b: &str) -> String {
    if a == b {
        a.to_string()
    } else {
        format!("{a}{OPERAND_SEPARATOR}{b}")
    }
}

pub(crate) const OPERAND_SEPARATOR: &str = " ~ ";

/// Capture by name, empty when the group did not participate.
pub(crate) fn named<'t>(caps: &Captures<'t>, name: &str) -> &'t str {
    caps.name(name).map_or("", |m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn term_label_strips_parentheses() {
        assert_eq!(term_label("(Intercept)"), "Intercept");
        assert_eq!(term_label("Days"), "Days");
        assert_eq!(term_label("(phi"), "(phi");
    }

    #[test]
    fn equal_operands_collapse() {
        assert_eq!(join_operands("(Intercept)", "(Intercept)"), "(Intercept)");
        assert_eq!(join_operands("Days", "(Intercept)"), "Days ~ (Intercept)");
    }

    #[test]
    fn level_mode_controls_group_label() {
        let separate = RuleContext {
            levels: LevelMode::Separate,
        };
        let d = random_effect(Component::Conditional, "(Intercept)", "Subject", "308", &separate);
        assert_eq!(d.group, "Intercept: Subject");
        assert_eq!(d.level, "308");
        assert_eq!(d.cleaned, "(Intercept)");

        let collapsed = RuleContext {
            levels: LevelMode::Collapsed,
        };
        let d = random_effect(Component::Conditional, "Days", "Subject", "308", &collapsed);
        assert_eq!(d.group, "Days: Subject:308");
        assert!(d.level.is_empty());
    }
}
