//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - produced by the decoder and the classifier
//! - rendered as terminal tables
//! - exported to JSON/CSV for downstream tools

use std::fmt;

use clap::ValueEnum;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Whether a parameter varies over a grouping factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effects {
    Fixed,
    Random,
}

impl Effects {
    pub fn as_str(self) -> &'static str {
        match self {
            Effects::Fixed => "fixed",
            Effects::Random => "random",
        }
    }
}

impl fmt::Display for Effects {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Model component a parameter belongs to.
///
/// Each naming scheme only ever produces a subset of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    Conditional,
    ZeroInflated,
    Dispersion,
    Sigma,
    SmoothTerms,
    Simplex,
    Priors,
    Auxiliary,
    Distributional,
    Beta,
    #[serde(rename = "mix")]
    Mixture,
    #[serde(rename = "shiftprop")]
    ShiftedProportion,
}

impl Component {
    pub fn as_str(self) -> &'static str {
        match self {
            Component::Conditional => "conditional",
            Component::ZeroInflated => "zero_inflated",
            Component::Dispersion => "dispersion",
            Component::Sigma => "sigma",
            Component::SmoothTerms => "smooth_terms",
            Component::Simplex => "simplex",
            Component::Priors => "priors",
            Component::Auxiliary => "auxiliary",
            Component::Distributional => "distributional",
            Component::Beta => "beta",
            Component::Mixture => "mix",
            Component::ShiftedProportion => "shiftprop",
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Special function wrapping a term (currently only smooths).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TermFunction {
    Smooth,
}

impl TermFunction {
    pub fn as_str(self) -> &'static str {
        match self {
            TermFunction::Smooth => "smooth",
        }
    }
}

/// How per-level random-effect entries are reported.
///
/// This is part of a naming scheme's configuration, never inferred from the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LevelMode {
    /// Keep the grouping-factor level in the `Level` column.
    #[default]
    Separate,
    /// Fold the level into `Group` (`"Intercept: Subject:308"`).
    Collapsed,
}

/// Canonical description of one parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyRecord {
    #[serde(rename = "Parameter")]
    pub parameter: String,
    #[serde(rename = "Effects")]
    pub effects: Effects,
    #[serde(rename = "Component")]
    pub component: Component,
    /// Grouping-factor label; empty for fixed effects.
    #[serde(rename = "Group")]
    pub group: String,
    /// Multivariate response label; empty for univariate models.
    #[serde(rename = "Response")]
    pub response: String,
    #[serde(rename = "Function")]
    pub function: Option<TermFunction>,
    #[serde(rename = "Level")]
    pub level: String,
    #[serde(rename = "Cleaned_Parameter")]
    pub cleaned_parameter: String,
}

impl TaxonomyRecord {
    /// Record for a parameter that no rule claimed.
    pub fn fallback(parameter: &str) -> Self {
        Self {
            parameter: parameter.to_string(),
            effects: Effects::Fixed,
            component: Component::Conditional,
            group: String::new(),
            response: String::new(),
            function: None,
            level: String::new(),
            cleaned_parameter: parameter.to_string(),
        }
    }

    /// Value of a column for this record, as rendered in tables.
    pub fn cell(&self, column: Column) -> &str {
        match column {
            Column::Parameter => &self.parameter,
            Column::Effects => self.effects.as_str(),
            Column::Component => self.component.as_str(),
            Column::Group => &self.group,
            Column::Response => &self.response,
            Column::Function => self.function.map(TermFunction::as_str).unwrap_or(""),
            Column::Level => &self.level,
            Column::CleanedParameter => &self.cleaned_parameter,
        }
    }
}

/// Output columns, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Parameter,
    Effects,
    Component,
    Group,
    Response,
    Function,
    Level,
    CleanedParameter,
}

impl Column {
    pub const ALL: [Column; 8] = [
        Column::Parameter,
        Column::Effects,
        Column::Component,
        Column::Group,
        Column::Response,
        Column::Function,
        Column::Level,
        Column::CleanedParameter,
    ];

    pub fn header(self) -> &'static str {
        match self {
            Column::Parameter => "Parameter",
            Column::Effects => "Effects",
            Column::Component => "Component",
            Column::Group => "Group",
            Column::Response => "Response",
            Column::Function => "Function",
            Column::Level => "Level",
            Column::CleanedParameter => "Cleaned_Parameter",
        }
    }

    /// Optional columns are dropped when empty for every row.
    pub fn is_optional(self) -> bool {
        matches!(
            self,
            Column::Group | Column::Response | Column::Function | Column::Level
        )
    }
}

/// Result of one decode call: records in input order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParameterTable {
    records: Vec<TaxonomyRecord>,
    components: Vec<Component>,
}

impl ParameterTable {
    pub fn new(records: Vec<TaxonomyRecord>) -> Self {
        let mut components = Vec::new();
        for r in &records {
            if !components.contains(&r.component) {
                components.push(r.component);
            }
        }
        Self { records, components }
    }

    pub fn records(&self) -> &[TaxonomyRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<TaxonomyRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct components, in order of first appearance.
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn has_component(&self, component: Component) -> bool {
        self.components.contains(&component)
    }

    /// Visible columns: optional columns that are empty for every row are dropped.
    pub fn columns(&self) -> Vec<Column> {
        Column::ALL
            .into_iter()
            .filter(|&c| !c.is_optional() || self.records.iter().any(|r| !r.cell(c).is_empty()))
            .collect()
    }
}

struct RowView<'a> {
    record: &'a TaxonomyRecord,
    columns: &'a [Column],
}

impl Serialize for RowView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for &c in self.columns {
            map.serialize_entry(c.header(), self.record.cell(c))?;
        }
        map.end()
    }
}

impl Serialize for ParameterTable {
    /// Serializes as a list of rows restricted to the visible columns.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let columns = self.columns();
        serializer.collect_seq(self.records.iter().map(|record| RowView {
            record,
            columns: &columns,
        }))
    }
}

/// Sampling distribution of a model's test statistics.
///
/// "Unsupported" is represented by `Option::None` at the call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Statistic {
    #[serde(rename = "t")]
    T,
    #[serde(rename = "z")]
    Z,
    #[serde(rename = "F")]
    F,
    #[serde(rename = "chi-squared")]
    ChiSquared,
}

impl Statistic {
    pub fn token(self) -> &'static str {
        match self {
            Statistic::T => "t",
            Statistic::Z => "z",
            Statistic::F => "F",
            Statistic::ChiSquared => "chi-squared",
        }
    }

    /// Label used in reports (`"t-statistic"`).
    pub fn long_name(self) -> &'static str {
        match self {
            Statistic::T => "t-statistic",
            Statistic::Z => "z-statistic",
            Statistic::F => "F-statistic",
            Statistic::ChiSquared => "chi-squared statistic",
        }
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Token for an optional statistic; `"unsupported"` stands for the absence value.
pub fn statistic_token(stat: Option<Statistic>) -> &'static str {
    stat.map(Statistic::token).unwrap_or("unsupported")
}
