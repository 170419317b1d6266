//! Terminal formatting for decoded tables and classifier results.

use crate::classify::ModelQuery;
use crate::decode::SCHEME_TAGS;
use crate::domain::{ParameterTable, Statistic, statistic_token};

/// Aligned text table of the visible columns.
pub fn format_table(table: &ParameterTable) -> String {
    let columns = table.columns();
    let widths: Vec<usize> = columns
        .iter()
        .map(|&c| {
            table
                .records()
                .iter()
                .map(|r| r.cell(c).chars().count())
                .fold(c.header().len(), usize::max)
        })
        .collect();

    let mut out = String::new();
    let header: Vec<String> = columns
        .iter()
        .zip(&widths)
        .map(|(c, &w)| format!("{:<w$}", c.header()))
        .collect();
    out.push_str(header.join("  ").trim_end());
    out.push('\n');
    let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    out.push_str(&rule.join("  "));
    out.push('\n');

    for record in table.records() {
        let cells: Vec<String> = columns
            .iter()
            .zip(&widths)
            .map(|(&c, &w)| format!("{:<w$}", record.cell(c)))
            .collect();
        out.push_str(cells.join("  ").trim_end());
        out.push('\n');
    }

    if !table.components().is_empty() {
        let components: Vec<&str> = table.components().iter().map(|c| c.as_str()).collect();
        out.push_str(&format!("\nComponents: {}\n", components.join(", ")));
    }
    out
}

/// One-line classifier answer, e.g. `glm (family: binomial): z-statistic`.
pub fn format_statistic(query: &ModelQuery, statistic: Option<Statistic>) -> String {
    let mut subject = query.class.clone();
    if let Some(method) = &query.test_method {
        subject.push_str(&format!(" [{}]", method.trim()));
    }
    if let Some(family) = &query.family {
        subject.push_str(&format!(" (family: {family})"));
    }
    let answer = match statistic {
        Some(stat) => stat.long_name(),
        None => statistic_token(None),
    };
    format!("{subject}: {answer}")
}

/// Registered naming schemes and their aliases.
pub fn format_schemes() -> String {
    let width = SCHEME_TAGS.iter().map(|(tag, _)| tag.len()).max().unwrap_or(0);
    let mut out = String::new();
    for (tag, aliases) in SCHEME_TAGS {
        if aliases.is_empty() {
            out.push_str(&format!("{tag}\n"));
        } else {
            out.push_str(&format!("{tag:<width$}  (aliases: {})\n", aliases.join(", ")));
        }
    }
    out
}
