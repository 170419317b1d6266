//! Exports of decoded tables and batch results.
//!
//! CSV and JSON outputs both carry only the visible columns of a table.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::batch::BatchResult;
use crate::decode::NamingScheme;
use crate::domain::{Component, ParameterTable};
use crate::error::InsightError;

/// JSON document wrapping one decoded table.
#[derive(Debug, Serialize)]
pub struct TableExport<'a> {
    pub tool: &'static str,
    pub generated_at: DateTime<Utc>,
    pub scheme: String,
    pub components: &'a [Component],
    pub table: &'a ParameterTable,
}

impl<'a> TableExport<'a> {
    pub fn new(scheme: NamingScheme, table: &'a ParameterTable) -> Self {
        Self {
            tool: "insight",
            generated_at: Utc::now(),
            scheme: scheme.to_string(),
            components: table.components(),
            table,
        }
    }
}

/// Stdout, or a freshly created file.
pub fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>, InsightError> {
    match path {
        None => Ok(Box::new(std::io::stdout().lock())),
        Some(path) => {
            let file = File::create(path)
                .map_err(|e| InsightError::input(format!("Failed to create '{}': {e}", path.display())))?;
            Ok(Box::new(file))
        }
    }
}

pub fn write_table_csv<W: Write>(writer: W, table: &ParameterTable) -> Result<(), InsightError> {
    let columns = table.columns();
    let mut csv = csv::Writer::from_writer(writer);

    csv.write_record(columns.iter().map(|c| c.header()))
        .map_err(|e| InsightError::input(format!("Failed to write CSV header: {e}")))?;
    for record in table.records() {
        csv.write_record(columns.iter().map(|&c| record.cell(c)))
            .map_err(|e| InsightError::input(format!("Failed to write CSV row: {e}")))?;
    }
    csv.flush()
        .map_err(|e| InsightError::input(format!("Failed to flush CSV output: {e}")))?;
    Ok(())
}

pub fn write_table_json<W: Write>(
    mut writer: W,
    scheme: NamingScheme,
    table: &ParameterTable,
) -> Result<(), InsightError> {
    let export = TableExport::new(scheme, table);
    serde_json::to_writer_pretty(&mut writer, &export)
        .map_err(|e| InsightError::input(format!("Failed to write JSON: {e}")))?;
    writeln!(writer).map_err(|e| InsightError::input(format!("Failed to write JSON: {e}")))?;
    Ok(())
}

pub fn write_batch_json<W: Write>(mut writer: W, results: &[BatchResult]) -> Result<(), InsightError> {
    serde_json::to_writer_pretty(&mut writer, results)
        .map_err(|e| InsightError::input(format!("Failed to write batch JSON: {e}")))?;
    writeln!(writer).map_err(|e| InsightError::input(format!("Failed to write batch JSON: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::decode::{DecodeHints, decode};

    fn brms_table() -> (NamingScheme, ParameterTable) {
        let scheme = NamingScheme::lookup("brms").unwrap();
        let table = decode(
            &["b_Intercept", "r_Subject[308,Intercept]"],
            scheme,
            &DecodeHints::default(),
        )
        .unwrap();
        (scheme, table)
    }

    #[test]
    fn csv_has_visible_columns_only() {
        let (_, table) = brms_table();
        let mut out = Vec::new();
        write_table_csv(&mut out, &table).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("Parameter,Effects,Component,Group,Level,Cleaned_Parameter")
        );
        assert_eq!(lines.next(), Some("b_Intercept,fixed,conditional,,,(Intercept)"));
        assert_eq!(
            lines.next(),
            Some("\"r_Subject[308,Intercept]\",random,conditional,Intercept: Subject,308,(Intercept)")
        );
    }

    #[test]
    fn json_export_carries_metadata() {
        let (scheme, table) = brms_table();
        let mut out = Vec::new();
        write_table_json(&mut out, scheme, &table).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["tool"], "insight");
        assert_eq!(value["scheme"], "stan-brms");
        assert_eq!(value["components"], serde_json::json!(["conditional"]));
        assert_eq!(value["table"][1]["Group"], "Intercept: Subject");
        assert!(value["generated_at"].is_string());
    }
}
