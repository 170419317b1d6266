//! Reading parameter lists and batch descriptor files.
//!
//! Parameter lists come in two shapes:
//! - plain text, one raw name per line (blank lines and `#` comments skipped)
//! - CSV with a `Parameter` column (any other columns are ignored)
//!
//! `-` stands for stdin everywhere.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::batch::ModelDescriptor;
use crate::error::InsightError;

const PARAMETER_COLUMN: &str = "parameter";

/// Read raw parameter names from a file, or stdin for `-`.
pub fn read_parameters(input: &Path) -> Result<Vec<String>, InsightError> {
    let is_csv = input
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    let reader = open_input(input)?;
    let parameters = if is_csv {
        parse_parameter_csv(reader)?
    } else {
        let mut text = String::new();
        BufReader::new(reader)
            .read_to_string(&mut text)
            .map_err(|e| InsightError::input(format!("Failed to read '{}': {e}", input.display())))?;
        parse_parameter_lines(&text)
    };
    tracing::debug!(input = %input.display(), count = parameters.len(), "read parameters");
    Ok(parameters)
}

/// One parameter per line. Surrounding whitespace is dropped; names keep
/// their inner spaces (`SD (Intercept: Subject)`).
pub fn parse_parameter_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Values of the `Parameter` column of a CSV document.
pub fn parse_parameter_csv<R: Read>(reader: R) -> Result<Vec<String>, InsightError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| InsightError::input(format!("Failed to read CSV headers: {e}")))?
        .clone();
    let column = headers
        .iter()
        .position(|h| normalize_header_name(h) == PARAMETER_COLUMN)
        .ok_or_else(|| InsightError::input("CSV input has no `Parameter` column"))?;

    let mut out = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // Header is line 1.
        let line = idx + 2;
        let record = result.map_err(|e| InsightError::input(format!("CSV line {line}: {e}")))?;
        match record.get(column) {
            Some(value) if !value.is_empty() => out.push(value.to_string()),
            _ => tracing::warn!(line, "skipping CSV row without a parameter"),
        }
    }
    Ok(out)
}

/// Batch descriptors: a JSON array of objects.
pub fn read_descriptors(input: &Path) -> Result<Vec<ModelDescriptor>, InsightError> {
    let reader = BufReader::new(open_input(input)?);
    serde_json::from_reader(reader)
        .map_err(|e| InsightError::input(format!("Invalid descriptor JSON '{}': {e}", input.display())))
}

fn open_input(input: &Path) -> Result<Box<dyn Read>, InsightError> {
    if input.as_os_str() == "-" {
        return Ok(Box::new(std::io::stdin().lock()));
    }
    let file = File::open(input)
        .map_err(|e| InsightError::input(format!("Failed to open '{}': {e}", input.display())))?;
    Ok(Box::new(file))
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports may prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn lines_skip_blanks_and_comments() {
        let text = "# brms draws\nb_Intercept\n\n  sd_Subject__Intercept  \nSD (Intercept: Subject)\n";
        assert_eq!(
            parse_parameter_lines(text),
            vec!["b_Intercept", "sd_Subject__Intercept", "SD (Intercept: Subject)"]
        );
    }

    #[test]
    fn csv_parameter_column_is_found_case_insensitively() {
        let csv = "\u{feff}Estimate,PARAMETER\n1.0,b_x\n2.0,\"r_Subject[1,Intercept]\"\n3.0,\n";
        let parameters = parse_parameter_csv(csv.as_bytes()).unwrap();
        assert_eq!(parameters, vec!["b_x", "r_Subject[1,Intercept]"]);
    }

    #[test]
    fn csv_without_parameter_column_is_rejected() {
        let err = parse_parameter_csv("name\nx\n".as_bytes()).unwrap_err();
        assert!(matches!(err, InsightError::Input(_)));
    }

    #[test]
    fn missing_file_is_an_input_error() {
        let err = read_parameters(Path::new("/nonexistent/params.txt")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/params.txt"));
    }
}
