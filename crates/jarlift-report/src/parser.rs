use jarlift_core::DeployError;

use crate::ReportRow;

/// Column-name echoes the query tool inserts after values.
pub const ECHO_TOKENS: [&str; 4] = [" (name)", " (age)", " (class_name)", " (grade)"];

const FIELD_COUNT: usize = 4;

/// Turns raw query output into report rows.
pub trait RowParser {
    fn parse(&self, raw: &str) -> Result<Vec<ReportRow>, DeployError>;
}

/// Parser for the comma-delimited text the query tool prints.
///
/// Relies on the exact echo tokens in [`ECHO_TOKENS`]; any other decoration
/// passes through into the field values.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoTokenParser;

impl RowParser for EchoTokenParser {
    fn parse(&self, raw: &str) -> Result<Vec<ReportRow>, DeployError> {
        let cleaned = clean_output(raw.trim());
        if cleaned.is_empty() {
            return Ok(Vec::new());
        }

        cleaned
            .lines()
            .enumerate()
            .map(|(index, line)| parse_line(index + 1, line))
            .collect()
    }
}

/// Strips the echo tokens, then collapses `", "` to `","`.
pub fn clean_output(raw: &str) -> String {
    let mut cleaned = raw.to_string();
    for token in ECHO_TOKENS {
        cleaned = cleaned.replace(token, "");
    }
    cleaned.replace(", ", ",")
}

fn parse_line(line_number: usize, line: &str) -> Result<ReportRow, DeployError> {
    let fields = line.split(',').collect::<Vec<_>>();
    let [name, age, class_name, grade] = fields.as_slice() else {
        return Err(DeployError::Parse {
            line: line_number,
            reason: format!(
                "expected {FIELD_COUNT} comma-separated fields, found {}: '{line}'",
                fields.len()
            ),
        });
    };

    Ok(ReportRow {
        name: name.to_string(),
        age: age.to_string(),
        class_name: class_name.to_string(),
        grade: grade.to_string(),
    })
}
