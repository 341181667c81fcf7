use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::constants;

/// Literal labels that delimit the structured parts of a tasks section.
///
/// Summary and details lists are preference-ordered: the first marker of a
/// list that occurs in a task wins, wherever it sits in the text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerTable {
    /// Heading line that opens the preparation section
    pub prep_heading: String,
    /// Level-2 heading that closes the preparation section in the lenient match
    pub tasks_heading: String,
    pub answer: String,
    pub explanation: String,
    pub summary: Vec<String>,
    pub details: Vec<String>,
}

impl Default for MarkerTable {
    fn default() -> Self {
        Self {
            prep_heading: constants::PREP_HEADING.to_string(),
            tasks_heading: constants::TASKS_HEADING.to_string(),
            answer: constants::ANSWER_MARKER.to_string(),
            explanation: constants::EXPLANATION_MARKER.to_string(),
            summary: constants::SUMMARY_MARKERS.iter().map(|m| m.to_string()).collect(),
            details: constants::DETAILS_MARKERS.iter().map(|m| m.to_string()).collect(),
        }
    }
}

impl MarkerTable {
    /// Load a table from JSON. Keys left out keep their default values.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read marker table {}", path.display()))?;
        Self::from_json(&data)
    }

    pub fn from_json(data: &str) -> Result<Self> {
        let table: MarkerTable =
            serde_json::from_str(data).context("Invalid marker table JSON")?;
        Ok(table)
    }
}

/// Byte offset and length of the first marker from `markers` found in `text`
pub fn find_preferred(text: &str, markers: &[String]) -> Option<(usize, usize)> {
    markers
        .iter()
        .filter(|m| !m.is_empty())
        .find_map(|m| text.find(m.as_str()).map(|idx| (idx, m.len())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let table = MarkerTable::from_json(r#"{ "answer": "**Answer:**" }"#).unwrap();

        assert_eq!(table.answer, "**Answer:**");
        assert_eq!(table.explanation, constants::EXPLANATION_MARKER);
        assert_eq!(table.summary.len(), 3);
        assert_eq!(table.details.len(), 4);
    }

    #[test]
    fn test_invalid_json() {
        assert!(MarkerTable::from_json("{ not json").is_err());
    }

    #[test]
    fn test_preference_order_beats_position() {
        let markers = MarkerTable::default();
        let text = "**Коротко:** раньше\n**Кратко:** позже";

        let (idx, len) = find_preferred(text, &markers.summary).unwrap();
        assert_eq!(&text[idx..idx + len], "**Кратко:**");
    }

    #[test]
    fn test_no_marker_found() {
        let markers = MarkerTable::default();
        assert_eq!(find_preferred("просто текст", &markers.details), None);
    }
}
