use lazy_regex::regex;
use log::debug;
use regex::Regex;

use crate::constants;
use crate::models::lecture::{LectureTasks, TaskItem};
use crate::services::markers::{find_preferred, MarkerTable};
use crate::services::normalize::normalize_content;

/// Parser for the tasks section of a lecture.
///
/// The text is read as three regions in order: intro, an optional
/// preparation section, then one block per level-3 heading. Parsing is
/// total: missing headings or markers only leave fields empty.
#[derive(Debug, Clone)]
pub struct TasksParser {
    markers: MarkerTable,
    /// Lenient match for the preparation heading line
    prep_pattern: Option<Regex>,
}

/// Level-3 heading found in the tasks text
#[derive(Debug)]
struct Heading<'a> {
    start: usize,
    end: usize,
    title: &'a str,
}

/// Fields of one task block before they are turned into a `TaskItem`
#[derive(Debug, Default, PartialEq, Eq)]
struct TaskFields<'a> {
    summary: &'a str,
    body: &'a str,
    answer: &'a str,
    explanation: &'a str,
}

impl Default for TasksParser {
    fn default() -> Self {
        Self::new(MarkerTable::default())
    }
}

impl TasksParser {
    pub fn new(markers: MarkerTable) -> Self {
        let prep_pattern = lenient_heading_pattern(&markers.prep_heading);
        Self {
            markers,
            prep_pattern,
        }
    }

    /// Parse raw tasks markdown into intro, prep and ordered task items
    pub fn parse(&self, content: &str) -> LectureTasks {
        let text = normalize_content(content);
        let (prep, rest) = self.split_prep(&text);

        let headings = find_headings(&rest);
        let Some(first) = headings.first() else {
            debug!("Tasks text has no task headings, {} bytes kept as intro", rest.len());
            return LectureTasks {
                intro: rest.trim().to_string(),
                prep,
                items: Vec::new(),
            };
        };

        let intro = rest[..first.start].trim().to_string();
        let items: Vec<TaskItem> = headings
            .iter()
            .enumerate()
            .map(|(i, heading)| {
                let block_end = headings.get(i + 1).map_or(rest.len(), |next| next.start);
                self.build_item(i + 1, heading.title, &rest[heading.end..block_end])
            })
            .collect();

        debug!(
            "Parsed {} tasks (intro: {} bytes, prep: {} bytes)",
            items.len(),
            intro.len(),
            prep.len()
        );

        LectureTasks { intro, prep, items }
    }

    /// Extract the preparation section. Returns `(prep, text without it)`.
    fn split_prep(&self, text: &str) -> (String, String) {
        let heading = self.markers.prep_heading.as_str();

        if !heading.is_empty() {
            if let Some(start) = text.find(heading) {
                let line_end = line_end(text, start);
                return cut_section(text, start, line_end, &["\n## ", "\n### "]);
            }
        }

        if let Some(found) = self.prep_pattern.as_ref().and_then(|re| re.find(text)) {
            let tasks_stop = format!("\n{}", self.markers.tasks_heading);
            let all_stops = [tasks_stop.as_str(), "\n###"];
            let stops: &[&str] = if self.markers.tasks_heading.is_empty() {
                &all_stops[1..]
            } else {
                &all_stops
            };
            return cut_section(text, found.start(), found.end(), stops);
        }

        (String::new(), text.to_string())
    }

    fn build_item(&self, position: usize, title: &str, block: &str) -> TaskItem {
        let fields = self.extract_fields(block);
        let title = title.trim();

        TaskItem {
            id: format!("{}{}", constants::TASK_ID_PREFIX, position),
            title: if title.is_empty() {
                format!("{} {}", constants::DEFAULT_TASK_TITLE, position)
            } else {
                title.to_string()
            },
            summary: fields.summary.to_string(),
            body: fields.body.to_string(),
            answer: fields.answer.to_string(),
            explanation: fields.explanation.to_string(),
        }
    }

    fn extract_fields<'a>(&self, block: &'a str) -> TaskFields<'a> {
        let mut fields = TaskFields {
            body: block,
            ..TaskFields::default()
        };

        // Answer and explanation come first so that their text never leaks into the summary split
        if let Some(idx) = find_marker(block, &self.markers.answer) {
            fields.body = &block[..idx];
            let after = &block[idx + self.markers.answer.len()..];
            match find_marker(after, &self.markers.explanation) {
                Some(exp) => {
                    fields.answer = &after[..exp];
                    fields.explanation = &after[exp + self.markers.explanation.len()..];
                }
                None => fields.answer = after,
            }
        }

        let body = fields.body;
        let summary = find_preferred(body, &self.markers.summary);
        let details = find_preferred(body, &self.markers.details);
        if let (Some((s_idx, s_len)), Some((d_idx, d_len))) = (summary, details) {
            if s_idx + s_len <= d_idx {
                fields.summary = &body[s_idx + s_len..d_idx];
                fields.body = &body[d_idx + d_len..];
            }
        }

        TaskFields {
            summary: fields.summary.trim(),
            body: fields.body.trim(),
            answer: fields.answer.trim(),
            explanation: fields.explanation.trim(),
        }
    }
}

fn find_marker(text: &str, marker: &str) -> Option<usize> {
    if marker.is_empty() {
        return None;
    }
    text.find(marker)
}

/// Offset of the newline ending the line that contains `from`, or the text length
fn line_end(text: &str, from: usize) -> usize {
    text[from..].find('\n').map_or(text.len(), |i| from + i)
}

/// Cut a section whose heading spans `start..line_end`. The body runs from the
/// next line up to the earliest of `stops` (searched from the heading's newline)
/// or the end of text.
fn cut_section(text: &str, start: usize, line_end: usize, stops: &[&str]) -> (String, String) {
    let tail = &text[line_end..];
    let end = stops
        .iter()
        .filter_map(|stop| tail.find(stop))
        .min()
        .map_or(text.len(), |i| line_end + i);

    let body = text.get(line_end + 1..end).unwrap_or("").trim().to_string();

    let mut rest = String::with_capacity(text.len());
    rest.push_str(&text[..start]);
    rest.push_str(&text[end..]);

    (body, rest)
}

/// Heading pattern that tolerates extra whitespace between words, any case
/// and trailing characters on the heading line.
fn lenient_heading_pattern(heading: &str) -> Option<Regex> {
    let words: Vec<String> = heading.split_whitespace().map(regex::escape).collect();
    if words.is_empty() {
        return None;
    }
    Regex::new(&format!(r"(?mi)^{}[^\n]*", words.join(r"\s+"))).ok()
}

fn find_headings(text: &str) -> Vec<Heading<'_>> {
    regex!(r"(?m)^###\s+(.+)$")
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            Some(Heading {
                start: whole.start(),
                end: whole.end(),
                title: caps.get(1).map_or("", |m| m.as_str()),
            })
        })
        .collect()
}
