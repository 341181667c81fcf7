use serde::{Deserialize, Serialize};

use crate::services::outline::OutlineEntry;

/// Lecture slug, the name of its directory (e.g. "http-basics")
pub type LectureSlug = String;

/// A single practice task extracted from a lecture's tasks section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskItem {
    /// Position-derived key ("task-1", "task-2", ...), not stable across edits
    pub id: String,
    pub title: String,
    /// Short preview, only set when both summary and details markers are present
    pub summary: String,
    pub body: String,
    pub answer: String,
    pub explanation: String,
}

/// Parsed tasks section of a lecture
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LectureTasks {
    /// Free text before the first task heading
    pub intro: String,
    /// Preparation section body, empty when absent
    pub prep: String,
    pub items: Vec<TaskItem>,
}

/// Lecture with its optional companion sections
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lecture {
    pub slug: LectureSlug,
    pub title: String,
    /// Main lecture text in Markdown
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scenarios_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tasks_content: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TabKind {
    Content,   // Лекция
    Scenarios, // Сценарии
    Example,   // Пример
    Tasks,     // Задания
}

impl TabKind {
    pub fn label(&self) -> &'static str {
        match self {
            TabKind::Content => "Лекция",
            TabKind::Scenarios => "Сценарии",
            TabKind::Example => "Пример",
            TabKind::Tasks => "Задания",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LectureTab {
    pub kind: TabKind,
    pub label: &'static str,
}

impl From<TabKind> for LectureTab {
    fn from(kind: TabKind) -> Self {
        Self {
            kind,
            label: kind.label(),
        }
    }
}

/// Lecture with truncated info (for lists)
#[derive(Debug, Clone, Serialize)]
pub struct LectureSummary {
    pub slug: LectureSlug,
    pub title: String,
    pub preview: String,
    pub tabs: Vec<LectureTab>,
}

/// Full lecture response
#[derive(Debug, Serialize)]
pub struct LectureDetail {
    #[serde(flatten)]
    pub lecture: Lecture,
    pub tabs: Vec<LectureTab>,
    pub outline: Vec<OutlineEntry>,
}

/// Request to parse arbitrary tasks markdown
#[derive(Debug, Deserialize)]
pub struct ParseTasksRequest {
    pub content: String,
}

fn has_text(section: &Option<String>) -> bool {
    section.as_deref().is_some_and(|s| !s.trim().is_empty())
}

impl Lecture {
    /// Tabs shown for this lecture, in display order. Blank sections get no tab.
    pub fn tabs(&self) -> Vec<LectureTab> {
        let mut tabs = vec![LectureTab::from(TabKind::Content)];
        if has_text(&self.scenarios_content) {
            tabs.push(TabKind::Scenarios.into());
        }
        if has_text(&self.example_content) {
            tabs.push(TabKind::Example.into());
        }
        if self.has_tasks() {
            tabs.push(TabKind::Tasks.into());
        }
        tabs
    }

    pub fn has_tasks(&self) -> bool {
        has_text(&self.tasks_content)
    }
}
