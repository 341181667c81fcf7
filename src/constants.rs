// src/constants.rs

pub const LECTURES_DIR: &str = "./lectures";

// Заголовки разделов в tasks.md
pub const PREP_HEADING: &str = "## Подготовка к заданиям";
pub const TASKS_HEADING: &str = "## Задания";

// Маркеры полей задания
pub const ANSWER_MARKER: &str = "**Ответ:**";
pub const EXPLANATION_MARKER: &str = "**Объяснение:**";
pub const SUMMARY_MARKERS: &[&str] = &["**Кратко:**", "**Краткое описание:**", "**Коротко:**"];
pub const DETAILS_MARKERS: &[&str] = &[
    "**Полное задание:**",
    "**Полное описание:**",
    "**Подробно:**",
    "**Описание:**",
];

pub const TASK_ID_PREFIX: &str = "task-";
pub const DEFAULT_TASK_TITLE: &str = "Задание";

// Файлы лекции внутри её каталога
pub const CONTENT_FILE: &str = "content.md";
pub const SCENARIOS_FILE: &str = "scenarios.md";
pub const EXAMPLE_FILE: &str = "example.md";
pub const TASKS_FILE: &str = "tasks.md";

pub const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown"];
pub const PREVIEW_MAX_CHARS: usize = 200;
