use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{info, warn};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::constants;
use crate::models::{Lecture, LectureSummary};
use crate::services::normalize::normalize_content;
use crate::services::outline;

/// Source of lecture documents
#[async_trait]
pub trait LectureSource: Send + Sync {
    /// All lectures, sorted by slug
    async fn list(&self) -> Result<Vec<LectureSummary>>;

    /// Lecture by slug, `None` if it does not exist
    async fn get(&self, slug: &str) -> Result<Option<Lecture>>;
}

/// Lectures stored as one directory per lecture:
///
/// ```text
/// lectures/
///   http-basics/
///     content.md      (required)
///     scenarios.md
///     example.md
///     tasks.md
/// ```
#[derive(Clone)]
pub struct FsLectureSource {
    root: PathBuf,
}

impl FsLectureSource {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn lecture_dirs(&self) -> Vec<PathBuf> {
        WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_dir())
            .map(|e| e.into_path())
            .filter(|dir| dir.join(constants::CONTENT_FILE).is_file())
            .collect()
    }

    async fn load(&self, slug: &str, dir: &Path) -> Result<Lecture> {
        let content = read_section(dir, constants::CONTENT_FILE)
            .await?
            .with_context(|| format!("Lecture {} has no {}", slug, constants::CONTENT_FILE))?;

        let title = outline::first_heading(&content)
            .map(|(_, title)| title)
            .unwrap_or_else(|| slug.to_string());

        Ok(Lecture {
            slug: slug.to_string(),
            title,
            content,
            scenarios_content: read_section(dir, constants::SCENARIOS_FILE).await?,
            example_content: read_section(dir, constants::EXAMPLE_FILE).await?,
            tasks_content: read_section(dir, constants::TASKS_FILE).await?,
        })
    }
}

#[async_trait]
impl LectureSource for FsLectureSource {
    async fn list(&self) -> Result<Vec<LectureSummary>> {
        let mut lectures = Vec::new();

        for dir in self.lecture_dirs() {
            let Some(slug) = dir.file_name().and_then(|n| n.to_str()).map(str::to_string) else {
                warn!("Skipping lecture directory with non UTF-8 name: {:?}", dir);
                continue;
            };

            match self.load(&slug, &dir).await {
                Ok(lecture) => lectures.push(LectureSummary {
                    preview: outline::first_paragraph(&lecture.content, constants::PREVIEW_MAX_CHARS)
                        .unwrap_or_default(),
                    tabs: lecture.tabs(),
                    slug: lecture.slug,
                    title: lecture.title,
                }),
                Err(e) => warn!("Skipping lecture {}: {:#}", slug, e),
            }
        }

        info!("Found {} lectures in {:?}", lectures.len(), self.root);
        Ok(lectures)
    }

    async fn get(&self, slug: &str) -> Result<Option<Lecture>> {
        if !is_valid_slug(slug) {
            return Ok(None);
        }

        let dir = self.root.join(slug);
        if !dir.join(constants::CONTENT_FILE).is_file() {
            return Ok(None);
        }

        self.load(slug, &dir).await.map(Some)
    }
}

/// Slugs are plain directory names; anything that could leave the root is rejected
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug != "."
        && slug != ".."
        && !slug.contains(['/', '\\'])
        && !slug.contains("..")
}

/// Read an optional section file; missing files are `None`
async fn read_section(dir: &Path, file: &str) -> Result<Option<String>> {
    let path = dir.join(file);
    match tokio::fs::read_to_string(&path).await {
        Ok(text) => Ok(Some(normalize_content(&text))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_lecture(root: &Path, slug: &str, files: &[(&str, &str)]) {
        let dir = root.join(slug);
        fs::create_dir_all(&dir).unwrap();
        for (name, text) in files {
            fs::write(dir.join(name), text).unwrap();
        }
    }

    #[tokio::test]
    async fn test_list_sorted_and_skips_incomplete() {
        let tmp = tempfile::tempdir().unwrap();
        write_lecture(tmp.path(), "b-sql", &[("content.md", "# SQL\n\nJOIN и индексы.")]);
        write_lecture(tmp.path(), "a-http", &[("content.md", "# HTTP\n\nМетоды."), ("tasks.md", "### A\nx")]);
        write_lecture(tmp.path(), "c-draft", &[("tasks.md", "### A\nx")]);

        let source = FsLectureSource::new(tmp.path().to_path_buf());
        let lectures = source.list().await.unwrap();

        let slugs: Vec<_> = lectures.iter().map(|l| l.slug.as_str()).collect();
        assert_eq!(slugs, vec!["a-http", "b-sql"]);
        assert_eq!(lectures[0].title, "HTTP");
        assert_eq!(lectures[0].preview, "Методы.");
        assert_eq!(lectures[0].tabs.len(), 2);
        assert_eq!(lectures[1].tabs.len(), 1);
    }

    #[tokio::test]
    async fn test_get_normalizes_sections() {
        let tmp = tempfile::tempdir().unwrap();
        write_lecture(
            tmp.path(),
            "http",
            &[
                ("content.md", "Без заголовка"),
                ("tasks.md", "\u{feff}### A\r\nx\r\n"),
            ],
        );

        let source = FsLectureSource::new(tmp.path().to_path_buf());
        let lecture = source.get("http").await.unwrap().unwrap();

        assert_eq!(lecture.title, "http");
        assert_eq!(lecture.tasks_content.as_deref(), Some("### A\nx\n"));
        assert_eq!(lecture.scenarios_content, None);
    }

    #[tokio::test]
    async fn test_get_missing_and_invalid() {
        let tmp = tempfile::tempdir().unwrap();
        let source = FsLectureSource::new(tmp.path().to_path_buf());

        assert!(source.get("nope").await.unwrap().is_none());
        assert!(source.get("../etc").await.unwrap().is_none());
    }

    #[test]
    fn test_slug_validation() {
        assert!(is_valid_slug("http-basics"));
        assert!(is_valid_slug("алгоритмы"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug(".."));
        assert!(!is_valid_slug("a/b"));
        assert!(!is_valid_slug("a\\b"));
    }
}
