use anyhow::{Context, Result};
use lazy_regex::regex;
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::constants;

/// Outcome for one file that contained escaped backticks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BacktickFix {
    pub path: PathBuf,
    pub replacements: usize,
}

/// Remove backslash escapes in front of backticks.
///
/// Lecture text copied out of template-literal seed files keeps `` \` ``
/// (sometimes `` \\\` ``), which breaks inline code and fences in Markdown.
/// Any run of backslashes directly before a backtick is dropped.
pub fn unescape_backticks(text: &str) -> (String, usize) {
    let re = regex!(r"\\+`");
    let count = re.find_iter(text).count();
    if count == 0 {
        return (text.to_string(), 0);
    }
    (re.replace_all(text, "`").into_owned(), count)
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| constants::MARKDOWN_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
}

/// Fix a single file, or every Markdown file under a directory.
/// With `dry_run` nothing is written, only counted.
pub fn fix_backticks(path: &Path, dry_run: bool) -> Result<Vec<BacktickFix>> {
    let files: Vec<PathBuf> = if path.is_dir() {
        WalkDir::new(path)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file() && is_markdown(e.path()))
            .map(|e| e.into_path())
            .collect()
    } else {
        vec![path.to_path_buf()]
    };

    let mut fixes = Vec::new();
    for file in files {
        let text = fs::read_to_string(&file)
            .with_context(|| format!("Failed to read {}", file.display()))?;
        let (fixed, replacements) = unescape_backticks(&text);
        if replacements == 0 {
            debug!("No escaped backticks in {:?}", file);
            continue;
        }

        if !dry_run {
            fs::write(&file, fixed).with_context(|| format!("Failed to write {}", file.display()))?;
        }
        info!("{:?}: {} escaped backticks{}", file, replacements, if dry_run { " (dry run)" } else { "" });
        fixes.push(BacktickFix {
            path: file,
            replacements,
        });
    }

    Ok(fixes)
}
