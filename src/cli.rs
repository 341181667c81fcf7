use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::services::backticks::fix_backticks;
use crate::services::outline;
use crate::services::{FsLectureSource, LectureSource, MarkerTable, TasksParser};

#[derive(Parser)]
#[command(name = "lectorium")]
#[command(author, version, about = "Interview-prep lectures with practice tasks", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server
    Serve,

    /// Parse a tasks markdown file and print the result as JSON
    ParseTasks {
        /// Markdown file with the tasks section
        file: PathBuf,
        /// JSON marker table (defaults to MARKERS_FILE or the built-in markers)
        #[arg(long)]
        markers: Option<PathBuf>,
        /// Print JSON on a single line
        #[arg(long)]
        compact: bool,
    },

    /// Print the heading outline of a markdown file
    Outline {
        file: PathBuf,
    },

    /// List lectures found in LECTURES_DIR
    Lectures,

    /// Remove backslash escapes before backticks in markdown files
    FixBackticks {
        /// File or directory (every .md file below it is processed)
        path: PathBuf,
        /// Only report what would change
        #[arg(long)]
        dry_run: bool,
    },
}

pub fn handle_parse_tasks(file: &Path, markers: Option<&Path>, compact: bool) -> Result<()> {
    let markers = match markers {
        Some(path) => MarkerTable::from_json_file(path)?,
        None => Config::new().load_markers()?,
    };
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let tasks = TasksParser::new(markers).parse(&text);
    info!("{}: {} tasks", file.display(), tasks.items.len());

    let json = if compact {
        serde_json::to_string(&tasks)?
    } else {
        serde_json::to_string_pretty(&tasks)?
    };
    println!("{}", json);
    Ok(())
}

pub fn handle_outline(file: &Path) -> Result<()> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    for entry in outline::outline(&text) {
        let indent = "  ".repeat(usize::from(entry.level.saturating_sub(1)));
        println!("{}{} (#{})", indent, entry.title, entry.anchor);
    }
    Ok(())
}

pub async fn handle_lectures() -> Result<()> {
    let config = Config::new();
    let source = FsLectureSource::new(config.lectures_dir.clone());

    for lecture in source.list().await? {
        let tabs: Vec<_> = lecture.tabs.iter().map(|t| t.label).collect();
        println!("{:24} {} [{}]", lecture.slug, lecture.title, tabs.join(", "));
    }
    Ok(())
}

pub fn handle_fix_backticks(path: &Path, dry_run: bool) -> Result<()> {
    let fixes = fix_backticks(path, dry_run)?;
    let total: usize = fixes.iter().map(|f| f.replacements).sum();

    for fix in &fixes {
        println!("{}: {}", fix.path.display(), fix.replacements);
    }
    println!(
        "{} {} escaped backticks in {} files",
        if dry_run { "Would fix" } else { "Fixed" },
        total,
        fixes.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_args() {
        let cli = Cli::try_parse_from(["lectorium", "parse-tasks", "tasks.md", "--compact"]).unwrap();
        match cli.command {
            Some(Commands::ParseTasks { file, markers, compact }) => {
                assert_eq!(file, PathBuf::from("tasks.md"));
                assert!(markers.is_none());
                assert!(compact);
            }
            _ => panic!("expected parse-tasks"),
        }

        let cli = Cli::try_parse_from(["lectorium", "fix-backticks", "lectures", "--dry-run"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::FixBackticks { dry_run: true, .. })));

        let cli = Cli::try_parse_from(["lectorium"]).unwrap();
        assert!(cli.command.is_none());
    }
}
