use std::path::PathBuf;

use crate::constants;
use crate::error::{AppError, AppResult};
use crate::services::markers::MarkerTable;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub lectures_dir: PathBuf,
    /// Optional JSON file overriding the default marker table
    pub markers_file: Option<PathBuf>,
    pub tasks_cache_ttl_seconds: i64,
    pub base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8081);

        Self {
            host: host.clone(),
            port,
            lectures_dir: PathBuf::from(
                std::env::var("LECTURES_DIR")
                    .unwrap_or_else(|_| constants::LECTURES_DIR.to_string()),
            ),
            markers_file: std::env::var("MARKERS_FILE")
                .ok()
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            tasks_cache_ttl_seconds: parse_cache_ttl(
                std::env::var("TASKS_CACHE_TTL").ok().as_deref(),
            ),
            base_url: std::env::var("BASE_URL")
                .unwrap_or_else(|_| format!("http://{}:{}", host, port)),
        }
    }
}

/// Longest accepted tasks cache TTL
pub const MAX_CACHE_TTL_SECONDS: i64 = u32::MAX as i64;

/// `TASKS_CACHE_TTL` in seconds, clamped to `0..=MAX_CACHE_TTL_SECONDS`; 1 hour when unset or invalid
pub fn parse_cache_ttl(value: Option<&str>) -> i64 {
    value
        .and_then(|t| t.trim().parse::<i64>().ok())
        .map(|t| t.clamp(0, MAX_CACHE_TTL_SECONDS))
        .unwrap_or(60 * 60)
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marker table from `MARKERS_FILE`, or the built-in one
    pub fn load_markers(&self) -> AppResult<MarkerTable> {
        match &self.markers_file {
            Some(path) => MarkerTable::from_json_file(path)
                .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e))),
            None => Ok(MarkerTable::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_markers_file_is_config_error() {
        let config = Config {
            markers_file: Some(PathBuf::from("/nonexistent/markers.json")),
            ..Config::new()
        };

        assert!(matches!(config.load_markers(), Err(AppError::Config(_))));
    }

    #[test]
    fn test_default_markers_without_file() {
        let config = Config {
            markers_file: None,
            ..Config::new()
        };

        let markers = config.load_markers().unwrap();
        assert_eq!(markers.answer, constants::ANSWER_MARKER);
    }

    #[test]
    fn test_cache_ttl_is_clamped() {
        assert_eq!(parse_cache_ttl(None), 3600);
        assert_eq!(parse_cache_ttl(Some("600")), 600);
        assert_eq!(parse_cache_ttl(Some(" 0 ")), 0);
        assert_eq!(parse_cache_ttl(Some("-5")), 0);
        assert_eq!(parse_cache_ttl(Some("99999999999999")), MAX_CACHE_TTL_SECONDS);
        assert_eq!(parse_cache_ttl(Some("9223372036854775807")), MAX_CACHE_TTL_SECONDS);
        assert_eq!(parse_cache_ttl(Some("час")), 3600);
    }
}
