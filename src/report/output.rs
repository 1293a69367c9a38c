//! Writing report files to disk.

use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::error::{AppError, Result};

/// Pretty-print `payload` as JSON into `path`, creating parent directories.
pub fn write_json<T: Serialize>(path: &Path, payload: &T) -> Result<()> {
    let mut content = serde_json::to_string_pretty(payload)?;
    content.push('\n');
    write_file(path, &content)
}

/// Write an HTML document into `path`, creating parent directories.
pub fn write_html(path: &Path, html: &str) -> Result<()> {
    write_file(path, html)
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| AppError::io(parent, e))?;
    }
    fs::write(path, content).map_err(|e| AppError::io(path, e))?;
    debug!(path = %path.display(), bytes = content.len(), "Wrote report file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;

    #[test]
    fn test_write_json_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("nested").join("report.json");

        write_json(&path, &json!({ "count": 1, "issues": [{ "key": "A-1" }] })).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("\n  \"count\": 1"));
        let value: Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["issues"][0]["key"], "A-1");
    }

    #[test]
    fn test_write_html_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.html");

        write_html(&path, "<p>old</p>").unwrap();
        write_html(&path, "<p>new</p>").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "<p>new</p>");
    }

    #[test]
    fn test_unwritable_path_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "x").unwrap();

        let err = write_html(&blocker.join("report.html"), "").unwrap_err();
        assert!(matches!(err, AppError::Io { .. }));
    }
}
