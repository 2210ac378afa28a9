//! Failure log: a markdown table appended one row per failure.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::io::Write;
use std::path::{Path, PathBuf};

const HEADER: &str = "| Timestamp | Asset ID | File Name | Error Reason |\n| --- | --- | --- | --- |\n";

/// One failed asset or link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureRecord {
    pub timestamp: DateTime<Local>,
    pub asset_id: String,
    /// Which file or link failed; `ALL` when the asset had no links, `CRITICAL` on page errors.
    pub label: String,
    pub reason: String,
}

impl FailureRecord {
    pub fn now(asset_id: &str, label: &str, reason: &str) -> Self {
        Self {
            timestamp: Local::now(),
            asset_id: asset_id.to_string(),
            label: label.to_string(),
            reason: reason.to_string(),
        }
    }

    fn to_row(&self) -> String {
        format!(
            "| {} | **{}** | {} | {} |\n",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            cell(&self.asset_id),
            cell(&self.label),
            cell(&self.reason)
        )
    }
}

/// Keeps a value inside one table cell.
fn cell(value: &str) -> String {
    value
        .replace('|', "\\|")
        .split(|c: char| c == '\r' || c == '\n')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Append-only failure log. The header is written when the file is first created.
#[derive(Debug, Clone)]
pub struct FailureLog {
    path: PathBuf,
}

impl FailureLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn record(&self, record: &FailureRecord) -> Result<()> {
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("open failure log: {}", self.path.display()))?;
        let is_new = file
            .metadata()
            .with_context(|| format!("stat failure log: {}", self.path.display()))?
            .len()
            == 0;
        let mut out = String::new();
        if is_new {
            out.push_str(HEADER);
        }
        out.push_str(&record.to_row());
        file.write_all(out.as_bytes())
            .with_context(|| format!("append failure log: {}", self.path.display()))?;
        tracing::debug!(
            asset = %record.asset_id,
            label = %record.label,
            "failure recorded: {}",
            record.reason
        );
        Ok(())
    }

    /// Number of rows recorded so far (0 if the file does not exist).
    pub fn count(&self) -> Result<usize> {
        let data = match std::fs::read_to_string(&self.path) {
            Ok(d) => d,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("read failure log: {}", self.path.display()))
            }
        };
        Ok(data.lines().skip(2).filter(|l| l.starts_with('|')).count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let log = FailureLog::new(dir.path().join("failed_downloads.md"));
        log.record(&FailureRecord::now("a2", "ALL", "No links found on page"))
            .unwrap();
        log.record(&FailureRecord::now("a2", "2K-PNG", "timeout")).unwrap();

        let text = std::fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "| Timestamp | Asset ID | File Name | Error Reason |");
        assert_eq!(lines[1], "| --- | --- | --- | --- |");
        assert!(lines[2].ends_with("| **a2** | ALL | No links found on page |"));
        assert!(lines[3].ends_with("| **a2** | 2K-PNG | timeout |"));
        assert_eq!(log.count().unwrap(), 2);
    }

    #[test]
    fn cells_are_flattened() {
        let record = FailureRecord::now("x", "a|b", "line one\nline two");
        let row = record.to_row();
        assert!(row.ends_with("| **x** | a\\|b | line one line two |\n"));
        assert_eq!(row.matches('\n').count(), 1);
    }

    #[test]
    fn missing_log_counts_zero() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(FailureLog::new(dir.path().join("f.md")).count().unwrap(), 0);
    }
}
