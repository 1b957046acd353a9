use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::app_dirs::AppDirs;
use crate::controller::{CompletionListener, SessionMeta};
use crate::error::Result;
use crate::metrics::MetricsSnapshot;

/// One line of the results history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub date: String,
    pub language: String,
    pub snippet_id: String,
    pub difficulty: String,
    pub elapsed_secs: u64,
    pub wpm: u32,
    pub accuracy: f64,
    pub errors: u32,
    pub correct_chars: usize,
    pub total_chars: usize,
}

impl ResultRecord {
    pub fn new(meta: &SessionMeta, m: &MetricsSnapshot, at: DateTime<Local>) -> Self {
        Self {
            date: at.to_rfc3339(),
            language: meta.language.clone(),
            snippet_id: meta.snippet_id.clone(),
            difficulty: meta.difficulty.map(|d| d.to_string()).unwrap_or_default(),
            elapsed_secs: m.elapsed_secs,
            wpm: m.wpm,
            accuracy: m.accuracy,
            errors: m.error_count,
            correct_chars: m.correct_chars,
            total_chars: m.total_chars,
        }
    }
}

/// Appends completed sessions to a CSV file.
#[derive(Debug, Clone)]
pub struct CsvResultsLog {
    path: PathBuf,
}

impl CsvResultsLog {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            path: AppDirs::results_log_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, record: &ResultRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        // If the file doesn't exist yet it needs a header
        let needs_header = !self.path.exists();

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        writer.serialize(record)?;
        writer.flush()?;
        Ok(())
    }

    /// All recorded results, oldest first. A missing file is an empty history.
    pub fn read_all(&self) -> Result<Vec<ResultRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::Reader::from_path(&self.path)?;
        let mut records = Vec::new();
        for row in reader.deserialize::<ResultRecord>() {
            records.push(row?);
        }
        Ok(records)
    }
}

impl CompletionListener for CsvResultsLog {
    fn on_complete(&mut self, meta: &SessionMeta, snapshot: &MetricsSnapshot) {
        let record = ResultRecord::new(meta, snapshot, Local::now());
        match self.append(&record) {
            Ok(()) => debug!(path = %self.path.display(), "result recorded"),
            Err(e) => warn!(path = %self.path.display(), error = %e, "could not record result"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snippets::Difficulty;
    use tempfile::tempdir;

    fn meta() -> SessionMeta {
        SessionMeta {
            language: "go".into(),
            snippet_id: "go-2".into(),
            difficulty: Some(Difficulty::Medium),
        }
    }

    fn snapshot(wpm: u32) -> MetricsSnapshot {
        MetricsSnapshot {
            wpm,
            accuracy: 97.5,
            elapsed_secs: 42,
            error_count: 3,
            correct_chars: 117,
            total_chars: 120,
        }
    }

    #[test]
    fn test_header_written_once() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("results.csv");
        let log = CsvResultsLog::with_path(&path);

        log.append(&ResultRecord::new(&meta(), &snapshot(40), Local::now()))
            .unwrap();
        log.append(&ResultRecord::new(&meta(), &snapshot(45), Local::now()))
            .unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("date,language,snippet_id,difficulty"));
        assert_eq!(text.matches("date,").count(), 1);
    }

    #[test]
    fn test_read_back_records() {
        let dir = tempdir().unwrap();
        let log = CsvResultsLog::with_path(dir.path().join("nested").join("results.csv"));

        log.append(&ResultRecord::new(&meta(), &snapshot(51), Local::now()))
            .unwrap();

        let records = log.read_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].wpm, 51);
        assert_eq!(records[0].difficulty, "medium");
        assert_eq!(records[0].accuracy, 97.5);
        assert_eq!(records[0].errors, 3);
    }

    #[test]
    fn test_missing_file_is_empty_history() {
        let dir = tempdir().unwrap();
        let log = CsvResultsLog::with_path(dir.path().join("none.csv"));
        assert!(log.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_listener_appends_on_completion() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("results.csv");
        let mut log = CsvResultsLog::with_path(&path);

        log.on_complete(&SessionMeta::default(), &snapshot(12));

        let records = CsvResultsLog::with_path(&path).read_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].snippet_id, "custom");
        assert_eq!(records[0].difficulty, "");
    }
}
