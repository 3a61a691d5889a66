//! Append-only results file.

use std::fs::{File, OpenOptions};
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use argus_core::error::AppError;
use argus_core::models::MatchResult;
use argus_core::traits::ResultSink;

/// [`ResultSink`] writing one text block per keyword to a results file.
///
/// Opened in append mode and flushed after every write, so everything
/// recorded before an abort or interrupt survives on disk.
#[derive(Debug)]
pub struct FileSink {
    file: Mutex<File>,
    path: PathBuf,
}

impl FileSink {
    pub fn create(path: &Path) -> Result<Self, AppError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| AppError::Sink(format!("cannot open {}: {e}", path.display())))?;
        Ok(Self {
            file: Mutex::new(file),
            path: path.to_path_buf(),
        })
    }

    fn append(&self, block: &str) -> Result<(), AppError> {
        let mut file = self
            .file
            .lock()
            .map_err(|_| AppError::Sink("results file lock poisoned".to_string()))?;
        file.write_all(block.as_bytes())
            .and_then(|()| file.flush())
            .map_err(|e| AppError::Sink(format!("write to {} failed: {e}", self.path.display())))
    }
}

impl ResultSink for FileSink {
    fn append_keyword_header(&self, keyword: &str) -> Result<(), AppError> {
        self.append(&format!("=== Keyword: '{keyword}' ===\n"))
    }

    fn append_match(&self, result: &MatchResult) -> Result<(), AppError> {
        self.append(&format!("{}\n", result.render()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argus_core::domain::Domain;

    #[test]
    fn writes_keyword_blocks_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.txt");
        let sink = FileSink::create(&path).unwrap();

        sink.append_keyword_header("buy shoes").unwrap();
        sink.append_match(&MatchResult::new(
            "buy shoes",
            Domain::parse("https://a.test/shop"),
            vec!["stripe".into()],
        ))
        .unwrap();
        sink.append_keyword_header("buy boots").unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            contents,
            "=== Keyword: 'buy shoes' ===\n\
             URL: https://a.test\n\
             Payment Providers Found: stripe\n\n\
             === Keyword: 'buy boots' ===\n"
        );
    }

    #[test]
    fn reopening_appends_instead_of_truncating() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.txt");

        FileSink::create(&path)
            .unwrap()
            .append_keyword_header("first")
            .unwrap();
        FileSink::create(&path)
            .unwrap()
            .append_keyword_header("second")
            .unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("'first'"));
        assert!(contents.contains("'second'"));
    }

    #[test]
    fn unwritable_path_is_a_sink_error() {
        let err = FileSink::create(Path::new("/nonexistent-dir/results.txt")).unwrap_err();
        assert!(matches!(err, AppError::Sink(_)));
    }
}
