//! Streaming log file reader.

use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};

use crate::error::{EngineError, EngineResult};
use crate::parser;
use crate::types::{LogEntry, MAX_RECORDED_FAILURES, ParsingStats};

/// Hard cap on accepted input size, checked before any line is read.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Pull-based reader that parses one line at a time, bounding peak memory
/// to O(longest line) regardless of file size.
///
/// Single forward pass; callers needing two passes re-open. Size and
/// existence checks run before streaming begins so oversized or missing
/// inputs are rejected without reading a byte.
#[derive(Debug)]
pub struct LogReader {
    lines: Lines<BufReader<File>>,
    strict: bool,
    poisoned: bool,
    line_number: usize,
    parsed_count: u64,
    error_count: u64,
    errors: Vec<String>,
}

impl LogReader {
    /// Open with the default 100 MB size cap.
    pub async fn open(path: impl AsRef<Path>, strict: bool) -> EngineResult<Self> {
        Self::open_with_limit(path, strict, DEFAULT_MAX_FILE_SIZE).await
    }

    pub async fn open_with_limit(
        path: impl AsRef<Path>,
        strict: bool,
        max_bytes: u64,
    ) -> EngineResult<Self> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| io_error(path, e))?;
        if metadata.is_dir() {
            return Err(EngineError::Io(format!(
                "{}: is a directory",
                path.display()
            )));
        }
        if metadata.len() > max_bytes {
            return Err(EngineError::FileTooLarge {
                path: path.display().to_string(),
                size_bytes: metadata.len(),
                max_bytes,
            });
        }
        let file = File::open(path).await.map_err(|e| io_error(path, e))?;
        tracing::debug!(
            path = %path.display(),
            size_bytes = metadata.len(),
            strict,
            "opened log file"
        );
        Ok(Self {
            lines: BufReader::new(file).lines(),
            strict,
            poisoned: false,
            line_number: 0,
            parsed_count: 0,
            error_count: 0,
            errors: Vec::new(),
        })
    }

    /// Next parsed entry, or `None` at end of file.
    ///
    /// Blank lines and `#` comments are skipped without counting as
    /// records. Lenient mode records failures and keeps going; strict mode
    /// returns the first failure as [`EngineError::Parse`] and poisons the
    /// reader: every later call yields `Ok(None)`, never a mid-file resume.
    pub async fn next_entry(&mut self) -> EngineResult<Option<LogEntry>> {
        if self.poisoned {
            return Ok(None);
        }
        loop {
            let line = self
                .lines
                .next_line()
                .await
                .map_err(|e| EngineError::Io(e.to_string()))?;
            let Some(line) = line else {
                return Ok(None);
            };
            self.line_number += 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            match parser::parse_line(trimmed, self.line_number) {
                Ok(entry) => {
                    self.parsed_count += 1;
                    return Ok(Some(entry));
                }
                Err(failure) => {
                    self.error_count += 1;
                    if self.errors.len() < MAX_RECORDED_FAILURES {
                        self.errors
                            .push(format!("Line {}: {}", failure.line_number, failure));
                    }
                    if self.strict {
                        self.poisoned = true;
                        return Err(EngineError::Parse(failure));
                    }
                    tracing::debug!(
                        line = failure.line_number,
                        reason = failure.reason.as_str(),
                        "skipping unparseable line"
                    );
                }
            }
        }
    }

    /// Stats snapshot; the end-of-stream numbers once `next_entry` has
    /// returned `None`.
    pub fn stats(&self) -> ParsingStats {
        ParsingStats::new(self.parsed_count, self.error_count, self.errors.clone())
    }
}

fn io_error(path: &Path, e: std::io::Error) -> EngineError {
    if e.kind() == std::io::ErrorKind::NotFound {
        EngineError::NotFound(path.display().to_string())
    } else {
        EngineError::Io(format!("{}: {e}", path.display()))
    }
}
