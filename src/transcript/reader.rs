use std::path::{Path, PathBuf};
use std::string::FromUtf8Error;

use compio::fs;
use snafu::{ResultExt, Snafu};
use tracing::debug;

use crate::ext::BestEffortPathExt;

/// Reads the whole transcript file into memory.
pub async fn read_transcript(path: &Path) -> Result<String, TranscriptReadError> {
    debug!("Reading transcript: {}", path.best_effort_path_display());
    let bytes = fs::read(path).await.context(ReadSnafu {
        path: path.to_path_buf(),
    })?;
    debug!("Successfully read transcript: {} bytes", bytes.len());

    String::from_utf8(bytes).context(Utf8Snafu {
        path: path.to_path_buf(),
    })
}

#[derive(Debug, Snafu)]
pub enum TranscriptReadError {
    #[snafu(display("Failed to read the transcript: {}", path.best_effort_path_display()))]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Transcript {} is not valid UTF-8", path.best_effort_path_display()))]
    Utf8Error {
        path: PathBuf,
        source: FromUtf8Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[compio::test]
    async fn reads_transcript_contents() {
        let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
        write!(temp_file, "$ cd /\n$ ls\n").expect("Failed to write to temp file");

        let contents = read_transcript(temp_file.path()).await.unwrap();

        assert_eq!(contents.lines().collect::<Vec<_>>(), vec!["$ cd /", "$ ls"]);
    }

    #[compio::test]
    async fn returns_read_error_on_nonexistent_file() {
        let path = Path::new("/this/path/does/not/exist.txt");

        let result = read_transcript(path).await;

        match result {
            Err(TranscriptReadError::ReadError { path: err_path, .. }) => {
                assert_eq!(err_path, path)
            }
            other => panic!("Expected ReadError, got {other:?}"),
        }
    }

    #[compio::test]
    async fn returns_utf8_error_on_binary_file() {
        let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
        temp_file
            .write_all(&[0xff, 0xfe, 0x00, 0x80])
            .expect("Failed to write to temp file");

        let result = read_transcript(temp_file.path()).await;

        assert!(matches!(result, Err(TranscriptReadError::Utf8Error { .. })));
    }

    #[test]
    fn read_error_display_names_the_path() {
        let error = TranscriptReadError::ReadError {
            path: PathBuf::from("/this/path/does/not/exist.txt"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
        };

        let message = error.to_string();

        assert!(message.contains("Failed to read the transcript"));
        assert!(message.contains("/this/path/does/not/exist.txt"));
    }
}
