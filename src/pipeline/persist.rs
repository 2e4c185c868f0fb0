//! Persistence: write each extracted record to its own JSON file.
//!
//! Files are named after the moment the request finished processing,
//! `warranty_<YYYYMMDD_HHMMSS>.json`, and are never overwritten: the file is
//! opened with create-new semantics and, if two requests land in the same
//! second, the later one gets a `_2`, `_3`, … suffix.

use crate::error::ExtractError;
use crate::record::WarrantyRecord;
use chrono::{DateTime, Local};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

/// Upper bound on same-second suffixes before giving up.
const MAX_SUFFIX: u32 = 1000;

/// Create the output directory if it does not exist.
pub async fn ensure_output_dir(dir: &Path) -> Result<(), ExtractError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| ExtractError::OutputWriteFailed {
            path: dir.to_path_buf(),
            source: e,
        })
}

/// Base filename for a record persisted at `at`.
pub fn record_file_name(at: &DateTime<Local>) -> String {
    format!("warranty_{}.json", at.format("%Y%m%d_%H%M%S"))
}

/// Write `record` as 2-space indented JSON under `dir`, timestamped now.
pub async fn persist_record(dir: &Path, record: &WarrantyRecord) -> Result<PathBuf, ExtractError> {
    persist_record_at(dir, record, &Local::now()).await
}

/// Write `record` under `dir` using the given timestamp.
pub async fn persist_record_at(
    dir: &Path,
    record: &WarrantyRecord,
    at: &DateTime<Local>,
) -> Result<PathBuf, ExtractError> {
    let json = serde_json::to_string_pretty(record)
        .map_err(|e| ExtractError::Internal(format!("Failed to serialise record: {e}")))?;

    ensure_output_dir(dir).await?;

    let base = record_file_name(at);
    let stem = base.trim_end_matches(".json");

    for n in 1..=MAX_SUFFIX {
        let path = if n == 1 {
            dir.join(&base)
        } else {
            dir.join(format!("{stem}_{n}.json"))
        };

        let file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                debug!("{} already exists, trying next suffix", path.display());
                continue;
            }
            Err(e) => return Err(ExtractError::OutputWriteFailed { path, source: e }),
        };

        write_or_discard(file, &path, json.as_bytes()).await?;
        info!("Saved warranty record to {}", path.display());
        return Ok(path);
    }

    Err(ExtractError::Internal(format!(
        "No free output filename for {} after {} attempts",
        base, MAX_SUFFIX
    )))
}

/// Write `bytes` plus a trailing newline to a freshly created `path`.
///
/// On failure the file is removed so no truncated record is left behind.
async fn write_or_discard<W>(mut writer: W, path: &Path, bytes: &[u8]) -> Result<(), ExtractError>
where
    W: AsyncWrite + Unpin,
{
    let written = async {
        writer.write_all(bytes).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await
    }
    .await;
    drop(writer);

    if let Err(source) = written {
        if let Err(e) = tokio::fs::remove_file(path).await {
            warn!("Could not remove partial file {}: {}", path.display(), e);
        }
        return Err(ExtractError::OutputWriteFailed {
            path: path.to_path_buf(),
            source,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).single().unwrap()
    }

    #[test]
    fn file_name_format() {
        assert_eq!(record_file_name(&fixed_time()), "warranty_20240309_140507.json");
    }

    #[tokio::test]
    async fn writes_indented_json() {
        let dir = tempfile::tempdir().unwrap();
        let record = WarrantyRecord {
            product: Some("Toaster".into()),
            ..Default::default()
        };

        let path = persist_record_at(dir.path(), &record, &fixed_time()).await.unwrap();
        assert_eq!(path, dir.path().join("warranty_20240309_140507.json"));

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("{\n  \"name\": null,\n  \"product\": \"Toaster\""), "got: {text}");
        let back: WarrantyRecord = serde_json::from_str(&text).unwrap();
        assert_eq!(back, record);
    }

    #[tokio::test]
    async fn same_second_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let first = WarrantyRecord {
            name: Some("first".into()),
            ..Default::default()
        };
        let second = WarrantyRecord {
            name: Some("second".into()),
            ..Default::default()
        };

        let p1 = persist_record_at(dir.path(), &first, &fixed_time()).await.unwrap();
        let p2 = persist_record_at(dir.path(), &second, &fixed_time()).await.unwrap();

        assert_ne!(p1, p2);
        assert!(p2.ends_with("warranty_20240309_140507_2.json"));
        assert!(std::fs::read_to_string(&p1).unwrap().contains("first"));
        assert!(std::fs::read_to_string(&p2).unwrap().contains("second"));
    }

    #[tokio::test]
    async fn creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b/outputs");
        let path = persist_record(&nested, &WarrantyRecord::default()).await.unwrap();
        assert!(path.starts_with(&nested));
        assert!(path.exists());
    }

    struct FailingWriter;

    impl AsyncWrite for FailingWriter {
        fn poll_write(
            self: std::pin::Pin<&mut Self>,
            _: &mut std::task::Context<'_>,
            _: &[u8],
        ) -> std::task::Poll<std::io::Result<usize>> {
            std::task::Poll::Ready(Err(std::io::Error::other("disk full")))
        }

        fn poll_flush(
            self: std::pin::Pin<&mut Self>,
            _: &mut std::task::Context<'_>,
        ) -> std::task::Poll<std::io::Result<()>> {
            std::task::Poll::Ready(Ok(()))
        }

        fn poll_shutdown(
            self: std::pin::Pin<&mut Self>,
            _: &mut std::task::Context<'_>,
        ) -> std::task::Poll<std::io::Result<()>> {
            std::task::Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn failed_write_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("warranty_20240309_140507.json");
        std::fs::write(&path, "{").unwrap();

        let err = write_or_discard(FailingWriter, &path, b"{}").await.unwrap_err();

        assert!(matches!(err, ExtractError::OutputWriteFailed { .. }), "got: {err:?}");
        assert!(!path.exists());
    }
}
