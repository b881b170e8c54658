//! Streaming write of a downloaded artifact.
//!
//! Chunks are written as they arrive. The write is not atomic: a failure
//! part way leaves a truncated file behind, which the next run overwrites.

use std::path::Path;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::ResolveError;

/// Log progress every this many bytes.
const PROGRESS_INTERVAL: u64 = 16 * 1024 * 1024;

/// Create the parent directory of `dest` if needed.
pub async fn prepare_destination(dest: &Path) -> Result<(), ResolveError> {
    if let Some(parent) = dest.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ResolveError::io(parent, e))?;
        }
    }
    Ok(())
}

/// Write every chunk of `stream` to `dest`, truncating any existing file.
///
/// Returns the number of bytes written.
pub async fn stream_to_file<S, E>(stream: S, dest: &Path) -> Result<u64, ResolveError>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: std::fmt::Display,
{
    futures::pin_mut!(stream);
    prepare_destination(dest).await?;
    let mut file = File::create(dest)
        .await
        .map_err(|e| ResolveError::io(dest, e))?;

    let mut written = 0u64;
    let mut next_report = PROGRESS_INTERVAL;
    while let Some(chunk) = stream.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(e) => {
                // Keep what already arrived on disk
                file.flush().await.ok();
                return Err(ResolveError::Archive {
                    path: dest.display().to_string(),
                    message: format!("Error reading response chunk: {}", e),
                });
            }
        };
        file.write_all(&chunk)
            .await
            .map_err(|e| ResolveError::io(dest, e))?;

        written += chunk.len() as u64;
        if written >= next_report {
            debug!(path = %dest.display(), bytes = written, "Download progress");
            next_report += PROGRESS_INTERVAL;
        }
    }

    file.flush().await.map_err(|e| ResolveError::io(dest, e))?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    #[tokio::test]
    async fn test_chunks_are_concatenated() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("nested/out.grib2");
        let chunks: Vec<Result<Bytes, String>> =
            vec![Ok(Bytes::from_static(b"GRIB")), Ok(Bytes::from_static(b"7777"))];

        let written = stream_to_file(stream::iter(chunks), &dest).await.unwrap();

        assert_eq!(written, 8);
        assert_eq!(std::fs::read(&dest).unwrap(), b"GRIB7777");
    }

    #[tokio::test]
    async fn test_failed_chunk_leaves_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.grib2");
        let chunks: Vec<Result<Bytes, String>> = vec![
            Ok(Bytes::from_static(b"GRIB")),
            Err("connection reset".to_string()),
        ];

        let err = stream_to_file(stream::iter(chunks), &dest)
            .await
            .unwrap_err();

        assert!(matches!(err, ResolveError::Archive { .. }));
        assert_eq!(std::fs::read(&dest).unwrap(), b"GRIB");
    }
}
