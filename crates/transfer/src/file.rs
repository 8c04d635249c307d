use std::io::SeekFrom;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tracing::debug;

use crate::TransferError;
use crate::source::{ByteSource, SliceFuture, SourceInfo, check_range};

/// A file on disk.
///
/// Size, name and modification time are captured when the source is
/// opened. Each slice opens the file, seeks and reads, so no handle or
/// buffer outlives a single chunk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    info: SourceInfo,
}

impl FileSource {
    /// Opens `path` and records its descriptor.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, TransferError> {
        let path = path.as_ref().to_path_buf();
        let meta = tokio::fs::metadata(&path).await?;
        if !meta.is_file() {
            return Err(TransferError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("not a regular file: {}", path.display()),
            )));
        }

        let info = SourceInfo {
            size: meta.len(),
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned()),
            last_modified: meta.modified().ok().map(DateTime::<Utc>::from),
        };
        debug!(path = %path.display(), size = info.size, "opened file source");

        Ok(Self { path, info })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ByteSource for FileSource {
    fn info(&self) -> &SourceInfo {
        &self.info
    }

    fn slice(&self, start: u64, end: u64) -> SliceFuture<'_> {
        Box::pin(async move {
            let (lo, hi) = check_range(start, end, self.info.size)?;
            let mut file = tokio::fs::File::open(&self.path).await?;
            file.seek(SeekFrom::Start(start)).await?;
            let mut buf = vec![0u8; hi - lo];
            file.read_exact(&mut buf).await?;
            Ok(buf)
        })
    }
}
