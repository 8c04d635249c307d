use std::future::Future;
use std::pin::Pin;

use chrono::{DateTime, Utc};

use crate::TransferError;

/// Future returned by [`ByteSource::slice`].
pub type SliceFuture<'a> = Pin<Box<dyn Future<Output = Result<Vec<u8>, TransferError>> + Send + 'a>>;

/// Descriptive attributes of a source, used for fingerprinting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceInfo {
    /// Total size in bytes. Fixed for the lifetime of an upload.
    pub size: u64,
    /// File name, when the source has one.
    pub name: Option<String>,
    /// Last modification time, when known.
    pub last_modified: Option<DateTime<Utc>>,
}

impl SourceInfo {
    pub fn new(size: u64) -> Self {
        Self {
            size,
            name: None,
            last_modified: None,
        }
    }
}

/// A sized input that can be read in contiguous slices.
///
/// Implementations must return exactly `end - start` bytes or an error.
pub trait ByteSource: Send + Sync {
    /// Returns the source descriptor.
    fn info(&self) -> &SourceInfo;

    /// Reads bytes in `[start, end)`.
    fn slice(&self, start: u64, end: u64) -> SliceFuture<'_>;

    /// Total size in bytes.
    fn size(&self) -> u64 {
        self.info().size
    }
}

/// Rejects ranges that are inverted, extend past `size`, or do not fit
/// in memory on this target. Returns the range as `usize` bounds.
pub(crate) fn check_range(
    start: u64,
    end: u64,
    size: u64,
) -> Result<(usize, usize), TransferError> {
    let out_of_range = || TransferError::OutOfRange { start, end, size };
    if start > end || end > size {
        return Err(out_of_range());
    }
    let lo = usize::try_from(start).map_err(|_| out_of_range())?;
    let hi = usize::try_from(end).map_err(|_| out_of_range())?;
    Ok((lo, hi))
}
