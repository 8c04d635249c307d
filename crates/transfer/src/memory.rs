use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::source::{ByteSource, SliceFuture, SourceInfo, check_range};

/// An in-memory buffer source.
#[derive(Debug, Clone)]
pub struct MemorySource {
    data: Arc<[u8]>,
    info: SourceInfo,
}

impl MemorySource {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        let data: Arc<[u8]> = data.into().into();
        let info = SourceInfo::new(data.len() as u64);
        Self { data, info }
    }

    /// Attaches a name (used by the default fingerprint).
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.info.name = Some(name.into());
        self
    }

    pub fn with_last_modified(mut self, at: DateTime<Utc>) -> Self {
        self.info.last_modified = Some(at);
        self
    }
}

impl ByteSource for MemorySource {
    fn info(&self) -> &SourceInfo {
        &self.info
    }

    fn slice(&self, start: u64, end: u64) -> SliceFuture<'_> {
        Box::pin(async move {
            let (lo, hi) = check_range(start, end, self.info.size)?;
            Ok(self.data[lo..hi].to_vec())
        })
    }
}
