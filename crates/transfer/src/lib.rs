//! Byte sources and chunk planning for resumable uploads.
//!
//! A [`ByteSource`] describes a sized input and hands out contiguous
//! slices of it on demand. The upload controller only ever holds one
//! slice at a time.

mod chunk;
mod file;
mod memory;
mod source;

pub use chunk::{ChunkSize, next_chunk_end};
pub use file::FileSource;
pub use memory::MemorySource;
pub use source::{ByteSource, SliceFuture, SourceInfo};

/// Errors produced by byte sources.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("slice {start}..{end} out of range for source of {size} bytes")]
    OutOfRange { start: u64, end: u64, size: u64 },
}
