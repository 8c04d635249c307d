/// Upper bound on the number of bytes sent in one PATCH.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChunkSize {
    /// Send everything that remains in a single request.
    #[default]
    Unbounded,
    /// At most this many bytes per request. Must be positive.
    Bounded(u64),
}

impl ChunkSize {
    /// Returns `false` for a zero bound, which would never make progress.
    pub fn is_valid(&self) -> bool {
        !matches!(self, ChunkSize::Bounded(0))
    }
}

impl From<Option<u64>> for ChunkSize {
    fn from(v: Option<u64>) -> Self {
        v.map_or(ChunkSize::Unbounded, ChunkSize::Bounded)
    }
}

/// Returns the exclusive end of the next chunk starting at `offset`.
///
/// The result never exceeds `length`. At or past `length` it returns
/// `length`, i.e. an empty chunk.
pub fn next_chunk_end(offset: u64, length: u64, chunk_size: ChunkSize) -> u64 {
    if offset >= length {
        return length;
    }
    match chunk_size {
        ChunkSize::Unbounded => length,
        ChunkSize::Bounded(n) => offset.saturating_add(n).min(length),
    }
}
