// Chunk cache - bounded random access over a byte source
//
// Responsibility: split byte ranges into fixed-size chunk views, load
//                 chunks through a loader and keep resident memory under
//                 an LRU budget

mod loader;
mod lru;
mod manager;
mod mmap;

pub use self::loader::{open_source, ChunkLoader, FileChunkLoader, MemoryChunkLoader};
pub use self::manager::ChunkManager;
pub use self::mmap::MmapChunkLoader;

/// Index of a chunk inside its source.
pub type ChunkId = u32;

/// A sub-range of one chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChunkView {
    pub id: ChunkId,
    /// start inside the chunk
    pub offset: u32,
    pub length: u32,
}

impl ChunkView {
    pub fn new(id: ChunkId, offset: u32, length: u32) -> Self {
        Self { id, offset, length }
    }

    /// Split into two adjacent views covering the same bytes.
    ///
    /// # Panics
    ///
    /// If `pivot` is not strictly inside `(0, length)`.
    pub fn split_at(&self, pivot: u32) -> (ChunkView, ChunkView) {
        assert!(
            pivot > 0 && pivot < self.length,
            "split pivot {} outside (0, {})",
            pivot,
            self.length
        );
        (
            ChunkView::new(self.id, self.offset, pivot),
            ChunkView::new(self.id, self.offset + pivot, self.length - pivot),
        )
    }

    /// One past the last intra-chunk byte.
    pub fn end(&self) -> u32 {
        self.offset + self.length
    }
}

/// Decompose `offset..offset + length` into per-chunk views.
///
/// Views come back ordered by id, contiguous, each with a non-zero length,
/// and their lengths sum to `length`.
pub fn calculate_chunk_views(offset: u64, length: u64, chunk_size: u32) -> Vec<ChunkView> {
    assert!(chunk_size > 0, "chunk size must be non-zero");
    assert!(chunk_size < u32::MAX / 2, "chunk size {} too large", chunk_size);
    if length == 0 {
        return Vec::new();
    }

    let chunk_size = u64::from(chunk_size);
    let start_id = offset / chunk_size;
    let end_id = (offset + length).div_ceil(chunk_size);
    assert!(end_id < u64::from(ChunkId::MAX), "chunk id overflow");

    let mut views = Vec::with_capacity(end_id.saturating_sub(start_id) as usize);
    let mut offset = offset;
    let mut length = length;

    for id in start_id..end_id {
        let chunk_offset = offset % chunk_size;
        let chunk_length = (chunk_size - chunk_offset).min(length);
        offset += chunk_length;
        length -= chunk_length;
        views.push(ChunkView::new(id as ChunkId, chunk_offset as u32, chunk_length as u32));
    }

    debug_assert_eq!(length, 0);
    views
}
