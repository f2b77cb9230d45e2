// Buffer configuration
//
// Responsibility: chunk geometry and memory budget for documents,
//                 chosen adaptively from the size of the backing source

use crate::error::{Error, Result};

/// Sources below this size are read with plain buffered I/O.
pub const SMALL_SOURCE_THRESHOLD: u64 = 10 * 1024 * 1024; // 10MB
/// Sources above this size get the "huge" geometry.
pub const LARGE_SOURCE_THRESHOLD: u64 = 100 * 1024 * 1024; // 100MB

pub const DEFAULT_CHUNK_SIZE: u32 = 64 * 1024; // 64KB
pub const DEFAULT_MEMORY_LIMIT: u64 = 64 * 1024 * 1024; // 64MB
pub const DEFAULT_EDIT_BLOCK_SIZE: usize = 64 * 1024;

/// How the original content is pulled off disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// seek + read for every chunk
    Buffered,
    /// chunks are copied out of a read-only memory map
    MemoryMapped,
}

impl SourceKind {
    pub fn for_source_size(size: u64) -> Self {
        if size < SMALL_SOURCE_THRESHOLD {
            SourceKind::Buffered
        } else {
            SourceKind::MemoryMapped
        }
    }
}

/// Chunk cache and edit buffer settings for one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferConfig {
    /// Bytes per cached chunk of original content.
    pub chunk_size: u32,
    /// Upper bound on resident chunk bytes.
    pub memory_limit: u64,
    /// Bytes per block of the append-only edit buffer.
    pub edit_block_size: usize,
}

impl BufferConfig {
    pub fn new(chunk_size: u32, memory_limit: u64, edit_block_size: usize) -> Result<Self> {
        let config = Self {
            chunk_size,
            memory_limit,
            edit_block_size,
        };
        config.validate()?;
        Ok(config)
    }

    /// Pick a geometry for a source of `size` bytes.
    ///
    /// Small sources keep the defaults; larger ones trade a bigger budget
    /// for fewer, larger reads.
    pub fn for_source_size(size: u64) -> Self {
        if size < SMALL_SOURCE_THRESHOLD {
            Self::default()
        } else if size < LARGE_SOURCE_THRESHOLD {
            Self {
                chunk_size: 256 * 1024,
                memory_limit: 128 * 1024 * 1024,
                edit_block_size: DEFAULT_EDIT_BLOCK_SIZE,
            }
        } else {
            Self {
                chunk_size: 1024 * 1024,
                memory_limit: 256 * 1024 * 1024,
                edit_block_size: 256 * 1024,
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(invalid("chunk size must be non-zero"));
        }
        if self.chunk_size >= u32::MAX / 2 {
            return Err(invalid(format!("chunk size {} is too large", self.chunk_size)));
        }
        if self.edit_block_size == 0 {
            return Err(invalid("edit block size must be non-zero"));
        }
        // the chunk being loaded is never evicted, so it alone must fit
        if self.memory_limit < u64::from(self.chunk_size) {
            return Err(invalid(format!(
                "memory limit {} is smaller than one chunk ({})",
                self.memory_limit, self.chunk_size
            )));
        }
        Ok(())
    }

    /// Number of chunks that may be resident at once.
    pub fn max_resident_chunks(&self) -> u64 {
        self.memory_limit / u64::from(self.chunk_size)
    }
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            memory_limit: DEFAULT_MEMORY_LIMIT,
            edit_block_size: DEFAULT_EDIT_BLOCK_SIZE,
        }
    }
}

fn invalid(detail: impl Into<String>) -> Error {
    Error::InvalidConfig {
        detail: detail.into(),
    }
}
