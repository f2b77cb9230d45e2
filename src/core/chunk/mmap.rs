// Memory-mapped loader
//
// Responsibility: serve chunk reads for large files from a read-only
//                 memory map instead of seek + read

use std::fs::File;
use std::ops::Range;
use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use memmap2::Mmap;

use crate::core::chunk::ChunkLoader;
use crate::error::{Error, Result};

/// Loader backed by a memory map (large file support).
#[derive(Debug, Clone)]
pub struct MmapChunkLoader {
    mmap: Option<Arc<Mmap>>,
    length: u64,
}

impl MmapChunkLoader {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let length = file.metadata()?.len();

        if length == 0 {
            return Ok(Self::empty());
        }

        // SAFETY: the map is read-only; the file is not expected to be
        // truncated by another process while it is open.
        let mmap = unsafe { Mmap::map(&file)? };

        Ok(Self {
            mmap: Some(Arc::new(mmap)),
            length,
        })
    }

    pub fn empty() -> Self {
        Self {
            mmap: None,
            length: 0,
        }
    }

    /// Borrow a byte range of the mapping, `None` if it runs past the end.
    pub fn get_bytes(&self, range: Range<u64>) -> Option<&[u8]> {
        if range.start > range.end || range.end > self.length {
            return None;
        }
        match &self.mmap {
            Some(mmap) => mmap.get(range.start as usize..range.end as usize),
            None => Some(&[][..]),
        }
    }
}

impl ChunkLoader for MmapChunkLoader {
    fn size(&self) -> u64 {
        self.length
    }

    fn read_chunk(&mut self, offset: u64, length: u32) -> Result<Bytes> {
        let end = offset + u64::from(length);
        self.get_bytes(offset..end)
            .map(Bytes::copy_from_slice)
            .ok_or(Error::UnexpectedEof { offset, length })
    }
}
