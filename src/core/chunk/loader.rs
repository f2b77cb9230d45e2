// Chunk loaders
//
// Responsibility: read arbitrary byte ranges from a source of known size

use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::path::Path;

use bytes::Bytes;
use tracing::{debug, warn};

use crate::config::SourceKind;
use crate::core::chunk::MmapChunkLoader;
use crate::error::{Error, Result};

/// Random-access byte source.
///
/// A short read is an error, never a partial result.
pub trait ChunkLoader {
    /// Total bytes in the source.
    fn size(&self) -> u64;

    /// Read exactly `length` bytes starting at `offset`.
    fn read_chunk(&mut self, offset: u64, length: u32) -> Result<Bytes>;
}

impl<L: ChunkLoader + ?Sized> ChunkLoader for Box<L> {
    fn size(&self) -> u64 {
        (**self).size()
    }

    fn read_chunk(&mut self, offset: u64, length: u32) -> Result<Bytes> {
        (**self).read_chunk(offset, length)
    }
}

/// Loader over bytes already in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryChunkLoader {
    data: Bytes,
}

impl MemoryChunkLoader {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { data: data.into() }
    }
}

impl ChunkLoader for MemoryChunkLoader {
    fn size(&self) -> u64 {
        self.data.len() as u64
    }

    fn read_chunk(&mut self, offset: u64, length: u32) -> Result<Bytes> {
        let end = offset + u64::from(length);
        if end > self.size() {
            return Err(Error::UnexpectedEof { offset, length });
        }
        Ok(self.data.slice(offset as usize..end as usize))
    }
}

/// Loader that seeks and reads an open file for every chunk.
#[derive(Debug)]
pub struct FileChunkLoader {
    file: File,
    size: u64,
}

impl FileChunkLoader {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_file(file)
    }

    pub fn from_file(file: File) -> Result<Self> {
        let size = file.metadata()?.len();
        Ok(Self { file, size })
    }
}

impl ChunkLoader for FileChunkLoader {
    fn size(&self) -> u64 {
        self.size
    }

    fn read_chunk(&mut self, offset: u64, length: u32) -> Result<Bytes> {
        self.file.seek(SeekFrom::Start(offset))?;

        let mut data = vec![0u8; length as usize];
        match self.file.read_exact(&mut data) {
            Ok(()) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                warn!(offset, length, "unexpected EOF reading chunk");
                Err(Error::UnexpectedEof { offset, length })
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Open `path` as a boxed loader of the requested kind.
pub fn open_source(path: impl AsRef<Path>, kind: SourceKind) -> Result<Box<dyn ChunkLoader>> {
    let path = path.as_ref();
    debug!(path = %path.display(), ?kind, "opening source");

    Ok(match kind {
        SourceKind::Buffered => Box::new(FileChunkLoader::open(path)?),
        SourceKind::MemoryMapped => Box::new(MmapChunkLoader::open(path)?),
    })
}
