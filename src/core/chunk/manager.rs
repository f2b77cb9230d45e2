// Chunk manager
//
// Responsibility: lazily load fixed-size chunks through a loader and keep
//                 the resident set under a memory budget (LRU eviction)

use bytes::Bytes;
use tracing::{debug, trace, warn};

use crate::config::{BufferConfig, DEFAULT_CHUNK_SIZE, DEFAULT_MEMORY_LIMIT};
use crate::core::chunk::lru::LruList;
use crate::core::chunk::{ChunkId, ChunkLoader, ChunkView, MemoryChunkLoader};
use crate::error::{Error, Result};

/// A cached chunk slot; `None` means unloaded or evicted.
#[derive(Debug, Clone, Default)]
struct Chunk {
    data: Option<Bytes>,
}

impl Chunk {
    fn is_empty(&self) -> bool {
        self.data.is_none()
    }

    fn release(&mut self) -> usize {
        self.data.take().map_or(0, |data| data.len())
    }
}

/// LRU-bounded chunk cache over a [`ChunkLoader`].
///
/// Not safe for concurrent mutation; wrap it in a mutex or give each worker
/// its own manager. Slices handed out share the chunk buffer and stay valid
/// after the chunk is evicted.
pub struct ChunkManager {
    loader: Box<dyn ChunkLoader>,
    chunks: Vec<Chunk>,
    lru: LruList,
    chunk_size: u32,
    memory_limit: u64,
    memory_usage: u64,
}

impl ChunkManager {
    pub fn new(
        loader: Box<dyn ChunkLoader>,
        chunk_size: u32,
        memory_limit: u64,
    ) -> Result<Self> {
        BufferConfig {
            chunk_size,
            memory_limit,
            ..BufferConfig::default()
        }
        .validate()?;

        let size = loader.size();
        let slots = usize::try_from(size.div_ceil(u64::from(chunk_size))).map_err(|_| {
            Error::InvalidConfig {
                detail: format!("source of {} bytes needs too many chunks", size),
            }
        })?;
        if slots > ChunkId::MAX as usize {
            return Err(Error::InvalidConfig {
                detail: format!("{} chunks exceed the chunk id range", slots),
            });
        }

        debug!(size, chunk_size, memory_limit, slots, "chunk manager created");

        Ok(Self {
            loader,
            chunks: vec![Chunk::default(); slots],
            lru: LruList::new(slots),
            chunk_size,
            memory_limit,
            memory_usage: 0,
        })
    }

    /// Manager over an empty source; it has no slots and never loads.
    pub fn empty() -> Self {
        Self {
            loader: Box::new(MemoryChunkLoader::new(Bytes::new())),
            chunks: Vec::new(),
            lru: LruList::new(0),
            chunk_size: DEFAULT_CHUNK_SIZE,
            memory_limit: DEFAULT_MEMORY_LIMIT,
            memory_usage: 0,
        }
    }

    pub fn with_config(loader: Box<dyn ChunkLoader>, config: &BufferConfig) -> Result<Self> {
        config.validate()?;
        Self::new(loader, config.chunk_size, config.memory_limit)
    }

    /// Total bytes in the backing source.
    pub fn size(&self) -> u64 {
        self.loader.size()
    }

    pub fn chunk_size(&self) -> u32 {
        self.chunk_size
    }

    pub fn memory_limit(&self) -> u64 {
        self.memory_limit
    }

    /// Bytes currently held by resident chunks.
    pub fn memory_usage(&self) -> u64 {
        self.memory_usage
    }

    /// Number of chunk slots, resident or not.
    pub fn slot_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn resident_count(&self) -> usize {
        self.lru.len()
    }

    pub fn is_resident(&self, id: ChunkId) -> bool {
        self.chunks.get(id as usize).is_some_and(|c| !c.is_empty())
    }

    /// Resident chunk ids, most recently used first.
    pub fn lru_order(&self) -> Vec<ChunkId> {
        self.lru.iter().collect()
    }

    /// Bytes addressed by `view`, loading its chunk on first access.
    ///
    /// # Panics
    ///
    /// If the chunk id is out of range or the view runs past the chunk.
    pub fn get_chunk(&mut self, view: ChunkView) -> Result<Bytes> {
        assert!(
            (view.id as usize) < self.chunks.len(),
            "chunk id {} out of range ({} chunks)",
            view.id,
            self.chunks.len()
        );

        let data = self.touch_chunk(view.id)?;
        assert!(
            view.end() as usize <= data.len(),
            "view {:?} exceeds chunk of {} bytes",
            view,
            data.len()
        );

        Ok(data.slice(view.offset as usize..view.end() as usize))
    }

    /// [`get_chunk`](Self::get_chunk) over each view in order, stopping at
    /// the first failure.
    pub fn get_chunks(&mut self, views: &[ChunkView]) -> Result<Vec<Bytes>> {
        views.iter().map(|view| self.get_chunk(*view)).collect()
    }

    /// Make `id` resident and most recently used, evicting from the LRU
    /// tail while over budget.
    fn touch_chunk(&mut self, id: ChunkId) -> Result<Bytes> {
        if let Some(data) = &self.chunks[id as usize].data {
            trace!(id, "chunk hit");
            let data = data.clone();
            self.lru.move_to_front(id);
            return Ok(data);
        }

        let offset = u64::from(id) * u64::from(self.chunk_size);
        let length = u64::from(self.chunk_size).min(self.size() - offset) as u32;

        let data = self.loader.read_chunk(offset, length)?;
        if data.len() != length as usize {
            warn!(id, offset, length, actual = data.len(), "loader returned short chunk");
            return Err(Error::ShortRead {
                offset,
                expected: length,
                actual: data.len(),
            });
        }

        debug!(id, offset, length, "chunk loaded");
        self.chunks[id as usize].data = Some(data.clone());
        self.lru.push_front(id);
        self.memory_usage += u64::from(length);

        self.evict_over_budget(id);
        Ok(data)
    }

    fn evict_over_budget(&mut self, keep: ChunkId) {
        while self.memory_usage > self.memory_limit {
            let Some(victim) = self.lru.back() else {
                break;
            };
            if victim == keep {
                break;
            }

            self.lru.remove(victim);
            let freed = self.chunks[victim as usize].release();
            self.memory_usage -= freed as u64;
            debug!(id = victim, freed, usage = self.memory_usage, "chunk evicted");
        }
    }
}

impl std::fmt::Debug for ChunkManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkManager")
            .field("size", &self.size())
            .field("chunk_size", &self.chunk_size)
            .field("slots", &self.chunks.len())
            .field("resident", &self.lru.len())
            .field("memory_usage", &self.memory_usage)
            .field("memory_limit", &self.memory_limit)
            .finish()
    }
}
