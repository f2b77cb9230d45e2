// Piece Table core
//
// Responsibility: hold the document as pieces referencing original or
//                 appended bytes, indexed by start offset in a persistent
//                 tree so edits are cheap and versions are O(1) to keep

use std::ops::Range;
use std::path::Path;

use bytes::Bytes;
use tracing::{debug, info, trace};

use crate::config::{BufferConfig, SourceKind};
use crate::core::buffer::chunk_iter::ChunkIter;
use crate::core::buffer::edit_buffer::EditBuffer;
use crate::core::chunk::{calculate_chunk_views, open_source, ChunkLoader, ChunkManager, MemoryChunkLoader};
use crate::core::rbtree::RBTree;
use crate::error::Result;

/// Where a piece's bytes live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PieceSource {
    /// The original source; `offset` is absolute in the source.
    Original,
    /// An edit buffer block; `offset` is relative to the block.
    Added { block: u32 },
}

/// A span of document bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    pub source: PieceSource,
    pub offset: u64,
    pub length: u64,
}

impl Piece {
    pub fn new(source: PieceSource, offset: u64, length: u64) -> Self {
        Self {
            source,
            offset,
            length,
        }
    }

    pub fn original(range: Range<u64>) -> Self {
        Self::new(PieceSource::Original, range.start, range.end - range.start)
    }

    /// Split into two adjacent pieces at `pivot` bytes in.
    ///
    /// # Panics
    ///
    /// Unless `0 < pivot < length`.
    pub fn split_at(&self, pivot: u64) -> (Piece, Piece) {
        assert!(
            pivot > 0 && pivot < self.length,
            "split pivot {} outside (0, {})",
            pivot,
            self.length
        );
        let left = Piece::new(self.source, self.offset, pivot);
        let right = Piece::new(self.source, self.offset + pivot, self.length - pivot);
        (left, right)
    }

    /// The sub-span `[from, from + length)` relative to this piece.
    fn slice(&self, from: u64, length: u64) -> Piece {
        debug_assert!(from + length <= self.length);
        Piece::new(self.source, self.offset + from, length)
    }
}

/// A captured document state; restoring it is O(1).
#[derive(Debug, Clone)]
pub struct DocumentVersion {
    pieces: RBTree<Piece>,
    len: u64,
}

impl DocumentVersion {
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn piece_count(&self) -> usize {
        self.pieces.len()
    }

    /// Whether both handles denote the same piece tree.
    pub fn same_as(&self, other: &DocumentVersion) -> bool {
        self.len == other.len && RBTree::same_version(&self.pieces, &other.pieces)
    }
}

/// Piece table document.
///
/// Original pieces read through a [`ChunkManager`], so reads take `&mut
/// self` to maintain the cache; the document content is unchanged by them.
#[derive(Debug)]
pub struct PieceTable {
    original: ChunkManager,
    edits: EditBuffer,
    pieces: RBTree<Piece>,
    len: u64,
}

// ========== Construction ==========

impl PieceTable {
    /// Empty document.
    pub fn new() -> Self {
        Self {
            original: ChunkManager::empty(),
            edits: EditBuffer::new(BufferConfig::default().edit_block_size),
            pieces: RBTree::new(),
            len: 0,
        }
    }

    /// Document over in-memory text with the default configuration.
    pub fn from_text(text: impl AsRef<[u8]>) -> Result<Self> {
        Self::from_text_with_config(text, &BufferConfig::default())
    }

    pub fn from_text_with_config(text: impl AsRef<[u8]>, config: &BufferConfig) -> Result<Self> {
        let loader = MemoryChunkLoader::new(Bytes::copy_from_slice(text.as_ref()));
        Self::from_loader(Box::new(loader), config)
    }

    /// Document whose original content is the whole loader source.
    pub fn from_loader(loader: Box<dyn ChunkLoader>, config: &BufferConfig) -> Result<Self> {
        let original = ChunkManager::with_config(loader, config)?;
        let len = original.size();

        let pieces = if len == 0 {
            RBTree::new()
        } else {
            RBTree::new().insert(0, Piece::original(0..len)).0
        };

        Ok(Self {
            original,
            edits: EditBuffer::new(config.edit_block_size),
            pieces,
            len,
        })
    }

    /// Open a file, picking chunk geometry and loader by its size.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let size = std::fs::metadata(path)?.len();
        let config = BufferConfig::for_source_size(size);
        let kind = SourceKind::for_source_size(size);

        info!(
            path = %path.display(),
            size,
            chunk_size = config.chunk_size,
            memory_limit = config.memory_limit,
            ?kind,
            "opening document"
        );

        let loader = open_source(path, kind)?;
        Self::from_loader(loader, &config)
    }
}

// ========== Queries ==========

impl PieceTable {
    /// Document length in bytes.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn piece_count(&self) -> usize {
        self.pieces.len()
    }

    /// Pieces in document order with their start offsets.
    pub fn pieces(&self) -> impl Iterator<Item = (u64, &Piece)> + '_ {
        self.pieces.iter()
    }

    pub fn chunk_manager(&self) -> &ChunkManager {
        &self.original
    }

    /// Number of edit buffer blocks allocated so far.
    pub fn edit_block_count(&self) -> usize {
        self.edits.block_count()
    }

    /// The piece containing `offset` and its start, or `None` at or past
    /// the end of the document.
    pub fn find_piece(&self, offset: u64) -> Option<(u64, &Piece)> {
        if offset >= self.len {
            return None;
        }
        self.pieces.floor(offset)
    }
}

// ========== Editing ==========

impl PieceTable {
    /// Insert `text` at `offset`; `offset == len()` appends.
    ///
    /// # Panics
    ///
    /// If `offset > len()`.
    pub fn insert(&mut self, offset: u64, text: impl AsRef<[u8]>) {
        let text = text.as_ref();
        assert!(
            offset <= self.len,
            "insert offset {} beyond document length {}",
            offset,
            self.len
        );
        if text.is_empty() {
            return;
        }

        self.maybe_split_at(offset);

        let added = self.edits.append(text);
        let mut pieces = self.pieces.shift_from(offset, text.len() as i64);
        let mut at = offset;
        for piece in added {
            pieces = pieces.insert(at, piece).0;
            at += piece.length;
        }

        self.pieces = pieces;
        self.len += text.len() as u64;
    }

    /// Remove `length` bytes starting at `offset`.
    ///
    /// # Panics
    ///
    /// If the range runs past the end of the document.
    pub fn remove(&mut self, offset: u64, length: u64) {
        let end = offset
            .checked_add(length)
            .filter(|end| *end <= self.len)
            .unwrap_or_else(|| {
                panic!(
                    "remove range {}+{} beyond document length {}",
                    offset, length, self.len
                )
            });
        if length == 0 {
            return;
        }

        self.maybe_split_at(offset);
        self.maybe_split_at(end);
        debug_assert!(self.pieces.get(offset).is_some());

        let doomed: Vec<u64> = self
            .pieces
            .range_from(offset)
            .map(|(start, _)| start)
            .take_while(|start| *start < end)
            .collect();

        let mut pieces = self.pieces.clone();
        for start in doomed {
            pieces = pieces.delete(start).0;
        }

        self.pieces = pieces.shift_from(end, -(length as i64));
        self.len -= length;
    }

    /// Make `offset` a piece boundary; a no-op at a boundary or the end.
    ///
    /// The document content is unchanged.
    pub fn maybe_split_at(&mut self, offset: u64) {
        let Some((start, piece)) = self.find_piece(offset) else {
            return;
        };
        if start == offset {
            return;
        }

        //  |<---------original piece------------>|
        //                  ^
        //                  | offset
        //  |<-----left---->|<--------right------>|
        let (left, right) = piece.split_at(offset - start);
        trace!(start, offset, length = piece.length, "piece split");
        self.pieces = self.pieces.insert(start, left).0.insert(offset, right).0;
    }
}

// ========== Reading ==========

impl PieceTable {
    /// Bytes in `range`.
    ///
    /// # Panics
    ///
    /// If the range is reversed or runs past the end of the document.
    pub fn read(&mut self, range: Range<u64>) -> Result<Vec<u8>> {
        assert!(
            range.start <= range.end && range.end <= self.len,
            "read range {:?} outside document of {} bytes",
            range,
            self.len
        );

        let mut out = Vec::with_capacity((range.end - range.start) as usize);
        if range.is_empty() {
            return Ok(out);
        }

        let first = self.pieces.floor(range.start).map_or(0, |(start, _)| start);
        for (start, piece) in self.pieces.range_from(first) {
            if start >= range.end {
                break;
            }
            let from = range.start.saturating_sub(start);
            let to = (range.end - start).min(piece.length);
            copy_piece(&mut self.original, &self.edits, &piece.slice(from, to - from), &mut out)?;
        }

        Ok(out)
    }

    /// The whole document.
    pub fn dump(&mut self) -> Result<Vec<u8>> {
        self.read(0..self.len)
    }

    /// The whole document as text, replacing invalid UTF-8.
    pub fn dump_lossy(&mut self) -> Result<String> {
        let bytes = self.dump()?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Bytes referenced by `piece`.
    pub fn piece_bytes(&mut self, piece: &Piece) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(piece.length as usize);
        copy_piece(&mut self.original, &self.edits, piece, &mut out)?;
        Ok(out)
    }

    /// Stream the document in windows of `chunk_size` bytes.
    pub fn iter_chunks(&mut self, chunk_size: usize) -> ChunkIter<'_> {
        ChunkIter::new(self, chunk_size)
    }
}

fn copy_piece(
    original: &mut ChunkManager,
    edits: &EditBuffer,
    piece: &Piece,
    out: &mut Vec<u8>,
) -> Result<()> {
    match piece.source {
        PieceSource::Original => {
            for view in calculate_chunk_views(piece.offset, piece.length, original.chunk_size()) {
                out.extend_from_slice(&original.get_chunk(view)?);
            }
        }
        PieceSource::Added { block } => {
            out.extend_from_slice(edits.bytes(block, piece.offset, piece.length));
        }
    }
    Ok(())
}

// ========== Versions ==========

impl PieceTable {
    /// Handle to the current document state.
    pub fn capture(&self) -> DocumentVersion {
        DocumentVersion {
            pieces: self.pieces.clone(),
            len: self.len,
        }
    }

    /// Return to a state captured from this document.
    ///
    /// Edits made after the capture stay in the edit buffer, so versions
    /// captured later remain restorable too.
    pub fn restore(&mut self, version: &DocumentVersion) {
        debug!(
            from_len = self.len,
            to_len = version.len,
            pieces = version.pieces.len(),
            edit_bytes = self.edits.len(),
            "restoring document version"
        );
        self.pieces = version.pieces.clone();
        self.len = version.len;
    }
}

impl Default for PieceTable {
    fn default() -> Self {
        Self::new()
    }
}
