// Streaming iterator
//
// Responsibility: walk a PieceTable in fixed-size windows so the whole
//                 document never has to be materialized at once

use crate::core::buffer::PieceTable;
use crate::error::Result;

/// Streaming iterator over a [`PieceTable`].
///
/// Stops after the first read error.
pub struct ChunkIter<'a> {
    piece_table: &'a mut PieceTable,
    current_pos: u64,
    chunk_size: u64,
    total_bytes: u64,
}

impl<'a> ChunkIter<'a> {
    pub fn new(piece_table: &'a mut PieceTable, chunk_size: usize) -> Self {
        assert!(chunk_size > 0, "chunk size must be positive");
        let total_bytes = piece_table.len();
        Self {
            piece_table,
            current_pos: 0,
            chunk_size: chunk_size as u64,
            total_bytes,
        }
    }
}

impl<'a> Iterator for ChunkIter<'a> {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current_pos >= self.total_bytes {
            return None;
        }

        let end = (self.current_pos + self.chunk_size).min(self.total_bytes);
        let chunk = self.piece_table.read(self.current_pos..end);
        self.current_pos = if chunk.is_ok() { end } else { self.total_bytes };

        Some(chunk)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total_bytes.saturating_sub(self.current_pos);
        let chunks = remaining.div_ceil(self.chunk_size) as usize;
        (0, Some(chunks))
    }
}
