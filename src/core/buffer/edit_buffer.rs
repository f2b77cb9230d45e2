// Edit buffer
//
// Responsibility: append-only storage for inserted bytes, grown one
//                 fixed-size block at a time; bytes never move once written

use tracing::debug;

use crate::core::buffer::piece_table::{Piece, PieceSource};

#[derive(Debug, Clone)]
pub(crate) struct EditBuffer {
    blocks: Vec<Vec<u8>>,
    block_size: usize,
}

impl EditBuffer {
    pub(crate) fn new(block_size: usize) -> Self {
        assert!(block_size > 0, "edit block size must be positive");
        Self {
            blocks: Vec::new(),
            block_size,
        }
    }

    pub(crate) fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Bytes stored across all blocks.
    pub(crate) fn len(&self) -> usize {
        self.blocks.iter().map(Vec::len).sum()
    }

    /// Append `text`, returning one piece per block it lands in.
    pub(crate) fn append(&mut self, text: &[u8]) -> Vec<Piece> {
        let mut pieces = Vec::new();
        let mut rest = text;

        while !rest.is_empty() {
            if self.blocks.last().map_or(true, |b| b.len() == self.block_size) {
                self.blocks.push(Vec::with_capacity(self.block_size));
                debug!(block = self.blocks.len() - 1, size = self.block_size, "edit block allocated");
            }

            let block_id = self.blocks.len() - 1;
            let block = &mut self.blocks[block_id];
            let take = rest.len().min(self.block_size - block.len());
            debug_assert!(take > 0);

            pieces.push(Piece::new(
                PieceSource::Added { block: block_id as u32 },
                block.len() as u64,
                take as u64,
            ));
            block.extend_from_slice(&rest[..take]);
            rest = &rest[take..];
        }

        pieces
    }

    /// Bytes referenced by an added piece.
    ///
    /// # Panics
    ///
    /// If the piece does not point into this buffer.
    pub(crate) fn bytes(&self, block: u32, offset: u64, length: u64) -> &[u8] {
        let start = offset as usize;
        let end = start + length as usize;
        &self.blocks[block as usize][start..end]
    }
}
