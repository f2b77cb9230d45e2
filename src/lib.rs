//! Chunk-cached piece table for editing files larger than memory.
//!
//! The original file is read lazily in fixed-size chunks through a
//! [`ChunkManager`](core::ChunkManager) bounded by a memory budget; edits
//! live in an append-only buffer; the piece sequence is kept in a
//! persistent Red-Black tree so any earlier version can be restored in
//! O(1).

pub mod config;
pub mod core;
pub mod error;

pub use crate::config::BufferConfig;
pub use crate::core::{DocumentVersion, PieceTable};
pub use crate::error::{Error, Result};
