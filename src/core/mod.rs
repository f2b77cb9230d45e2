// Document core
//
// Responsibility: chunk cache over the original source, the persistent
//                 piece index, and the piece table built on both

pub mod buffer;
pub mod chunk;
pub mod rbtree;

pub use buffer::{DocumentVersion, Piece, PieceSource, PieceTable};
pub use chunk::{ChunkLoader, ChunkManager, ChunkView};
pub use rbtree::RBTree;
