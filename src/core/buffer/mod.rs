// Piece Table buffer
//
// Responsibility: the editable document; pieces over chunk-cached original
//                 content and an append-only edit buffer, with cheap
//                 version capture for undo

mod chunk_iter;
mod edit_buffer;
mod piece_table;

pub use self::chunk_iter::ChunkIter;
pub use self::piece_table::{DocumentVersion, Piece, PieceSource, PieceTable};
