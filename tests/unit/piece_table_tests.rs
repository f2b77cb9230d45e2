// Piece Table unit tests

use oned::config::BufferConfig;
use oned::core::buffer::{Piece, PieceSource, PieceTable};

/// Eight-byte chunks and eight-byte edit blocks.
fn small_config() -> BufferConfig {
    BufferConfig::new(8, 64, 8).unwrap()
}

/// "000011112222" split into the pieces 0000 | 1111 | 2222.
fn three_piece_table() -> PieceTable {
    let mut table = PieceTable::from_text_with_config("000011112222", &small_config()).unwrap();
    table.maybe_split_at(4);
    table.maybe_split_at(8);
    assert_eq!(table.piece_count(), 3);
    table
}

fn text(table: &mut PieceTable) -> String {
    table.dump_lossy().unwrap()
}

#[test]
fn test_empty_table() {
    let mut table = PieceTable::new();
    assert!(table.is_empty());
    assert_eq!(table.len(), 0);
    assert_eq!(table.piece_count(), 0);
    assert_eq!(text(&mut table), "");
}

#[test]
fn test_from_text() {
    let table = PieceTable::from_text("Hello, world!").unwrap();
    assert!(!table.is_empty());
    assert_eq!(table.len(), 13);
    assert_eq!(table.piece_count(), 1);
    assert_eq!(table.find_piece(0), Some((0, &Piece::original(0..13))));
}

#[test]
fn test_find_piece_aligned() {
    let table = three_piece_table();
    assert_eq!(table.find_piece(0), Some((0, &Piece::original(0..4))));
    assert_eq!(table.find_piece(4), Some((4, &Piece::original(4..8))));
    assert_eq!(table.find_piece(8), Some((8, &Piece::original(8..12))));
    assert_eq!(table.find_piece(12), None);
    assert_eq!(table.find_piece(16), None);
}

#[test]
fn test_find_piece_unaligned() {
    let table = three_piece_table();
    assert_eq!(table.find_piece(1), Some((0, &Piece::original(0..4))));
    assert_eq!(table.find_piece(5), Some((4, &Piece::original(4..8))));
    assert_eq!(table.find_piece(9), Some((8, &Piece::original(8..12))));
    assert_eq!(table.find_piece(13), None);
}

#[test]
fn test_piece_split() {
    let piece = Piece::original(0..4);
    let (left, right) = piece.split_at(2);
    assert_eq!(left, Piece::new(PieceSource::Original, 0, 2));
    assert_eq!(right, Piece::new(PieceSource::Original, 2, 2));
}

#[test]
fn test_piece_split_preserves_bytes() {
    let mut table = PieceTable::from_text_with_config("abcdefghijklmnopqrstu", &small_config()).unwrap();
    table.insert(10, "0123456789");
    let pieces: Vec<Piece> = table.pieces().map(|(_, p)| *p).collect();

    for piece in pieces {
        let whole = table.piece_bytes(&piece).unwrap();
        for pivot in 1..piece.length {
            let (left, right) = piece.split_at(pivot);
            assert_eq!(left.length + right.length, piece.length);
            let mut joined = table.piece_bytes(&left).unwrap();
            joined.extend(table.piece_bytes(&right).unwrap());
            assert_eq!(joined, whole);
        }
    }
}

#[test]
#[should_panic]
fn test_piece_split_at_length_panics() {
    Piece::original(0..4).split_at(4);
}

#[test]
fn test_insert() {
    let mut table = three_piece_table();

    table.insert(4, "xxxx");
    assert_eq!(text(&mut table), "0000xxxx11112222");
    assert_eq!(table.piece_count(), 4);
    assert_eq!(
        table.find_piece(4),
        Some((4, &Piece::new(PieceSource::Added { block: 0 }, 0, 4)))
    );

    table.insert(16, "yyyy");
    assert_eq!(text(&mut table), "0000xxxx11112222yyyy");
    assert_eq!(table.piece_count(), 5);
    assert_eq!(table.edit_block_count(), 1);

    table.insert(18, "zzzz");
    assert_eq!(table.piece_count(), 7);
    assert_eq!(table.edit_block_count(), 2);
    assert_eq!(text(&mut table), "0000xxxx11112222yyzzzzyy");
}

#[test]
fn test_insert_spanning_edit_blocks() {
    let mut table = PieceTable::from_text_with_config("ab", &small_config()).unwrap();
    table.insert(1, "0123456789abcdefghij");
    assert_eq!(text(&mut table), "a0123456789abcdefghijb");
    assert_eq!(table.edit_block_count(), 3);
    // a | 01234567 | 89abcdef | ghij | b
    assert_eq!(table.piece_count(), 5);
}

#[test]
fn test_remove() {
    let mut table = three_piece_table();
    assert_eq!(text(&mut table), "000011112222");

    table.remove(0, 4);
    assert_eq!(table.piece_count(), 2);
    assert_eq!(table.find_piece(0), Some((0, &Piece::original(4..8))));
    assert_eq!(table.find_piece(4), Some((4, &Piece::original(8..12))));
    assert_eq!(text(&mut table), "11112222");

    table.remove(1, 2);
    assert_eq!(table.piece_count(), 3);
    assert_eq!(table.find_piece(0), Some((0, &Piece::original(4..5))));
    assert_eq!(table.find_piece(1), Some((1, &Piece::original(7..8))));
    assert_eq!(table.find_piece(2), Some((2, &Piece::original(8..12))));
    assert_eq!(text(&mut table), "112222");

    table.remove(0, 6);
    assert_eq!(table.piece_count(), 0);
    assert!(table.is_empty());
}

#[test]
fn test_remove_then_reinsert() {
    let mut table = PieceTable::from_text("The quick brown fox").unwrap();
    let before = table.dump().unwrap();

    let removed = table.read(4..10).unwrap();
    table.remove(4, 6);
    assert_eq!(text(&mut table), "The brown fox");
    table.insert(4, &removed);

    assert_eq!(table.dump().unwrap(), before);
}

#[test]
fn test_read_range_across_pieces() {
    let mut table = PieceTable::from_text("Hello world").unwrap();
    table.insert(5, ",");
    table.insert(12, "!");
    assert_eq!(table.read(3..9).unwrap(), b"lo, wo");
    assert_eq!(table.read(0..0).unwrap(), b"");
    assert_eq!(table.read(11..13).unwrap(), b"d!");
}

#[test]
#[should_panic]
fn test_read_past_end_panics() {
    let mut table = PieceTable::from_text("abc").unwrap();
    let _ = table.read(1..4);
}

#[test]
fn test_pieces_cover_document() {
    let mut table = PieceTable::from_text_with_config("abcdefghij", &small_config()).unwrap();
    table.insert(3, "XYZ");
    table.remove(7, 2);
    table.insert(0, "<<");

    let mut expected_start = 0;
    for (start, piece) in table.pieces() {
        assert_eq!(start, expected_start);
        assert!(piece.length > 0);
        expected_start += piece.length;
    }
    assert_eq!(expected_start, table.len());
}

#[test]
fn test_capture_is_independent() {
    let mut table = PieceTable::from_text("abc").unwrap();
    let original = table.capture();
    table.insert(3, "def");
    let appended = table.capture();
    table.remove(0, 6);

    assert_eq!(original.len(), 3);
    assert_eq!(appended.len(), 6);
    assert!(table.is_empty());

    table.restore(&appended);
    assert_eq!(text(&mut table), "abcdef");
    table.insert(0, "0");
    table.restore(&original);
    assert_eq!(text(&mut table), "abc");
    table.restore(&appended);
    assert_eq!(text(&mut table), "abcdef");
}
