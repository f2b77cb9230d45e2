// Chunk cache unit tests

use std::io::Write;

use proptest::prelude::*;
use tempfile::NamedTempFile;

use oned::config::{BufferConfig, SourceKind};
use oned::core::chunk::{
    calculate_chunk_views, open_source, ChunkLoader, ChunkManager, ChunkView, FileChunkLoader,
    MemoryChunkLoader, MmapChunkLoader,
};
use oned::Error;

fn temp_file(content: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content).unwrap();
    file.flush().unwrap();
    file
}

fn numbered(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

proptest! {
    #[test]
    fn prop_views_cover_range(
        offset in 0u64..10_000,
        length in 0u64..10_000,
        chunk_size in 1u32..512,
    ) {
        let views = calculate_chunk_views(offset, length, chunk_size);

        prop_assert_eq!(views.iter().map(|v| u64::from(v.length)).sum::<u64>(), length);
        if length == 0 {
            prop_assert!(views.is_empty());
        }

        let mut pos = offset;
        for view in &views {
            prop_assert!(view.length > 0);
            prop_assert!(view.end() <= chunk_size);
            prop_assert_eq!(
                u64::from(view.id) * u64::from(chunk_size) + u64::from(view.offset),
                pos
            );
            pos += u64::from(view.length);
        }
        for pair in views.windows(2) {
            prop_assert_eq!(pair[0].id + 1, pair[1].id);
        }
    }

    #[test]
    fn prop_manager_reads_match_source(
        reads in prop::collection::vec((0u64..1000, 0u64..300), 1..50),
    ) {
        let source = numbered(1000);
        let loader = MemoryChunkLoader::new(source.clone());
        let mut manager = ChunkManager::new(Box::new(loader), 64, 192).unwrap();

        for (offset, length) in reads {
            let length = length.min(1000 - offset);
            let views = calculate_chunk_views(offset, length, manager.chunk_size());
            let mut bytes = Vec::new();
            for view in views {
                bytes.extend_from_slice(&manager.get_chunk(view).unwrap());
                prop_assert!(manager.memory_usage() <= manager.memory_limit());
                prop_assert!(manager.resident_count() <= 3);
            }
            prop_assert_eq!(&bytes[..], &source[offset as usize..(offset + length) as usize]);
        }
    }
}

#[test]
fn test_views_from_fixed_cases() {
    assert_eq!(calculate_chunk_views(0, 10, 10), vec![ChunkView::new(0, 0, 10)]);
    assert_eq!(
        calculate_chunk_views(12, 35, 10),
        vec![
            ChunkView::new(1, 2, 8),
            ChunkView::new(2, 0, 10),
            ChunkView::new(3, 0, 10),
            ChunkView::new(4, 0, 7),
        ]
    );
}

#[test]
fn test_file_loader_reads() {
    let content = numbered(300);
    let file = temp_file(&content);

    let mut loader = FileChunkLoader::open(file.path()).unwrap();
    assert_eq!(loader.size(), 300);
    assert_eq!(&loader.read_chunk(100, 50).unwrap()[..], &content[100..150]);

    let err = loader.read_chunk(290, 20).unwrap_err();
    assert!(matches!(err, Error::UnexpectedEof { offset: 290, length: 20 }));
    assert!(err.is_io());
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = FileChunkLoader::open(dir.path().join("missing")).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
    assert!(err.is_io());
}

#[test]
fn test_open_source_kinds_agree() {
    let content = numbered(1234);
    let file = temp_file(&content);

    for kind in [SourceKind::Buffered, SourceKind::MemoryMapped] {
        let mut loader = open_source(file.path(), kind).unwrap();
        assert_eq!(loader.size(), 1234);
        assert_eq!(&loader.read_chunk(1000, 234).unwrap()[..], &content[1000..]);
    }
}

#[test]
fn test_mmap_loader_get_bytes() {
    let file = temp_file(b"0123456789");
    let loader = MmapChunkLoader::open(file.path()).unwrap();
    assert_eq!(loader.get_bytes(2..5), Some(&b"234"[..]));
    assert_eq!(loader.get_bytes(8..11), None);
}

#[test]
fn test_manager_over_file_respects_budget() {
    let content = numbered(10 * 1024);
    let file = temp_file(&content);
    let config = BufferConfig::new(1024, 4096, 1024).unwrap();

    let loader = FileChunkLoader::open(file.path()).unwrap();
    let mut manager = ChunkManager::with_config(Box::new(loader), &config).unwrap();
    assert_eq!(manager.slot_count(), 10);

    // walk forward, then revisit recent chunks
    for id in (0..10).chain([9, 8, 7]) {
        let view = ChunkView::new(id, 0, 1024);
        let bytes = manager.get_chunk(view).unwrap();
        let start = id as usize * 1024;
        assert_eq!(&bytes[..], &content[start..start + 1024]);
        assert!(manager.memory_usage() <= 4096);
    }
    assert_eq!(manager.lru_order(), vec![7, 8, 9, 6]);
}

#[test]
fn test_manager_with_invalid_config() {
    let loader = MemoryChunkLoader::new(numbered(10));
    let err = ChunkManager::new(Box::new(loader), 0, 100).unwrap_err();
    assert!(matches!(err, Error::InvalidConfig { .. }));
    assert!(!err.is_io());
}
