// oned - chunk-cached piece table for very large files
//
// Licensed under MIT License

use std::io::Write;

use anyhow::Context;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

use oned::PieceTable;

/// Window size used when streaming the document to stdout.
const STREAM_CHUNK_SIZE: usize = 64 * 1024;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with_writer(std::io::stderr)
        .init();

    let Some(path) = std::env::args_os().nth(1) else {
        anyhow::bail!("usage: oned <path>");
    };

    let mut table = PieceTable::open(&path)
        .with_context(|| format!("failed to open {}", path.to_string_lossy()))?;

    let manager = table.chunk_manager();
    info!(
        size = table.len(),
        chunk_size = manager.chunk_size(),
        chunks = manager.slot_count(),
        memory_limit = manager.memory_limit(),
        "document ready"
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut written = 0u64;
    for chunk in table.iter_chunks(STREAM_CHUNK_SIZE) {
        let chunk = chunk.context("failed to read document")?;
        out.write_all(&chunk)?;
        written += chunk.len() as u64;
    }
    out.flush()?;

    info!(written, "done");
    Ok(())
}
