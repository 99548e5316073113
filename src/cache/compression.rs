use anyhow::{Context, Result};
use flate2::write::{GzDecoder, GzEncoder};
use flate2::Compression;
use std::io::Write;
use tracing::debug;

/// Compress data using gzip
pub fn compress_data(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .context("Failed to write data to compressor")?;

    let compressed = encoder.finish().context("Failed to finish compression")?;

    debug!(
        "Compressed response body from {} to {} bytes",
        data.len(),
        compressed.len()
    );

    Ok(compressed)
}

/// Decompress gzip data
pub fn decompress_data(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(Vec::new());
    decoder
        .write_all(data)
        .context("Failed to write compressed data to decoder")?;

    decoder.finish().context("Failed to finish decompression")
}
