use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

mod compression;
mod key_gen;

pub use compression::{compress_data, decompress_data};
pub use key_gen::url_cache_key;

/// On-disk cache of successful GitHub response bodies, keyed by request URL
#[derive(Debug, Clone)]
pub struct ResponseCache {
    cache_dir: PathBuf,
    ttl_hours: u32,
    compression_enabled: bool,
}

impl ResponseCache {
    pub fn new(cache_dir: PathBuf, ttl_hours: u32, compression_enabled: bool) -> Self {
        ResponseCache {
            cache_dir,
            ttl_hours,
            compression_enabled,
        }
    }

    /// Default cache location (`~/.cache/gh-harvest`)
    pub fn default_dir() -> Result<PathBuf> {
        let cache = dirs::cache_dir().context("Could not determine cache directory")?;
        Ok(cache.join("gh-harvest"))
    }

    pub fn dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Create the cache directory
    pub fn initialize(&self) -> Result<()> {
        fs::create_dir_all(&self.cache_dir)
            .with_context(|| format!("Failed to create cache directory: {:?}", self.cache_dir))?;

        debug!("Response cache at {:?}", self.cache_dir);
        Ok(())
    }

    /// Cached body for `url`, if present and younger than the TTL
    pub fn get(&self, url: &str) -> Result<Option<String>> {
        let path = self.path_for(url);
        if !path.exists() {
            return Ok(None);
        }

        if self.is_expired(&path)? {
            debug!("Cache expired: {:?}", path);
            let _ = fs::remove_file(&path);
            return Ok(None);
        }

        let data = fs::read(&path).with_context(|| format!("Failed to read cache: {:?}", path))?;
        let data = if self.compression_enabled {
            decompress_data(&data)?
        } else {
            data
        };

        String::from_utf8(data)
            .map(Some)
            .context("Invalid UTF-8 in cached response")
    }

    /// Store the body returned for `url`
    pub fn put(&self, url: &str, body: &str) -> Result<()> {
        let path = self.path_for(url);
        let data = if self.compression_enabled {
            compress_data(body.as_bytes())?
        } else {
            body.as_bytes().to_vec()
        };

        fs::write(&path, data).with_context(|| format!("Failed to write cache: {:?}", path))?;

        debug!("Cached response for {}", url);
        Ok(())
    }

    /// Remove every cached entry, returning how many were deleted
    pub fn clear(&self) -> Result<usize> {
        if !self.cache_dir.exists() {
            return Ok(0);
        }

        let mut removed = 0;
        for entry in fs::read_dir(&self.cache_dir)? {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "cache") {
                fs::remove_file(&path)
                    .with_context(|| format!("Failed to delete cache: {:?}", path))?;
                removed += 1;
            }
        }

        info!("Cleared {} cached responses", removed);
        Ok(removed)
    }

    fn path_for(&self, url: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.cache", url_cache_key(url)))
    }

    fn is_expired(&self, path: &Path) -> Result<bool> {
        let metadata = fs::metadata(path)?;
        let max_age = Duration::from_secs((self.ttl_hours as u64) * 3600);

        Ok(match metadata.modified() {
            Ok(modified) => modified.elapsed().unwrap_or_default() > max_age,
            Err(_) => false,
        })
    }
}
