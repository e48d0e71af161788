#[cfg(test)]
#[path = "cache_storage_test.rs"]
mod tests;

use std::path;

use anyhow::bail;
use anyhow::Result;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use tokio::fs;
use tokio::io::AsyncWriteExt;

const STAGING_PREFIX: &str = ".staging-";
const ASIDE_PREFIX: &str = ".old-";

/// Versioned key-value store of request URL to response body. Each cache name
/// is a directory under `root`, each entry a file named after its URL.
pub struct CacheStorage {
    pub root: path::PathBuf,
}

impl CacheStorage {
    pub fn new(root: path::PathBuf) -> CacheStorage {
        return CacheStorage { root };
    }

    fn cache_path(&self, name: &str) -> Result<path::PathBuf> {
        if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
            bail!(format!("Invalid cache name: {name}"));
        }

        return Ok(self.root.join(name));
    }

    fn entry_name(url: &str) -> String {
        return URL_SAFE_NO_PAD.encode(url.as_bytes());
    }

    /// Names of every committed cache store.
    pub async fn keys(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = vec![];
        if !self.root.exists() {
            return Ok(names);
        }

        let mut dir = fs::read_dir(&self.root).await?;
        while let Some(entry) = dir.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }

            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with('.') {
                continue;
            }
            names.push(name);
        }

        names.sort();
        return Ok(names);
    }

    pub async fn has(&self, name: &str) -> Result<bool> {
        return Ok(self.cache_path(name)?.is_dir());
    }

    /// Writes all entries into a staging directory and renames it into place,
    /// so a store either holds the full set or does not exist. A live store of
    /// the same name is moved aside until the new one is in place, and moved
    /// back if the swap fails.
    pub async fn put_all(&self, name: &str, entries: Vec<(String, Vec<u8>)>) -> Result<()> {
        let cache_path = self.cache_path(name)?;
        let staging_path = self.root.join(format!("{STAGING_PREFIX}{name}"));
        let aside_path = self.root.join(format!("{ASIDE_PREFIX}{name}"));

        if staging_path.exists() {
            fs::remove_dir_all(&staging_path).await?;
        }
        fs::create_dir_all(&staging_path).await?;

        for (url, body) in entries {
            let mut file = fs::File::create(staging_path.join(CacheStorage::entry_name(&url))).await?;
            file.write_all(&body).await?;
            file.flush().await?;
        }

        if aside_path.exists() {
            fs::remove_dir_all(&aside_path).await?;
        }

        let replacing = cache_path.exists();
        if replacing {
            fs::rename(&cache_path, &aside_path).await?;
        }

        if let Err(err) = fs::rename(&staging_path, &cache_path).await {
            if replacing {
                fs::rename(&aside_path, &cache_path).await?;
            }
            let _ = fs::remove_dir_all(&staging_path).await;
            return Err(err.into());
        }

        if replacing {
            fs::remove_dir_all(&aside_path).await?;
        }

        return Ok(());
    }

    /// Looks up the body stored for `url` in the named store.
    pub async fn get(&self, name: &str, url: &str) -> Result<Option<Vec<u8>>> {
        let entry_path = self.cache_path(name)?.join(CacheStorage::entry_name(url));
        if !entry_path.is_file() {
            return Ok(None);
        }

        let body = fs::read(entry_path).await?;
        return Ok(Some(body));
    }

    /// Returns false when the store did not exist.
    pub async fn delete(&self, name: &str) -> Result<bool> {
        let cache_path = self.cache_path(name)?;
        if !cache_path.exists() {
            return Ok(false);
        }

        fs::remove_dir_all(cache_path).await?;
        return Ok(true);
    }
}
