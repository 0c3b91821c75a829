//! On-disk cache of downloaded map files
//!
//! A cached file is named after the last path segment of its URL. Presence
//! of the file is the only validity check: HESPE never changes a product once
//! published, so there is no expiry and no invalidation.

use std::io::Write;
use std::path::{Path, PathBuf};

use log::debug;
use tempfile::NamedTempFile;

/// Last path segment of a URL
pub fn filename_for(url: &str) -> &str {
    match url.rfind('/') {
        Some(pos) => &url[pos + 1..],
        None => url,
    }
}

#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the cache directory.
    ///
    /// An existing directory is fine; anything else that prevents creation
    /// (permissions, a file in the way) is reported.
    pub fn ensure_dir(&self) -> std::io::Result<()> {
        match std::fs::create_dir_all(&self.dir) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists && self.dir.is_dir() => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Local path for a URL
    pub fn path_for(&self, url: &str) -> std::io::Result<PathBuf> {
        let filename = filename_for(url);
        if filename.is_empty() || filename == "." || filename == ".." {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("URL {url} does not name a file"),
            ));
        }
        Ok(self.dir.join(filename))
    }

    /// Whether a file for this URL is already on disk
    pub fn contains(&self, url: &str) -> bool {
        self.path_for(url).map(|p| p.is_file()).unwrap_or(false)
    }

    /// Write `bytes` as the cached copy of `url`.
    ///
    /// The file is written next to its final location and renamed into
    /// place, so readers never see a partial file. Concurrent writers of the
    /// same URL both succeed; the last rename wins.
    pub fn store(&self, url: &str, bytes: &[u8]) -> std::io::Result<PathBuf> {
        let path = self.path_for(url)?;
        self.ensure_dir()?;
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(bytes)?;
        tmp.flush()?;
        tmp.persist(&path).map_err(|e| e.error)?;
        debug!("cached {} at {}", url, path.display());
        Ok(path)
    }
}
