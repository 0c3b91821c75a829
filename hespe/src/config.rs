//! HESPE endpoints and download location
//!
//! Defaults point at the public HESPE server and a downloads root under
//! `$HOME/sunpy/data`. Maps are cached in the `HESPE` directory below it.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Returns all data of one flare event, id appended
pub const FLARE_DATA_BASE_URL: &str = "http://hsp.cs.technik.fhnw.ch/webdbi-0.6-SNAPSHOT/getEventAllData/";
/// Filtered event listing, positional parameters appended
pub const EVENT_LIST_BASE_URL: &str = "http://hsp.cs.technik.fhnw.ch/webdbi-0.6-SNAPSHOT/filteredEvents/";
/// Static host of the map and light curve files
pub const IMAGE_DATABASE_BASE_URL: &str = "http://hsp.cs.technik.fhnw.ch/flaredata/";

/// Environment variable overriding the downloads root
pub const DOWNLOAD_DIR_ENV: &str = "HESPE_DOWNLOAD_DIR";

/// Name of the cache directory below the downloads root
pub const CACHE_SUBDIR: &str = "HESPE";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HespeConfig {
    pub flare_data_url: String,
    pub event_list_url: String,
    pub image_base_url: String,
    /// Downloads root; the map cache lives in `<download_dir>/HESPE`
    pub download_dir: PathBuf,
}

impl HespeConfig {
    /// Default endpoints with the downloads root at `$HOME/sunpy/data`
    pub fn new() -> std::io::Result<Self> {
        let home = std::env::var("HOME")
            .map_err(|_| std::io::Error::new(std::io::ErrorKind::NotFound, "HOME not set"))?;
        Ok(Self::with_download_dir(
            PathBuf::from(home).join("sunpy").join("data"),
        ))
    }

    /// Like [`new`](Self::new), but `HESPE_DOWNLOAD_DIR` wins when set
    pub fn from_env() -> std::io::Result<Self> {
        match std::env::var_os(DOWNLOAD_DIR_ENV) {
            Some(dir) if !dir.is_empty() => Ok(Self::with_download_dir(PathBuf::from(dir))),
            _ => Self::new(),
        }
    }

    /// Default endpoints with an explicit downloads root
    pub fn with_download_dir(download_dir: PathBuf) -> Self {
        Self {
            flare_data_url: FLARE_DATA_BASE_URL.to_string(),
            event_list_url: EVENT_LIST_BASE_URL.to_string(),
            image_base_url: IMAGE_DATABASE_BASE_URL.to_string(),
            download_dir,
        }
    }

    /// Point all three endpoints at one server root, e.g. a mirror.
    ///
    /// The root keeps the HESPE path layout below it.
    pub fn with_server_root(mut self, root: &str) -> Self {
        let root = root.trim_end_matches('/');
        self.flare_data_url = format!("{root}/webdbi-0.6-SNAPSHOT/getEventAllData/");
        self.event_list_url = format!("{root}/webdbi-0.6-SNAPSHOT/filteredEvents/");
        self.image_base_url = format!("{root}/flaredata/");
        self
    }

    /// Directory holding cached map files
    pub fn cache_dir(&self) -> PathBuf {
        self.download_dir.join(CACHE_SUBDIR)
    }

    /// Save to JSON file
    pub fn save_to_file(&self, path: &Path) -> Result<(), std::io::Error> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, json)
    }

    /// Load from JSON file
    pub fn load_from_file(path: &Path) -> Result<Self, std::io::Error> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}

impl Default for HespeConfig {
    fn default() -> Self {
        Self::from_env().unwrap_or_else(|_| Self::with_download_dir(PathBuf::from("sunpy_data")))
    }
}
