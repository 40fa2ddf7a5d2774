//! Runtime configuration. Grounded on the teacher's `src/config/mod.rs`
//! (TOML-backed, `Default`, `load`/`save`), trimmed to the knobs this engine
//! actually has: where databases live, what the catalog file is named, the
//! logging setup, and, when the `server` feature is enabled, the HTTP bind
//! address.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{DBError, IoError};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Directory holding every database's `<base>_nodes.json` /
    /// `<base>_indexes.json` pair and the catalog file.
    pub storage_dir: String,
    /// Catalog file name, relative to `storage_dir`.
    pub registry_file: String,
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    /// Bind address for `graphdb-server` (only used when built with the
    /// `server` feature).
    pub http_bind: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_dir: "data".to_string(),
            registry_file: "registry.json".to_string(),
            log_level: "info".to_string(),
            log_dir: "logs".to_string(),
            log_file: "graphdb".to_string(),
            http_bind: "127.0.0.1:8080".to_string(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DBError> {
        let path_str = path.as_ref().to_string_lossy().into_owned();
        let content = fs::read_to_string(&path)
            .map_err(|source| IoError::Read { path: path_str.clone(), source })?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            DBError::from(IoError::Read {
                path: path_str,
                source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
            })
        })?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), DBError> {
        let path_str = path.as_ref().to_string_lossy().into_owned();
        let content = toml::to_string_pretty(self).expect("Config always serializes");
        fs::write(&path, content).map_err(|source| IoError::Write { path: path_str, source })?;
        Ok(())
    }

    pub fn registry_path(&self) -> PathBuf {
        Path::new(&self.storage_dir).join(&self.registry_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn default_config_has_sane_bind_address() {
        let config = Config::default();
        assert_eq!(config.http_bind, "127.0.0.1:8080");
    }

    #[test]
    fn load_save_round_trip() {
        let temp = NamedTempFile::new().unwrap();
        let config = Config::default();
        config.save(temp.path()).unwrap();
        let loaded = Config::load(temp.path()).unwrap();
        assert_eq!(loaded.storage_dir, config.storage_dir);
        assert_eq!(loaded.registry_file, config.registry_file);
    }

    #[test]
    fn registry_path_joins_storage_dir() {
        let config = Config::default();
        assert_eq!(config.registry_path(), PathBuf::from("data/registry.json"));
    }
}
