//! Store configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::CoreError;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// App-private data directory
    pub data_dir: PathBuf,
    /// Directory holding the record file, its backup and manual backups
    pub records_dir: PathBuf,
    /// SQLite preference store used by older releases
    pub legacy_store_path: PathBuf,
}

impl Config {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            records_dir: data_dir.join("records"),
            legacy_store_path: data_dir.join("preferences.db"),
            data_dir,
        }
    }

    pub fn data_dir() -> PathBuf {
        platform_data_dir()
            .map(|d| d.join("Lifeline"))
            .unwrap_or_else(|| PathBuf::from(".lifeline"))
    }

    /// Read a JSON config file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| CoreError::Config(format!("{}: {e}", path.display())))?;
        let config: Self = serde_json::from_str(&raw)
            .map_err(|e| CoreError::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.records_dir.as_os_str().is_empty() {
            return Err(CoreError::Config("records_dir is empty".to_string()));
        }
        if self.legacy_store_path.as_os_str().is_empty() {
            return Err(CoreError::Config("legacy_store_path is empty".to_string()));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Self::data_dir())
    }
}

// Where each platform keeps per-user application data, as
// (environment variable, path below it) in order of preference
#[cfg(target_os = "windows")]
const DATA_DIR_CANDIDATES: &[(&str, &str)] = &[("LOCALAPPDATA", ""), ("APPDATA", "")];
#[cfg(target_os = "macos")]
const DATA_DIR_CANDIDATES: &[(&str, &str)] = &[("HOME", "Library/Application Support")];
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
const DATA_DIR_CANDIDATES: &[(&str, &str)] = &[("XDG_DATA_HOME", ""), ("HOME", ".local/share")];

fn platform_data_dir() -> Option<PathBuf> {
    DATA_DIR_CANDIDATES.iter().find_map(|(var, below)| {
        let base = std::env::var_os(var).filter(|v| !v.is_empty())?;
        Some(PathBuf::from(base).join(below))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_derive_from_data_dir() {
        let config = Config::new(PathBuf::from("/data/lifeline"));
        assert_eq!(config.records_dir, PathBuf::from("/data/lifeline/records"));
        assert_eq!(
            config.legacy_store_path,
            PathBuf::from("/data/lifeline/preferences.db")
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_data_dir() {
        let data_dir = Config::data_dir();
        if platform_data_dir().is_some() {
            assert_eq!(data_dir.file_name().unwrap(), "Lifeline");
        } else {
            assert_eq!(data_dir, PathBuf::from(".lifeline"));
        }
        assert_eq!(Config::default(), Config::new(data_dir));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lifeline.json");
        let config = Config::new(dir.path().to_path_buf());
        std::fs::write(&path, serde_json::to_string(&config).unwrap()).unwrap();

        assert_eq!(Config::from_file(&path).unwrap(), config);

        std::fs::write(&path, r#"{"data_dir": "/x", "records_dir": "", "legacy_store_path": "/x/p.db"}"#)
            .unwrap();
        assert!(matches!(Config::from_file(&path), Err(CoreError::Config(_))));
        assert!(matches!(
            Config::from_file(dir.path().join("missing.json")),
            Err(CoreError::Config(_))
        ));
    }
}
