//! Atomic file replacement
//!
//! Content goes to a sibling temp file, is synced to disk, then renamed over
//! the target. Readers see either the old file or the new one, never a torn
//! write.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::Result;

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("records"));
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write `content` to `path` atomically, creating parent directories.
///
/// If any step fails, the original file (if any) remains untouched.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let temp = temp_path(path);
    let written = (|| -> std::io::Result<()> {
        let file = File::create(&temp)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(content)?;
        writer.flush()?;
        writer.get_ref().sync_all()
    })();

    if let Err(e) = written {
        let _ = fs::remove_file(&temp);
        return Err(e.into());
    }

    fs::rename(&temp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atomic_write_replaces_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("contacts.json");

        atomic_write(&path, b"first").unwrap();
        atomic_write(&path, b"second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn test_temp_path_is_sibling() {
        let path = Path::new("/data/contacts.json");
        assert_eq!(temp_path(path), PathBuf::from("/data/contacts.json.tmp"));
    }
}
