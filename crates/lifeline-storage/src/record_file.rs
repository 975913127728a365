//! Record file engine
//!
//! Layout inside the data directory:
//! - `contacts.json`: primary record file
//! - `contacts.backup.json`: previous good generation of the primary
//! - `backups/`: manual, timestamped copies
//!
//! Every save rotates the current primary into the backup slot (if it is
//! still readable), replaces the primary atomically, then reads it back.

use chrono::Utc;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use lifeline_records::Collection;

use crate::atomic::atomic_write;
use crate::error::StorageError;
use crate::Result;

const PRIMARY_FILE: &str = "contacts.json";
const BACKUP_FILE: &str = "contacts.backup.json";
const MANUAL_BACKUP_DIR: &str = "backups";
const MANUAL_BACKUP_PREFIX: &str = "contacts-";

/// Outcome of a successful write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SaveReport {
    pub bytes_written: u64,
    /// Whether the previous primary was copied into the backup slot
    pub backup_rotated: bool,
    /// Whether the file read back equal to what was written
    pub verified: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FileStat {
    pub exists: bool,
    pub size_bytes: u64,
}

impl FileStat {
    fn of(path: &Path) -> Self {
        match fs::metadata(path) {
            Ok(meta) if meta.is_file() => Self {
                exists: true,
                size_bytes: meta.len(),
            },
            _ => Self::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FileStats {
    pub primary: FileStat,
    pub backup: FileStat,
}

#[derive(Debug, Clone)]
pub struct RecordFile {
    primary: PathBuf,
    backup: PathBuf,
    manual_backup_dir: PathBuf,
}

impl RecordFile {
    pub fn new(primary: PathBuf, backup: PathBuf, manual_backup_dir: PathBuf) -> Self {
        Self {
            primary,
            backup,
            manual_backup_dir,
        }
    }

    /// Standard file names inside `dir`
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        Self::new(
            dir.join(PRIMARY_FILE),
            dir.join(BACKUP_FILE),
            dir.join(MANUAL_BACKUP_DIR),
        )
    }

    pub fn primary_path(&self) -> &Path {
        &self.primary
    }

    pub fn backup_path(&self) -> &Path {
        &self.backup
    }

    pub fn manual_backup_dir(&self) -> &Path {
        &self.manual_backup_dir
    }

    pub fn primary_exists(&self) -> bool {
        self.primary.is_file()
    }

    /// Parse a record file, rejecting collections with no categories
    pub fn read_collection(path: &Path) -> Result<Collection> {
        Self::read_valid(path).map(|(_, collection)| collection)
    }

    /// Raw bytes of a record file along with the valid collection they hold
    fn read_valid(path: &Path) -> Result<(Vec<u8>, Collection)> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(path.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };

        let collection: Collection = serde_json::from_slice(&bytes)?;
        if !collection.is_valid() {
            return Err(StorageError::InvalidCollection(path.to_path_buf()));
        }
        Ok((bytes, collection))
    }

    /// Load the collection. Never fails.
    ///
    /// Falls back from the primary to the backup (rewriting the primary from
    /// it) and finally to the default seed, which is persisted.
    pub fn load(&self) -> Collection {
        match Self::read_collection(&self.primary) {
            Ok(mut collection) => {
                tracing::debug!(
                    path = %self.primary.display(),
                    categories = collection.len(),
                    contacts = collection.contact_count(),
                    "Loaded record file"
                );
                if collection.ensure_system_category() {
                    tracing::warn!(path = %self.primary.display(), "Repaired system category in record file");
                    if let Err(e) = self.save(&collection) {
                        tracing::error!(error = %e, "Failed to persist repaired record file");
                    }
                }
                return collection;
            }
            Err(StorageError::NotFound(_)) => {
                tracing::info!(path = %self.primary.display(), "No record file yet");
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.primary.display(),
                    error = %e,
                    "Record file unusable, trying backup"
                );
            }
        }

        match Self::read_collection(&self.backup) {
            Ok(mut collection) => {
                collection.ensure_system_category();
                tracing::warn!(
                    path = %self.backup.display(),
                    categories = collection.len(),
                    "Recovered collection from backup"
                );
                // Straight to the primary: rotating here would overwrite the
                // good backup with the damaged primary.
                if let Err(e) = self.write_primary(&collection) {
                    tracing::error!(error = %e, "Failed to restore record file from backup");
                }
                return collection;
            }
            Err(StorageError::NotFound(_)) => {}
            Err(e) => {
                tracing::warn!(path = %self.backup.display(), error = %e, "Backup unusable");
            }
        }

        let seed = Collection::seed();
        tracing::info!(categories = seed.len(), "Creating default categories");
        if let Err(e) = self.save(&seed) {
            tracing::error!(error = %e, "Failed to persist default categories");
        }
        seed
    }

    /// Save the collection, rotating the previous primary into the backup
    /// slot first.
    ///
    /// A failed read-back check is logged and reported, not rolled back.
    pub fn save(&self, collection: &Collection) -> Result<SaveReport> {
        let backup_rotated = self.rotate_backup()?;
        let bytes_written = self.write_primary(collection)?;
        let verified = self.verify(collection);

        tracing::debug!(
            path = %self.primary.display(),
            bytes = bytes_written,
            backup_rotated,
            verified,
            "Saved record file"
        );

        Ok(SaveReport {
            bytes_written,
            backup_rotated,
            verified,
        })
    }

    /// Copy the current primary into the backup slot if it is still good.
    /// A missing or damaged primary leaves the existing backup alone.
    fn rotate_backup(&self) -> Result<bool> {
        match Self::read_valid(&self.primary) {
            Ok((bytes, _)) => {
                atomic_write(&self.backup, &bytes)?;
                Ok(true)
            }
            Err(StorageError::NotFound(_)) => Ok(false),
            Err(e) => {
                tracing::warn!(
                    path = %self.primary.display(),
                    error = %e,
                    "Not rotating damaged record file into backup"
                );
                Ok(false)
            }
        }
    }

    fn write_primary(&self, collection: &Collection) -> Result<u64> {
        let bytes = serde_json::to_vec_pretty(collection)?;
        atomic_write(&self.primary, &bytes)?;
        Ok(bytes.len() as u64)
    }

    fn verify(&self, expected: &Collection) -> bool {
        match Self::read_collection(&self.primary) {
            Ok(actual) if &actual == expected => true,
            Ok(_) => {
                tracing::error!(
                    path = %self.primary.display(),
                    "Record file read back different from what was written"
                );
                false
            }
            Err(e) => {
                tracing::error!(
                    path = %self.primary.display(),
                    error = %e,
                    "Record file failed verification after write"
                );
                false
            }
        }
    }

    /// Copy the primary to a new timestamped file in the manual backup
    /// directory, independent of the rotating backup.
    pub fn manual_backup(&self) -> Result<PathBuf> {
        if !self.primary_exists() {
            return Err(StorageError::NotFound(self.primary.clone()));
        }
        fs::create_dir_all(&self.manual_backup_dir)?;

        let stamp = Utc::now().format("%Y%m%d-%H%M%S-%3f").to_string();
        let mut target = self
            .manual_backup_dir
            .join(format!("{MANUAL_BACKUP_PREFIX}{stamp}.json"));
        let mut suffix = 1;
        while target.exists() {
            target = self
                .manual_backup_dir
                .join(format!("{MANUAL_BACKUP_PREFIX}{stamp}_{suffix}.json"));
            suffix += 1;
        }

        fs::copy(&self.primary, &target)?;
        tracing::info!(path = %target.display(), "Created manual backup");

        Ok(target)
    }

    /// Manual backups, oldest first
    pub fn list_manual_backups(&self) -> Result<Vec<PathBuf>> {
        let entries = match fs::read_dir(&self.manual_backup_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut backups = Vec::new();
        for entry in entries {
            let path = entry?.path();
            let is_backup = path.is_file()
                && path.extension().is_some_and(|ext| ext == "json")
                && path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(MANUAL_BACKUP_PREFIX));
            if is_backup {
                backups.push(path);
            }
        }
        backups.sort_by_cached_key(|path| manual_backup_order(path));

        Ok(backups)
    }

    pub fn file_stats(&self) -> FileStats {
        FileStats {
            primary: FileStat::of(&self.primary),
            backup: FileStat::of(&self.backup),
        }
    }
}

/// Sort key for a manual backup name: the timestamp, then the numeric
/// collision suffix, so `_10` follows `_9`
fn manual_backup_order(path: &Path) -> (String, u32) {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    match stem.rsplit_once('_') {
        Some((stamp, suffix)) => match suffix.parse() {
            Ok(n) => (stamp.to_string(), n),
            Err(_) => (stem.to_string(), 0),
        },
        None => (stem.to_string(), 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lifeline_records::{Category, Contact, ContactDraft};

    fn sample(name: &str) -> Collection {
        let contact = Contact::from_draft(
            ContactDraft::new(name, "555-0100")
                .with_channel("VHF 16")
                .with_call_sign("WXY123"),
        )
        .unwrap();
        Collection::new(vec![
            Category::system("Emergency"),
            Category::new("Ops").with_contacts(vec![contact]),
        ])
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let records = RecordFile::in_dir(dir.path());
        let collection = sample("Harbor Pilot");

        let report = records.save(&collection).unwrap();
        assert!(report.verified);
        assert!(!report.backup_rotated);

        assert_eq!(records.load(), collection);
    }

    #[test]
    fn test_backup_lags_one_generation() {
        let dir = tempfile::tempdir().unwrap();
        let records = RecordFile::in_dir(dir.path());
        let first = sample("First");
        let second = sample("Second");

        records.save(&first).unwrap();
        let report = records.save(&second).unwrap();
        assert!(report.backup_rotated);

        assert_eq!(RecordFile::read_collection(records.backup_path()).unwrap(), first);
        assert_eq!(RecordFile::read_collection(records.primary_path()).unwrap(), second);
    }

    #[test]
    fn test_self_heals_deleted_primary() {
        let dir = tempfile::tempdir().unwrap();
        let records = RecordFile::in_dir(dir.path());
        let first = sample("First");
        records.save(&first).unwrap();
        records.save(&sample("Second")).unwrap();

        fs::remove_file(records.primary_path()).unwrap();

        assert_eq!(records.load(), first);
        assert_eq!(RecordFile::read_collection(records.primary_path()).unwrap(), first);
    }

    #[test]
    fn test_self_heals_corrupt_primary() {
        let dir = tempfile::tempdir().unwrap();
        let records = RecordFile::in_dir(dir.path());
        let first = sample("First");
        records.save(&first).unwrap();
        records.save(&sample("Second")).unwrap();

        fs::write(records.primary_path(), b"{ truncated").unwrap();
        assert_eq!(records.load(), first);
        assert_eq!(RecordFile::read_collection(records.primary_path()).unwrap(), first);

        // An empty array counts as damaged too
        fs::write(records.primary_path(), b"[]").unwrap();
        assert_eq!(records.load(), first);
    }

    #[test]
    fn test_defaults_when_nothing_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let records = RecordFile::in_dir(dir.path());

        let collection = records.load();
        assert!(!collection.is_empty());
        assert_eq!(collection.categories().iter().filter(|c| c.system).count(), 1);

        // Defaults are persisted
        assert_eq!(RecordFile::read_collection(records.primary_path()).unwrap(), collection);
    }

    #[test]
    fn test_damaged_primary_not_rotated_over_backup() {
        let dir = tempfile::tempdir().unwrap();
        let records = RecordFile::in_dir(dir.path());
        let first = sample("First");
        records.save(&first).unwrap();
        records.save(&sample("Second")).unwrap();

        fs::write(records.primary_path(), b"garbage").unwrap();
        let report = records.save(&sample("Third")).unwrap();

        assert!(!report.backup_rotated);
        assert_eq!(RecordFile::read_collection(records.backup_path()).unwrap(), first);
    }

    #[test]
    fn test_save_reports_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, b"").unwrap();
        let records = RecordFile::in_dir(&blocker);

        assert!(records.save(&sample("First")).is_err());
    }

    #[test]
    fn test_manual_backups_are_unique() {
        let dir = tempfile::tempdir().unwrap();
        let records = RecordFile::in_dir(dir.path());
        assert!(matches!(
            records.manual_backup(),
            Err(StorageError::NotFound(_))
        ));

        records.save(&sample("First")).unwrap();
        let a = records.manual_backup().unwrap();
        let b = records.manual_backup().unwrap();
        assert_ne!(a, b);

        let listed = records.list_manual_backups().unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed.contains(&a) && listed.contains(&b));
        assert_eq!(
            RecordFile::read_collection(&a).unwrap(),
            RecordFile::read_collection(records.primary_path()).unwrap()
        );
    }

    #[test]
    fn test_manual_backups_sorted_by_collision_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let records = RecordFile::in_dir(dir.path());
        let backups = dir.path().join(MANUAL_BACKUP_DIR);
        fs::create_dir_all(&backups).unwrap();

        let names = [
            "contacts-20260101-120000-500_10.json",
            "contacts-20260101-120000-501.json",
            "contacts-20260101-120000-500_2.json",
            "contacts-20260101-120000-500.json",
            "contacts-20260101-120000-500_1.json",
            "notes.json",
        ];
        for name in names {
            fs::write(backups.join(name), b"[]").unwrap();
        }

        let listed: Vec<String> = records
            .list_manual_backups()
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            listed,
            vec![
                "contacts-20260101-120000-500.json",
                "contacts-20260101-120000-500_1.json",
                "contacts-20260101-120000-500_2.json",
                "contacts-20260101-120000-500_10.json",
                "contacts-20260101-120000-501.json",
            ]
        );
    }

    #[test]
    fn test_load_repairs_missing_system_category() {
        let dir = tempfile::tempdir().unwrap();
        let records = RecordFile::in_dir(dir.path());
        fs::write(
            records.primary_path(),
            br#"[{"name": "Crew", "contacts": [{"name": "Skipper", "phone": "555-0100"}]}]"#,
        )
        .unwrap();

        let collection = records.load();
        assert_eq!(collection.system_index(), Some(0));
        assert_eq!(collection.categories()[1].name, "Crew");
        // The repair is written back
        let on_disk = RecordFile::read_collection(records.primary_path()).unwrap();
        assert_eq!(on_disk, collection);

        // Same on the backup path
        fs::remove_file(records.primary_path()).unwrap();
        fs::write(
            records.backup_path(),
            br#"[{"name": "Crew", "contacts": []}]"#,
        )
        .unwrap();
        assert_eq!(records.load().system_index(), Some(0));
        assert_eq!(
            RecordFile::read_collection(records.primary_path())
                .unwrap()
                .system_index(),
            Some(0)
        );
    }

    #[test]
    fn test_file_stats() {
        let dir = tempfile::tempdir().unwrap();
        let records = RecordFile::in_dir(dir.path());

        let stats = records.file_stats();
        assert!(!stats.primary.exists);
        assert!(!stats.backup.exists);

        records.save(&sample("First")).unwrap();
        records.save(&sample("Second")).unwrap();

        let stats = records.file_stats();
        assert!(stats.primary.exists);
        assert!(stats.backup.exists);
        assert_eq!(
            stats.primary.size_bytes,
            fs::metadata(records.primary_path()).unwrap().len()
        );
    }
}
