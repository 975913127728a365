//! The store as the rest of the app sees it
//!
//! Built once at start-up and passed by reference to whoever needs it.

use std::path::Path;

use lifeline_directory::ContactDirectory;
use lifeline_storage::{migrate_legacy, MigrationOutcome, Preferences, RecordFile};

use crate::config::Config;
use crate::Result;

pub struct Lifeline {
    config: Config,
    directory: ContactDirectory,
    migration: MigrationOutcome,
}

impl Lifeline {
    /// Create directories, migrate legacy data if this is the first run on
    /// the record file, then load the directory.
    ///
    /// A damaged or unusable legacy store never blocks start-up: it is
    /// reported through [`Lifeline::migration`] and left in place.
    pub fn open(config: Config) -> Result<Self> {
        config.validate()?;
        std::fs::create_dir_all(&config.records_dir)?;

        let records = RecordFile::in_dir(&config.records_dir);
        let migration = if records.primary_exists() {
            MigrationOutcome::AlreadyMigrated
        } else if config.legacy_store_path.is_file() {
            Self::migrate_from(&records, &config.legacy_store_path)
        } else {
            MigrationOutcome::NothingToMigrate
        };

        let directory = ContactDirectory::open(records);

        tracing::info!(
            records_dir = %config.records_dir.display(),
            ?migration,
            "Contact store ready"
        );

        Ok(Self {
            config,
            directory,
            migration,
        })
    }

    fn migrate_from(records: &RecordFile, store_path: &Path) -> MigrationOutcome {
        let migrated = Preferences::open(store_path).and_then(|prefs| migrate_legacy(records, &prefs));
        match migrated {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(
                    path = %store_path.display(),
                    error = %e,
                    "Legacy preference store unusable, starting without it"
                );
                MigrationOutcome::Unreadable {
                    reason: e.to_string(),
                }
            }
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn directory(&self) -> &ContactDirectory {
        &self.directory
    }

    pub fn directory_mut(&mut self) -> &mut ContactDirectory {
        &mut self.directory
    }

    /// What start-up migration did
    pub fn migration(&self) -> &MigrationOutcome {
        &self.migration
    }

    pub fn into_directory(self) -> ContactDirectory {
        self.directory
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lifeline_directory::Slot;
    use lifeline_records::ContactDraft;
    use lifeline_storage::LEGACY_CONTACTS_KEY;

    #[test]
    fn test_fresh_install() {
        let dir = tempfile::tempdir().unwrap();
        let lifeline = Lifeline::open(Config::new(dir.path().to_path_buf())).unwrap();

        assert_eq!(lifeline.migration(), &MigrationOutcome::NothingToMigrate);
        assert_eq!(lifeline.directory().collection().system_index(), Some(0));
        assert!(lifeline.directory().file_stats().primary.exists);
        assert!(!lifeline.config().legacy_store_path.exists());
    }

    #[test]
    fn test_damaged_legacy_store_does_not_block_open() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::new(dir.path().to_path_buf());
        std::fs::write(&config.legacy_store_path, b"\x00\x01 definitely not sqlite \xff").unwrap();

        let lifeline = Lifeline::open(config.clone()).unwrap();
        assert!(matches!(
            lifeline.migration(),
            MigrationOutcome::Unreadable { .. }
        ));
        let collection = lifeline.directory().collection();
        assert_eq!(collection.system_index(), Some(0));
        assert_eq!(collection.len(), lifeline_records::Collection::seed().len());
        // Left alone for a later attempt
        assert!(config.legacy_store_path.is_file());

        // Once the record file exists the legacy store is not opened at all
        let reopened = Lifeline::open(config).unwrap();
        assert_eq!(reopened.migration(), &MigrationOutcome::AlreadyMigrated);
    }

    #[test]
    fn test_migrates_once_then_keeps_edits() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::new(dir.path().to_path_buf());
        Preferences::open(&config.legacy_store_path)
            .unwrap()
            .set(
                LEGACY_CONTACTS_KEY,
                r#"[{"name": "Emergency", "system": true, "contacts": []},
                    {"name": "Ops", "contacts": [{"name": "Harbor Pilot", "phone": "555-0100"}]}]"#,
            )
            .unwrap();

        let mut lifeline = Lifeline::open(config.clone()).unwrap();
        assert_eq!(
            lifeline.migration(),
            &MigrationOutcome::Migrated {
                categories: 2,
                contacts: 1
            }
        );
        assert_eq!(lifeline.directory().search("harbor").len(), 1);

        let directory = lifeline.directory_mut();
        directory
            .add_contact(1, ContactDraft::new("Tug Alpha", "555-0111"))
            .unwrap();

        let reopened = Lifeline::open(config).unwrap();
        assert_eq!(reopened.migration(), &MigrationOutcome::AlreadyMigrated);
        let directory = reopened.into_directory();
        assert_eq!(directory.contact(Slot::new(1, 1)).unwrap().name, "Tug Alpha");
    }
}
