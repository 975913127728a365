//! Lifeline Storage Layer
//!
//! The record file engine keeps the collection in a pretty-printed JSON file
//! with one rotating backup, atomic replacement and read-back verification.
//! Loading never fails: primary, then backup, then the default seed.
//!
//! Older installs kept the collection as a single value in a SQLite
//! preference store; `migrate_legacy` moves it over once.

mod atomic;
mod error;
mod legacy;
mod migrations;
mod preferences;
mod record_file;

pub use error::StorageError;
pub use legacy::{migrate_legacy, MigrationOutcome, LEGACY_CONTACTS_KEY};
pub use preferences::Preferences;
pub use record_file::{FileStat, FileStats, RecordFile, SaveReport};

pub type Result<T> = std::result::Result<T, StorageError>;
