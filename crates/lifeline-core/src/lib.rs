//! Lifeline Core
//!
//! Start-up wiring for the contact store: resolve the data directory, carry
//! over legacy data once, then hand out the single directory instance that
//! the UI layer drives.

mod config;
mod error;
mod lifeline;

pub use config::Config;
pub use error::CoreError;
pub use lifeline::Lifeline;

pub use lifeline_directory::{BulkImport, Commit, ContactDirectory, DirectoryError, Slot};
pub use lifeline_records::{
    query, Category, Collection, Contact, ContactDraft, RecordError, SearchHit,
};
pub use lifeline_storage::{
    FileStat, FileStats, MigrationOutcome, Preferences, RecordFile, StorageError,
};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).init();
}
