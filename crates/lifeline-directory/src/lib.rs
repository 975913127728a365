//! Lifeline Contact Directory
//!
//! The single store object the UI talks to:
//! - Owns the in-memory collection and the record file behind it
//! - Every accepted mutation is saved before returning
//! - Refused mutations come back as typed errors and change nothing
//! - The protected "Emergency" category cannot be deleted, renamed or moved

mod commit;
mod directory;
mod error;

pub use commit::{BulkImport, Commit, Slot};
pub use directory::ContactDirectory;
pub use error::DirectoryError;

pub type Result<T> = std::result::Result<T, DirectoryError>;
