//! Outcomes of accepted mutations

use serde::{Deserialize, Serialize};

/// What happened to an accepted mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Commit {
    /// Applied and written to disk
    Saved,
    /// Applied in memory; the write failed and will be retried by the next
    /// successful save
    Unsaved { warning: String },
    /// Valid request that needed no change
    Unchanged,
}

impl Commit {
    pub fn is_saved(&self) -> bool {
        matches!(self, Commit::Saved)
    }

    /// The warning to surface to the user, if any
    pub fn warning(&self) -> Option<&str> {
        match self {
            Commit::Unsaved { warning } => Some(warning),
            _ => None,
        }
    }
}

/// A contact position: category index and row within it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Slot {
    pub category: usize,
    pub row: usize,
}

impl Slot {
    pub fn new(category: usize, row: usize) -> Self {
        Self { category, row }
    }
}

/// Result of adding a batch of imported contacts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkImport {
    /// Index of the category that received the contacts; `None` when no
    /// draft was valid and the named category does not exist, so none was
    /// created
    pub category: Option<usize>,
    pub created_category: bool,
    pub added: usize,
    /// Drafts dropped for missing name or phone
    pub skipped: usize,
    pub commit: Commit,
}
