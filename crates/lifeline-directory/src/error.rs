//! Directory error types
//!
//! Each variant is a refused mutation; the collection is left unchanged.

use lifeline_records::RecordError;
use thiserror::Error;

fn plural(count: &usize, noun: &str) -> String {
    if *count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("Category index {index} out of range ({len} categories)")]
    CategoryOutOfRange { index: usize, len: usize },

    #[error("Contact row {row} out of range in category {category} ({len} contacts)")]
    ContactOutOfRange {
        category: usize,
        row: usize,
        len: usize,
    },

    #[error("The {0} category is protected")]
    SystemCategory(String),

    #[error("Cannot move a category into the position of the {0} category")]
    SystemSlot(String),

    #[error("\"{name}\" contains {}. Delete it anyway?", plural(.contacts, "contact"))]
    ConfirmationRequired { name: String, contacts: usize },

    #[error("Category name cannot be empty")]
    EmptyCategoryName,

    #[error("Invalid contact: {0}")]
    InvalidContact(#[from] RecordError),

    #[error("Contact not found: {0}")]
    ContactNotFound(String),

    #[error("Storage error: {0}")]
    Storage(#[from] lifeline_storage::StorageError),
}
