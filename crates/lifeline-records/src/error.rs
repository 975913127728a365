//! Record error types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("Contact name cannot be empty")]
    EmptyName,

    #[error("Contact phone cannot be empty")]
    EmptyPhone,
}
