//! Lifeline Records
//!
//! The two-level record model: an ordered collection of categories, each
//! holding an ordered list of contacts. Exactly one category is the
//! protected system category ("Emergency").
//!
//! Query views live here too since they only need the model.

mod category;
mod collection;
mod contact;
mod error;
pub mod query;

pub use category::Category;
pub use collection::{Collection, SYSTEM_CATEGORY_NAME};
pub use contact::{Contact, ContactDraft};
pub use error::RecordError;
pub use query::SearchHit;

pub type Result<T> = std::result::Result<T, RecordError>;
