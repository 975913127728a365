//! One-shot migration from the legacy preference store
//!
//! Safe to call on every startup: once the record file exists it does
//! nothing.

use serde::Serialize;

use lifeline_records::Collection;

use crate::preferences::Preferences;
use crate::record_file::RecordFile;
use crate::Result;

/// Preference key under which older releases stored the collection
pub const LEGACY_CONTACTS_KEY: &str = "contact_categories";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MigrationOutcome {
    /// The record file already exists
    AlreadyMigrated,
    /// No legacy value to carry over
    NothingToMigrate,
    /// The legacy store or its value could not be used; it is left in place
    Unreadable { reason: String },
    Migrated { categories: usize, contacts: usize },
}

pub fn migrate_legacy(records: &RecordFile, prefs: &Preferences) -> Result<MigrationOutcome> {
    if records.primary_exists() {
        return Ok(MigrationOutcome::AlreadyMigrated);
    }

    let Some(raw) = prefs.get(LEGACY_CONTACTS_KEY)? else {
        tracing::debug!("No legacy contacts to migrate");
        return Ok(MigrationOutcome::NothingToMigrate);
    };

    let mut collection: Collection = match serde_json::from_str(&raw) {
        Ok(collection) => collection,
        Err(e) => {
            tracing::warn!(error = %e, "Legacy contacts could not be parsed, leaving them in place");
            return Ok(MigrationOutcome::Unreadable {
                reason: e.to_string(),
            });
        }
    };
    if !collection.is_valid() {
        tracing::warn!("Legacy contacts hold no categories, leaving them in place");
        return Ok(MigrationOutcome::Unreadable {
            reason: "no categories".to_string(),
        });
    }

    if collection.ensure_system_category() {
        tracing::info!("Repaired system category in legacy contacts");
    }

    // The legacy value is only dropped once the record file is written
    records.save(&collection)?;
    prefs.remove(LEGACY_CONTACTS_KEY)?;

    let outcome = MigrationOutcome::Migrated {
        categories: collection.len(),
        contacts: collection.contact_count(),
    };
    tracing::info!(
        categories = collection.len(),
        contacts = collection.contact_count(),
        path = %records.primary_path().display(),
        "Migrated legacy contacts"
    );

    Ok(outcome)
}
