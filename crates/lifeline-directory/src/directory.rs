//! Contact Directory
//!
//! Owns the collection. Every method that changes it validates first, edits
//! in memory, then saves the whole collection once. A failed save is
//! reported, not fatal: memory stays authoritative and the next successful
//! save catches the file up.

use chrono::Local;
use std::path::{Path, PathBuf};

use lifeline_records::{query, Category, Collection, Contact, ContactDraft, SearchHit};
use lifeline_storage::{FileStats, RecordFile};

use crate::commit::{BulkImport, Commit, Slot};
use crate::error::DirectoryError;
use crate::Result;

pub struct ContactDirectory {
    records: RecordFile,
    collection: Collection,
}

impl ContactDirectory {
    /// Load the collection from `records` (never fails, see
    /// [`RecordFile::load`])
    pub fn open(records: RecordFile) -> Self {
        let collection = records.load();

        tracing::info!(
            categories = collection.len(),
            contacts = collection.contact_count(),
            "Opened contact directory"
        );

        Self {
            records,
            collection,
        }
    }

    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    pub fn categories(&self) -> &[Category] {
        self.collection.categories()
    }

    pub fn contact(&self, slot: Slot) -> Option<&Contact> {
        self.collection
            .get(slot.category)
            .and_then(|c| c.contacts.get(slot.row))
    }

    pub fn records(&self) -> &RecordFile {
        &self.records
    }

    fn persist(&self) -> Commit {
        match self.records.save(&self.collection) {
            Ok(_) => Commit::Saved,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to save contacts, keeping changes in memory");
                Commit::Unsaved {
                    warning: e.to_string(),
                }
            }
        }
    }

    fn check_category(&self, index: usize) -> Result<()> {
        let len = self.collection.len();
        if index >= len {
            tracing::warn!(index, len, "Category index out of range");
            return Err(DirectoryError::CategoryOutOfRange { index, len });
        }
        Ok(())
    }

    /// `allow_end` accepts `row == len`, meaning append
    fn check_row(&self, category: usize, row: usize, allow_end: bool) -> Result<()> {
        self.check_category(category)?;
        let len = self.collection.categories()[category].len();
        if row > len || (row == len && !allow_end) {
            tracing::warn!(category, row, len, "Contact row out of range");
            return Err(DirectoryError::ContactOutOfRange { category, row, len });
        }
        Ok(())
    }

    fn reject_system(&self, index: usize) -> Result<()> {
        let category = &self.collection.categories()[index];
        if category.system {
            tracing::info!(category = %category.name, "Refused change to protected category");
            return Err(DirectoryError::SystemCategory(category.name.clone()));
        }
        Ok(())
    }

    // === Categories ===

    pub fn add_category(&mut self, name: &str) -> Result<Commit> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DirectoryError::EmptyCategoryName);
        }

        self.collection.categories_mut().push(Category::new(name));
        tracing::info!(category = %name, "Added category");

        Ok(self.persist())
    }

    pub fn rename_category(&mut self, index: usize, name: &str) -> Result<Commit> {
        self.check_category(index)?;
        self.reject_system(index)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(DirectoryError::EmptyCategoryName);
        }

        let category = &mut self.collection.categories_mut()[index];
        if category.name == name {
            return Ok(Commit::Unchanged);
        }
        category.name = name.to_string();

        Ok(self.persist())
    }

    /// Delete an empty category. A non-empty one needs
    /// [`force_delete_category`](Self::force_delete_category).
    pub fn delete_category(&mut self, index: usize) -> Result<Commit> {
        self.check_category(index)?;
        self.reject_system(index)?;

        let category = &self.collection.categories()[index];
        if !category.is_empty() {
            return Err(DirectoryError::ConfirmationRequired {
                name: category.name.clone(),
                contacts: category.len(),
            });
        }

        self.remove_category(index)
    }

    /// Delete a category along with its contacts
    pub fn force_delete_category(&mut self, index: usize) -> Result<Commit> {
        self.check_category(index)?;
        self.reject_system(index)?;
        self.remove_category(index)
    }

    fn remove_category(&mut self, index: usize) -> Result<Commit> {
        let removed = self.collection.categories_mut().remove(index);
        tracing::info!(
            category = %removed.name,
            contacts = removed.len(),
            "Deleted category"
        );
        Ok(self.persist())
    }

    /// Reorder categories: remove at `from`, insert at `to`.
    ///
    /// The system category never moves: it cannot be the source, the
    /// destination, or be stepped over by the move.
    pub fn move_category(&mut self, from: usize, to: usize) -> Result<Commit> {
        self.check_category(from)?;
        self.check_category(to)?;
        self.reject_system(from)?;

        if let Some(system) = self.collection.system_index() {
            let crosses = (from < system && to >= system) || (from > system && to <= system);
            if crosses {
                let name = self.collection.categories()[system].name.clone();
                tracing::info!(from, to, "Refused category move over protected category");
                return Err(DirectoryError::SystemSlot(name));
            }
        }

        if from == to {
            return Ok(Commit::Unchanged);
        }

        let categories = self.collection.categories_mut();
        let category = categories.remove(from);
        categories.insert(to, category);

        Ok(self.persist())
    }

    // === Contacts ===

    /// Create a contact from `draft` at the end of a category
    pub fn add_contact(
        &mut self,
        category: usize,
        draft: ContactDraft,
    ) -> Result<(Contact, Commit)> {
        self.check_category(category)?;
        let contact = Contact::from_draft(draft)?;

        self.collection.categories_mut()[category]
            .contacts
            .push(contact.clone());
        tracing::debug!(contact_id = %contact.id, category, "Added contact");

        Ok((contact, self.persist()))
    }

    pub fn update_contact(
        &mut self,
        category: usize,
        row: usize,
        draft: ContactDraft,
    ) -> Result<Commit> {
        self.check_row(category, row, false)?;

        let contact = &mut self.collection.categories_mut()[category].contacts[row];
        if contact.to_draft() == draft {
            return Ok(Commit::Unchanged);
        }
        contact.apply(draft)?;

        Ok(self.persist())
    }

    pub fn delete_contact(&mut self, category: usize, row: usize) -> Result<Commit> {
        self.check_row(category, row, false)?;

        let removed = self.collection.categories_mut()[category]
            .contacts
            .remove(row);
        tracing::debug!(contact_id = %removed.id, category, row, "Deleted contact");

        Ok(self.persist())
    }

    pub fn toggle_favorite(&mut self, category: usize, row: usize) -> Result<Commit> {
        self.check_row(category, row, false)?;

        let contact = &mut self.collection.categories_mut()[category].contacts[row];
        contact.favorite = !contact.favorite;

        Ok(self.persist())
    }

    /// Move a contact between positions, possibly across categories.
    ///
    /// `to.row` may equal the destination length (append). Within one
    /// category, a later destination row is taken as the row *before* the
    /// removal, as drag-and-drop reports it.
    pub fn move_contact(&mut self, from: Slot, to: Slot) -> Result<Commit> {
        self.check_row(from.category, from.row, false)?;
        self.check_row(to.category, to.row, true)?;

        if from == to {
            return Ok(Commit::Unchanged);
        }

        let same_category = from.category == to.category;
        let mut row = to.row;
        if same_category && row > from.row {
            row -= 1;
        }
        if same_category && row == from.row {
            return Ok(Commit::Unchanged);
        }

        let categories = self.collection.categories_mut();
        let contact = categories[from.category].contacts.remove(from.row);
        let target = &mut categories[to.category].contacts;
        let row = row.min(target.len());
        tracing::debug!(
            contact_id = %contact.id,
            from_category = from.category,
            from_row = from.row,
            to_category = to.category,
            to_row = row,
            "Moved contact"
        );
        target.insert(row, contact);

        Ok(self.persist())
    }

    /// Add imported contacts to the category called `name`, creating it if
    /// needed. Without a name, a new timestamp-named category is used.
    ///
    /// Drafts missing a name or phone are skipped.
    pub fn add_contacts_to_category(
        &mut self,
        name: Option<&str>,
        drafts: Vec<ContactDraft>,
    ) -> Result<BulkImport> {
        let total = drafts.len();
        let contacts: Vec<Contact> = drafts
            .into_iter()
            .filter_map(|draft| Contact::from_draft(draft).ok())
            .collect();
        let added = contacts.len();
        let skipped = total - added;
        if skipped > 0 {
            tracing::warn!(skipped, "Skipped imported contacts without name or phone");
        }

        let name = match name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => name.to_string(),
            None => format!("Imported {}", Local::now().format("%Y-%m-%d %H:%M")),
        };
        let existing = self.collection.category_index(&name);

        if added == 0 {
            return Ok(BulkImport {
                category: existing,
                created_category: false,
                added,
                skipped,
                commit: Commit::Unchanged,
            });
        }

        let categories = self.collection.categories_mut();
        let (index, created_category) = match existing {
            Some(index) => {
                categories[index].contacts.extend(contacts);
                (index, false)
            }
            None => {
                categories.push(Category::new(name.as_str()).with_contacts(contacts));
                (categories.len() - 1, true)
            }
        };
        tracing::info!(category = %name, added, created_category, "Imported contacts");

        Ok(BulkImport {
            category: Some(index),
            created_category,
            added,
            skipped,
            commit: self.persist(),
        })
    }

    /// Stamp the first contact with this id as just used
    pub fn update_last_used(&mut self, contact_id: &str) -> Result<Commit> {
        let (category, row) = self
            .collection
            .find_contact(contact_id)
            .ok_or_else(|| DirectoryError::ContactNotFound(contact_id.to_string()))?;

        self.collection.categories_mut()[category].contacts[row].touch();

        Ok(self.persist())
    }

    // === Queries ===

    pub fn search(&self, query: &str) -> Vec<SearchHit<'_>> {
        query::search(&self.collection, query)
    }

    pub fn frequently_used(&self, limit: usize) -> Vec<&Contact> {
        query::frequently_used(&self.collection, limit)
    }

    pub fn favorites(&self) -> Vec<SearchHit<'_>> {
        query::favorites(&self.collection)
    }

    // === Files ===

    /// Throw away in-memory state and load from disk again
    pub fn reload(&mut self) {
        self.collection = self.records.load();
    }

    pub fn manual_backup(&self) -> Result<PathBuf> {
        Ok(self.records.manual_backup()?)
    }

    pub fn list_manual_backups(&self) -> Result<Vec<PathBuf>> {
        Ok(self.records.list_manual_backups()?)
    }

    /// Replace the collection with the contents of a backup file
    pub fn restore_backup(&mut self, path: &Path) -> Result<Commit> {
        let mut collection = RecordFile::read_collection(path)?;
        collection.ensure_system_category();

        tracing::info!(
            path = %path.display(),
            categories = collection.len(),
            contacts = collection.contact_count(),
            "Restoring contacts from backup"
        );
        self.collection = collection;

        Ok(self.persist())
    }

    pub fn file_stats(&self) -> FileStats {
        self.records.file_stats()
    }
}
