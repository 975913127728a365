//! The collection: every category in display order. This is the unit that
//! gets persisted.

use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::contact::Contact;

pub const SYSTEM_CATEGORY_NAME: &str = "Emergency";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Collection {
    categories: Vec<Category>,
}

impl Collection {
    pub fn new(categories: Vec<Category>) -> Self {
        Self { categories }
    }

    /// Default category list for new installs
    pub fn seed() -> Self {
        Self::new(vec![
            Category::system(SYSTEM_CATEGORY_NAME),
            Category::new("Harbor & Marina"),
            Category::new("Crew & Family"),
            Category::new("Services"),
        ])
    }

    /// A collection with no categories is treated as damaged
    pub fn is_valid(&self) -> bool {
        !self.categories.is_empty()
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn categories_mut(&mut self) -> &mut Vec<Category> {
        &mut self.categories
    }

    pub fn get(&self, index: usize) -> Option<&Category> {
        self.categories.get(index)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn into_categories(self) -> Vec<Category> {
        self.categories
    }

    /// Index of the first category with exactly this name
    pub fn category_index(&self, name: &str) -> Option<usize> {
        self.categories.iter().position(|c| c.name == name)
    }

    pub fn system_index(&self) -> Option<usize> {
        self.categories.iter().position(|c| c.system)
    }

    pub fn contact_count(&self) -> usize {
        self.categories.iter().map(Category::len).sum()
    }

    /// Locate a contact by id, scanning categories in order
    pub fn find_contact(&self, id: &str) -> Option<(usize, usize)> {
        self.categories.iter().enumerate().find_map(|(ci, category)| {
            category
                .contacts
                .iter()
                .position(|c| c.id == id)
                .map(|row| (ci, row))
        })
    }

    /// Every contact in scan order: category order, then row order
    pub fn contacts(&self) -> impl Iterator<Item = (&Category, &Contact)> {
        self.categories
            .iter()
            .flat_map(|category| category.contacts.iter().map(move |c| (category, c)))
    }

    /// Restore the single-system-category invariant on data of unknown
    /// provenance. Returns true if anything changed.
    ///
    /// With no system category, a category named "Emergency" is promoted, or
    /// a new empty one is inserted first. With several, only the first keeps
    /// the flag.
    pub fn ensure_system_category(&mut self) -> bool {
        let flagged: Vec<usize> = self
            .categories
            .iter()
            .enumerate()
            .filter(|(_, c)| c.system)
            .map(|(i, _)| i)
            .collect();

        match flagged.as_slice() {
            [_] => false,
            [] => {
                if let Some(index) = self.category_index(SYSTEM_CATEGORY_NAME) {
                    self.categories[index].system = true;
                } else {
                    self.categories
                        .insert(0, Category::system(SYSTEM_CATEGORY_NAME));
                }
                true
            }
            [_, rest @ ..] => {
                for &index in rest {
                    self.categories[index].system = false;
                }
                true
            }
        }
    }
}
