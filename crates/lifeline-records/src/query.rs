//! Read-only views over a collection

use serde::Serialize;

use crate::collection::Collection;
use crate::contact::Contact;

/// A matching contact together with the name of the category holding it
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SearchHit<'a> {
    pub contact: &'a Contact,
    pub category: &'a str,
}

fn contains_folded(field: Option<&str>, needle: &str) -> bool {
    field.is_some_and(|value| value.to_lowercase().contains(needle))
}

/// Substring search over name, organization and role (case-insensitive) and
/// phone (exact). Results come back in collection order.
///
/// The query is used as given: an empty query matches every contact and
/// surrounding whitespace is part of the needle.
pub fn search<'a>(collection: &'a Collection, query: &str) -> Vec<SearchHit<'a>> {
    let folded = query.to_lowercase();

    collection
        .contacts()
        .filter(|(_, contact)| {
            contact.name.to_lowercase().contains(&folded)
                || contact.phone.contains(query)
                || contains_folded(contact.organization.as_deref(), &folded)
                || contains_folded(contact.role.as_deref(), &folded)
        })
        .map(|(category, contact)| SearchHit {
            contact,
            category: &category.name,
        })
        .collect()
}

/// Most recently used contacts first, at most `limit` of them.
///
/// Contacts never used sort last; ties keep scan order.
pub fn frequently_used(collection: &Collection, limit: usize) -> Vec<&Contact> {
    let mut contacts: Vec<&Contact> = collection.contacts().map(|(_, c)| c).collect();
    contacts.sort_by(|a, b| b.last_used.cmp(&a.last_used));
    contacts.truncate(limit);
    contacts
}

pub fn favorites(collection: &Collection) -> Vec<SearchHit<'_>> {
    collection
        .contacts()
        .filter(|(_, contact)| contact.favorite)
        .map(|(category, contact)| SearchHit {
            contact,
            category: &category.name,
        })
        .collect()
}
