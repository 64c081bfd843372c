//! Catalog entry types.
//!
//! A [`CatalogEntry`] is what the application renders; a [`CatalogRecord`]
//! is the document body stored in the external collection. The split
//! matters because the entry's identifier is the document's stable key,
//! assigned by the store — it is never part of the body, and any id a body
//! happens to carry is ignored on read.

use serde::{Deserialize, Serialize};

use crate::types::id::EntryId;

/// A catalog entry as rendered by the application.
///
/// All display fields are plain strings. `price` carries no currency or
/// precision contract and `image_url` is not resolved or validated here;
/// both are presented as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Stable identifier assigned by the external store at creation.
    pub id: EntryId,
    /// Display name.
    pub name: String,
    /// Display category.
    pub category: String,
    /// Display price, uninterpreted.
    pub price: String,
    /// URL-like reference to the entry's image, unvalidated.
    pub image_url: String,
}

/// The document body for a catalog entry.
///
/// Reads are lenient: fields missing from the stored document decode to
/// empty strings, matching what hand-written or partially migrated
/// documents look like in practice. Unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRecord {
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Display category.
    #[serde(default)]
    pub category: String,
    /// Display price, uninterpreted.
    #[serde(default)]
    pub price: String,
    /// URL-like reference to the entry's image.
    #[serde(default)]
    pub image_url: String,
}

impl CatalogRecord {
    /// Attach a store-assigned key to this record, producing the entry the
    /// application works with.
    #[must_use]
    pub fn into_entry(self, id: EntryId) -> CatalogEntry {
        CatalogEntry {
            id,
            name: self.name,
            category: self.category,
            price: self.price,
            image_url: self.image_url,
        }
    }
}

impl From<&CatalogEntry> for CatalogRecord {
    fn from(entry: &CatalogEntry) -> Self {
        Self {
            name: entry.name.clone(),
            category: entry.category.clone(),
            price: entry.price.clone(),
            image_url: entry.image_url.clone(),
        }
    }
}
