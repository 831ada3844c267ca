//! Vault data a query is evaluated against.

use serde::{Deserialize, Serialize};

use crate::types::{CipherView, CollectionView, FolderView, Organization};

/// Decrypted vault contents, owned by the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VaultSnapshot {
    pub items: Vec<CipherView>,
    pub folders: Vec<FolderView>,
    pub collections: Vec<CollectionView>,
    pub organizations: Vec<Organization>,
}

impl VaultSnapshot {
    /// Context over every item in the snapshot.
    pub fn context(&self) -> SearchContext<'_> {
        SearchContext {
            items: self.items.iter().collect(),
            folders: &self.folders,
            collections: &self.collections,
            organizations: &self.organizations,
        }
    }
}

/// Items still in play plus the reference lists used to resolve names.
///
/// Evaluation never changes a context; each step builds a narrower one that
/// shares the same reference lists.
#[derive(Debug, Clone)]
pub struct SearchContext<'a> {
    pub items: Vec<&'a CipherView>,
    pub folders: &'a [FolderView],
    pub collections: &'a [CollectionView],
    pub organizations: &'a [Organization],
}

impl<'a> SearchContext<'a> {
    /// Same reference lists, different items.
    pub fn narrow(&self, items: Vec<&'a CipherView>) -> Self {
        Self {
            items,
            folders: self.folders,
            collections: self.collections,
            organizations: self.organizations,
        }
    }

    /// Keeps the items `predicate` accepts, in order.
    pub fn filter(&self, predicate: impl Fn(&CipherView) -> bool) -> Self {
        let items = self
            .items
            .iter()
            .copied()
            .filter(|item| predicate(item))
            .collect();
        self.narrow(items)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Item ids in result order.
    pub fn ids(&self) -> Vec<&'a str> {
        self.items.iter().map(|item| item.id.as_str()).collect()
    }

    // Name lookups take the first entry with that exact name.

    pub fn folder_id(&self, name: &str) -> Option<&'a str> {
        self.folders
            .iter()
            .find(|folder| folder.name == name)
            .map(|folder| folder.id.as_str())
    }

    pub fn collection_id(&self, name: &str) -> Option<&'a str> {
        self.collections
            .iter()
            .find(|collection| collection.name == name)
            .map(|collection| collection.id.as_str())
    }

    pub fn organization_id(&self, name: &str) -> Option<&'a str> {
        self.organizations
            .iter()
            .find(|organization| organization.name == name)
            .map(|organization| organization.id.as_str())
    }
}
