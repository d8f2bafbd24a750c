//! The fixed, ordered sequence of items the rounds are played over.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::CatalogError;

/// One face to guess: the picture shown and the three answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub avatar: String,
    pub age: u32,
    #[serde(alias = "race")]
    pub category: String,
    pub gender: String,
}

/// Read-only item list shared by every room.
///
/// Cloning is a reference-count bump. Never empty.
#[derive(Debug, Clone)]
pub struct Catalog {
    items: Arc<[Item]>,
}

impl Catalog {
    /// Builds a catalog from an ordered list of items.
    pub fn new(items: Vec<Item>) -> Result<Self, CatalogError> {
        if items.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(Self {
            items: items.into(),
        })
    }

    /// Parses a JSON array of items.
    pub fn from_json(data: &[u8]) -> Result<Self, CatalogError> {
        let items: Vec<Item> = serde_json::from_slice(data)?;
        Self::new(items)
    }

    /// Reads and parses a JSON catalog file. Called once at startup.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_json(&data)?;
        tracing::info!(path = %path.display(), items = catalog.len(), "item catalog loaded");
        Ok(catalog)
    }

    /// Returns the item for round `index`, if there is one.
    pub fn get(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    /// Number of rounds in a game.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always `false`; a catalog holds at least one item.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }
}

impl Default for Catalog {
    /// The built-in ten-round set.
    fn default() -> Self {
        const BUILTIN: [(&str, u32, &str, &str); 10] = [
            ("images/1.png", 57, "Ази", "Эрэгтэй"),
            ("images/2.png", 79, "Цагаан", "Эрэгтэй"),
            ("images/3.png", 30, "Латин", "Эмэгтэй"),
            ("images/4.png", 40, "Латин", "Эрэгтэй"),
            ("images/5.png", 23, "Цагаан", "Эмэгтэй"),
            ("images/6.png", 60, "Цагаан", "Эрэгтэй"),
            ("images/7.png", 25, "Хар", "Эмэгтэй"),
            ("images/8.png", 30, "Латин", "Эмэгтэй"),
            ("images/9.png", 23, "Хар", "Эрэгтэй"),
            ("images/10.png", 30, "Ази", "Эрэгтэй"),
        ];
        let items: Vec<Item> = BUILTIN
            .iter()
            .map(|&(avatar, age, category, gender)| Item {
                avatar: avatar.to_string(),
                age,
                category: category.to_string(),
                gender: gender.to_string(),
            })
            .collect();
        Self {
            items: items.into(),
        }
    }
}
