//! Checklist views and custom items.
//!
//! A checklist shows the catalog items a user selected for a kit together
//! with the items they added by hand, as one list sorted by name.

use std::collections::{BTreeSet, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::LimitsConfig;
use crate::error::{Error, Result};
use crate::kit::KitType;

/// A user-authored item that is not in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomItem {
    /// Owning user.
    pub user_id: i64,
    /// Kit the item belongs to.
    pub kit: KitType,
    /// Display name.
    pub name: String,
    /// Generated external key.
    pub key: String,
    /// When the item was created.
    pub created_at: DateTime<Utc>,
}

impl CustomItem {
    /// Create a custom item with a freshly generated key.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` if the trimmed name is empty or longer
    /// than the configured limit.
    pub fn new(user_id: i64, kit: KitType, name: &str, limits: &LimitsConfig) -> Result<Self> {
        let name = name.trim();
        let mut violations = Vec::new();
        if name.is_empty() {
            violations.push(format!("Please enter a name for your {} item.", kit.label()));
        }
        if name.chars().count() > limits.max_name_length {
            violations.push(format!(
                "Item name must be at most {} characters.",
                limits.max_name_length
            ));
        }
        Error::check(violations)?;

        Ok(Self {
            user_id,
            kit,
            name: name.to_string(),
            key: uuid::Uuid::new_v4().to_string(),
            created_at: Utc::now(),
        })
    }
}

/// One entry of the union of selected catalog items and custom items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibleItem {
    /// Display name.
    pub name: String,
    /// External key.
    pub key: String,
    /// Whether the item is user-authored.
    pub custom: bool,
}

/// A visible item with its acquired/done state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistEntry {
    /// Display name.
    pub name: String,
    /// External key.
    pub key: String,
    /// Whether the item is user-authored.
    pub custom: bool,
    /// Whether the item has been acquired (supplies) or done (tasks).
    pub acquired: bool,
}

/// A user's checklist for one kit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "items", rename_all = "snake_case")]
pub enum Checklist {
    /// Nothing selected and no custom items: the kit has to be built first.
    NotBuilt,
    /// The kit's entries, sorted by name.
    Built(Vec<ChecklistEntry>),
}

impl Checklist {
    /// Attach acquired flags to the visible items.
    #[must_use]
    pub fn from_visible(items: Vec<VisibleItem>, acquired: &BTreeSet<String>) -> Self {
        if items.is_empty() {
            return Self::NotBuilt;
        }
        Self::Built(
            items
                .into_iter()
                .map(|item| ChecklistEntry {
                    acquired: acquired.contains(&item.key),
                    name: item.name,
                    key: item.key,
                    custom: item.custom,
                })
                .collect(),
        )
    }

    /// Whether the kit still has to be built.
    #[must_use]
    pub fn is_built(&self) -> bool {
        matches!(self, Self::Built(_))
    }

    /// The entries, empty when not built.
    #[must_use]
    pub fn entries(&self) -> &[ChecklistEntry] {
        match self {
            Self::NotBuilt => &[],
            Self::Built(entries) => entries,
        }
    }
}

/// Merge selected catalog items with custom items.
///
/// The result is one lexicographic sequence by name. When a catalog item and
/// a custom item share a display name the catalog item is kept and the
/// custom one dropped; names are compared exactly.
#[must_use]
pub fn union_items(catalog: Vec<VisibleItem>, custom: Vec<VisibleItem>) -> Vec<VisibleItem> {
    let mut merged: Vec<VisibleItem> = catalog.into_iter().chain(custom).collect();
    // Stable: on equal names catalog items stay ahead of custom ones.
    merged.sort_by(|a, b| a.name.cmp(&b.name).then(a.custom.cmp(&b.custom)));

    let mut seen = HashSet::new();
    merged.retain(|item| seen.insert(item.name.clone()));
    merged
}
