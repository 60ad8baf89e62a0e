//! Kit types.
//!
//! A kit is one of the three checklists a household builds. Everything that
//! varies by kit (which catalog flag qualifies an item, where progress is
//! recorded) is resolved here with a `match` on the tag.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A checklist category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KitType {
    /// Supplies to grab when evacuating.
    GoBag,
    /// Supplies to stock for sheltering in place.
    Shelter,
    /// Preparedness tasks.
    Task,
}

/// The catalog an item of a given kit is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogSource {
    /// The supplies catalog.
    Supplies,
    /// The tasks catalog.
    Tasks,
}

impl KitType {
    /// All kit types, in display order.
    pub const ALL: [Self; 3] = [Self::GoBag, Self::Shelter, Self::Task];

    /// The stable text form stored in the database.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GoBag => "go-bag",
            Self::Shelter => "shelter",
            Self::Task => "task",
        }
    }

    /// Which catalog this kit draws its items from.
    #[must_use]
    pub fn source(self) -> CatalogSource {
        match self {
            Self::GoBag | Self::Shelter => CatalogSource::Supplies,
            Self::Task => CatalogSource::Tasks,
        }
    }

    /// Table holding progress records for this kit.
    #[must_use]
    pub(crate) fn progress_table(self) -> &'static str {
        match self.source() {
            CatalogSource::Supplies => "saved_supplies",
            CatalogSource::Tasks => "saved_tasks",
        }
    }

    /// Column holding this kit's acquired flag in [`Self::progress_table`].
    #[must_use]
    pub(crate) fn progress_column(self) -> &'static str {
        match self {
            Self::GoBag => "go_bag",
            Self::Shelter => "shelter",
            Self::Task => "done",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::GoBag => "Go-bag",
            Self::Shelter => "Shelter-in-place",
            Self::Task => "Task list",
        }
    }
}

impl std::fmt::Display for KitType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KitType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "go-bag" | "gobag" => Ok(Self::GoBag),
            "shelter" => Ok(Self::Shelter),
            "task" | "tasks" => Ok(Self::Task),
            _ => Err(Error::UnknownKitType(s.to_string())),
        }
    }
}
