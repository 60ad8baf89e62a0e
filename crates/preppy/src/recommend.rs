//! Recommendation engine.
//!
//! Turns the catalog join (disaster × item) into the per-disaster checklist a
//! household is offered when building a kit. Only items for the requested kit
//! that apply to someone actually living in the household are kept.
//! Disasters linked to the household's home state are flagged as `checked`
//! so they can be highlighted; the flag never hides or adds items.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::Applicability;
use crate::error::Result;
use crate::household::HouseholdProfile;
use crate::kit::KitType;

/// One row of the disaster × item join, as read from storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateRow {
    /// Disaster id.
    pub disaster_id: i64,
    /// Disaster display name.
    pub disaster: String,
    /// Disaster probability rank; lower is more likely.
    pub probability: i64,
    /// Item external key.
    pub item_key: String,
    /// Item display name.
    pub item_name: String,
    /// Who the item is for.
    pub applicability: Applicability,
    /// Supply flagged for go-bags. Always false for tasks.
    pub go_bag: bool,
    /// Supply flagged for shelter-in-place. Always false for tasks.
    pub shelter: bool,
}

/// A disaster and the items recommended for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisasterEntry {
    /// Disaster display name.
    pub name: String,
    /// Recommended item names, in catalog order.
    pub items: Vec<String>,
    /// Whether the disaster is linked to the household's home state.
    pub checked: bool,
}

/// An item offered in the build form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendedItem {
    /// Display name.
    pub name: String,
    /// External key submitted back when the item is chosen.
    pub key: String,
}

/// Result of [`recommend`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Kit the recommendation was computed for.
    pub kit: KitType,
    /// Disasters, most likely first.
    pub sits: Vec<DisasterEntry>,
    /// Every recommended item once, in first-seen order.
    pub all_items: Vec<RecommendedItem>,
}

impl Applicability {
    /// Whether the item applies to at least one kind of member present in
    /// the household.
    #[must_use]
    pub fn applies_to(&self, household: &HouseholdProfile) -> bool {
        (household.adults > 0 && self.adult)
            || (household.seniors > 0 && self.senior)
            || (household.children > 0 && self.child)
            || (household.pets > 0 && self.pet)
    }
}

/// Whether a catalog row belongs in the given kit.
fn kit_admits(kit: KitType, row: &CandidateRow) -> bool {
    match kit {
        KitType::GoBag => row.go_bag,
        KitType::Shelter => row.shelter,
        KitType::Task => true,
    }
}

/// Compute the recommended checklist for a household.
///
/// `rows` is the catalog join for the kit's catalog; `home_disasters` holds
/// the ids of disasters linked to the household's home state.
///
/// # Errors
///
/// Returns `Error::MissingHousehold` if the household has no home state.
pub fn recommend(
    household: &HouseholdProfile,
    kit: KitType,
    rows: &[CandidateRow],
    home_disasters: &HashSet<i64>,
) -> Result<Recommendation> {
    household.home_state()?;

    let mut kept: Vec<&CandidateRow> = rows
        .iter()
        .filter(|row| kit_admits(kit, row) && row.applicability.applies_to(household))
        .collect();
    // Stable: items keep join order within a disaster.
    kept.sort_by_key(|row| (row.probability, row.disaster_id));

    let mut sits: Vec<DisasterEntry> = Vec::new();
    let mut current: Option<i64> = None;
    let mut all_items = Vec::new();
    let mut seen = HashSet::new();

    for row in kept {
        if current != Some(row.disaster_id) {
            current = Some(row.disaster_id);
            sits.push(DisasterEntry {
                name: row.disaster.clone(),
                items: Vec::new(),
                checked: home_disasters.contains(&row.disaster_id),
            });
        }
        if let Some(entry) = sits.last_mut() {
            if !entry.items.contains(&row.item_name) {
                entry.items.push(row.item_name.clone());
            }
        }
        if seen.insert(row.item_name.as_str()) {
            all_items.push(RecommendedItem {
                name: row.item_name.clone(),
                key: row.item_key.clone(),
            });
        }
    }

    debug!(
        "Recommended {} items across {} disasters for user {} ({})",
        all_items.len(),
        sits.len(),
        household.user_id,
        kit
    );

    Ok(Recommendation {
        kit,
        sits,
        all_items,
    })
}
