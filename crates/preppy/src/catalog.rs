//! Catalog reference data.
//!
//! The catalog holds the immutable reference data every recommendation is
//! computed from: disasters ranked by probability, states, supplies, tasks,
//! and the links between them. It is bulk-loaded once from flat CSV files
//! and never modified at runtime.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};

/// File names read by [`Catalog::load_dir`].
pub const DISASTERS_FILE: &str = "sits.csv";
/// States file name.
pub const STATES_FILE: &str = "states.csv";
/// Supplies file name.
pub const SUPPLIES_FILE: &str = "supplies.csv";
/// Tasks file name.
pub const TASKS_FILE: &str = "tasks.csv";
/// Disaster-to-supply links file name.
pub const DISASTER_SUPPLIES_FILE: &str = "disastersupplies.csv";
/// Disaster-to-task links file name.
pub const DISASTER_TASKS_FILE: &str = "disastertasks.csv";
/// State-to-disaster links file name.
pub const STATE_DISASTERS_FILE: &str = "statedisasters.csv";

/// An emergency situation, ranked by how likely it is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Disaster {
    /// Catalog id.
    pub id: i64,
    /// Display name.
    #[serde(alias = "sit")]
    pub name: String,
    /// Rank; lower is more likely.
    pub probability: i64,
}

/// A U.S. state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    /// Catalog id.
    pub id: i64,
    /// Two-letter code, e.g. `CA`.
    #[serde(alias = "state")]
    pub code: String,
    /// Full name, e.g. `California`.
    pub full_name: String,
}

/// Which household members an item is meant for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Applicability {
    /// Useful for adults.
    pub adult: bool,
    /// Useful for seniors.
    pub senior: bool,
    /// Useful for children.
    pub child: bool,
    /// Useful for pets.
    pub pet: bool,
}

/// A catalog supply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supply {
    /// Catalog id.
    pub id: i64,
    /// Stable external key.
    #[serde(alias = "uuid")]
    pub key: String,
    /// Display name.
    #[serde(alias = "item")]
    pub name: String,
    /// Suggested amount per person, if any.
    #[serde(default, deserialize_with = "deserialize_optional_f64")]
    pub per_person: Option<f64>,
    /// Belongs in a go-bag.
    #[serde(alias = "gobag", deserialize_with = "deserialize_flag")]
    pub go_bag: bool,
    /// Belongs in a shelter-in-place kit.
    #[serde(deserialize_with = "deserialize_flag")]
    pub shelter: bool,
    /// Useful for adults.
    #[serde(deserialize_with = "deserialize_flag")]
    pub adult: bool,
    /// Useful for seniors.
    #[serde(deserialize_with = "deserialize_flag")]
    pub senior: bool,
    /// Useful for children.
    #[serde(deserialize_with = "deserialize_flag")]
    pub child: bool,
    /// Useful for pets.
    #[serde(deserialize_with = "deserialize_flag")]
    pub pet: bool,
}

/// A catalog preparedness task.
///
/// Task files without demographic columns apply to every household member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Catalog id.
    pub id: i64,
    /// Stable external key.
    #[serde(alias = "uuid")]
    pub key: String,
    /// Display name.
    #[serde(alias = "task")]
    pub name: String,
    /// Longer description.
    #[serde(default)]
    pub description: Option<String>,
    /// Useful for adults.
    #[serde(default = "yes", deserialize_with = "deserialize_flag")]
    pub adult: bool,
    /// Useful for seniors.
    #[serde(default = "yes", deserialize_with = "deserialize_flag")]
    pub senior: bool,
    /// Useful for children.
    #[serde(default = "yes", deserialize_with = "deserialize_flag")]
    pub child: bool,
    /// Useful for pets.
    #[serde(default = "yes", deserialize_with = "deserialize_flag")]
    pub pet: bool,
}

/// Links a disaster to a supply or task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisasterLink {
    /// Disaster id.
    pub disaster_id: i64,
    /// Supply or task id.
    #[serde(alias = "supply_id", alias = "task_id")]
    pub item_id: i64,
}

/// Links a state to a disaster likely to affect it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateDisasterLink {
    /// State id.
    pub state_id: i64,
    /// Disaster id.
    pub disaster_id: i64,
}

impl Supply {
    /// Demographic applicability flags.
    #[must_use]
    pub fn applicability(&self) -> Applicability {
        Applicability {
            adult: self.adult,
            senior: self.senior,
            child: self.child,
            pet: self.pet,
        }
    }
}

impl Task {
    /// Demographic applicability flags.
    #[must_use]
    pub fn applicability(&self) -> Applicability {
        Applicability {
            adult: self.adult,
            senior: self.senior,
            child: self.child,
            pet: self.pet,
        }
    }
}

/// The complete set of reference data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    /// Disaster situations.
    pub disasters: Vec<Disaster>,
    /// States.
    pub states: Vec<State>,
    /// Supplies.
    pub supplies: Vec<Supply>,
    /// Tasks.
    pub tasks: Vec<Task>,
    /// Disaster-to-supply links.
    pub disaster_supplies: Vec<DisasterLink>,
    /// Disaster-to-task links.
    pub disaster_tasks: Vec<DisasterLink>,
    /// State-to-disaster links.
    pub state_disasters: Vec<StateDisasterLink>,
}

impl Catalog {
    /// Load every catalog file from a directory and validate the result.
    ///
    /// # Errors
    ///
    /// Returns an error if a file is missing or malformed, or if the loaded
    /// data fails [`Catalog::validate`].
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        debug!("Loading catalog from {}", dir.display());

        let catalog = Self {
            disasters: read_csv(&dir.join(DISASTERS_FILE))?,
            states: read_csv(&dir.join(STATES_FILE))?,
            supplies: read_csv(&dir.join(SUPPLIES_FILE))?,
            tasks: read_csv(&dir.join(TASKS_FILE))?,
            disaster_supplies: read_csv(&dir.join(DISASTER_SUPPLIES_FILE))?,
            disaster_tasks: read_csv(&dir.join(DISASTER_TASKS_FILE))?,
            state_disasters: read_csv(&dir.join(STATE_DISASTERS_FILE))?,
        };
        catalog.validate()?;

        info!(
            "Loaded catalog: {} disasters, {} states, {} supplies, {} tasks",
            catalog.disasters.len(),
            catalog.states.len(),
            catalog.supplies.len(),
            catalog.tasks.len()
        );
        Ok(catalog)
    }

    /// Check ids, keys and link references.
    ///
    /// Every problem found is reported, not just the first.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` listing duplicate ids or keys and links
    /// that reference missing rows.
    pub fn validate(&self) -> Result<()> {
        let mut violations = Vec::new();

        let disaster_ids = unique_ids("disaster", self.disasters.iter().map(|d| d.id), &mut violations);
        let state_ids = unique_ids("state", self.states.iter().map(|s| s.id), &mut violations);
        let supply_ids = unique_ids("supply", self.supplies.iter().map(|s| s.id), &mut violations);
        let task_ids = unique_ids("task", self.tasks.iter().map(|t| t.id), &mut violations);

        let mut keys = HashSet::new();
        for key in self
            .supplies
            .iter()
            .map(|s| &s.key)
            .chain(self.tasks.iter().map(|t| &t.key))
        {
            if key.trim().is_empty() {
                violations.push("catalog item with empty key".to_string());
            } else if !keys.insert(key.as_str()) {
                violations.push(format!("duplicate item key '{key}'"));
            }
        }

        let mut codes = HashSet::new();
        for state in &self.states {
            if !codes.insert(state.code.as_str()) {
                violations.push(format!("duplicate state code '{}'", state.code));
            }
        }

        for link in &self.disaster_supplies {
            check_link("disaster-supply", link.disaster_id, &disaster_ids, link.item_id, &supply_ids, &mut violations);
        }
        for link in &self.disaster_tasks {
            check_link("disaster-task", link.disaster_id, &disaster_ids, link.item_id, &task_ids, &mut violations);
        }
        for link in &self.state_disasters {
            if !state_ids.contains(&link.state_id) {
                violations.push(format!("state-disaster link references unknown state {}", link.state_id));
            }
            if !disaster_ids.contains(&link.disaster_id) {
                violations.push(format!(
                    "state-disaster link references unknown disaster {}",
                    link.disaster_id
                ));
            }
        }

        Error::check(violations)
    }

    /// Look up a state by its code.
    #[must_use]
    pub fn state_by_code(&self, code: &str) -> Option<&State> {
        self.states.iter().find(|s| s.code == code)
    }
}

fn unique_ids(
    what: &str,
    ids: impl Iterator<Item = i64>,
    violations: &mut Vec<String>,
) -> HashSet<i64> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            violations.push(format!("duplicate {what} id {id}"));
        }
    }
    seen
}

fn check_link(
    what: &str,
    disaster_id: i64,
    disaster_ids: &HashSet<i64>,
    item_id: i64,
    item_ids: &HashSet<i64>,
    violations: &mut Vec<String>,
) {
    if !disaster_ids.contains(&disaster_id) {
        violations.push(format!("{what} link references unknown disaster {disaster_id}"));
    }
    if !item_ids.contains(&item_id) {
        violations.push(format!("{what} link references unknown item {item_id}"));
    }
}

fn read_csv<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| Error::catalog_load(path, e.to_string()))?;

    let rows = reader
        .deserialize()
        .collect::<std::result::Result<Vec<T>, _>>()
        .map_err(|e| Error::catalog_load(path, e.to_string()))?;

    debug!("Read {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

fn yes() -> bool {
    true
}

/// Parse a catalog flag: `y`, `yes`, `true` or `1` (any case) are true.
pub(crate) fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "y" | "yes" | "true" | "1"
    )
}

fn deserialize_flag<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<bool, D::Error> {
    let value = String::deserialize(deserializer)?;
    Ok(parse_flag(&value))
}

fn deserialize_optional_f64<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<f64>, D::Error> {
    let value = Option::<String>::deserialize(deserializer)?;
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(serde::de::Error::custom),
    }
}
