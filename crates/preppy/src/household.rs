//! Household profiles.
//!
//! A household profile records who lives in the home and which state it is
//! in. Recommendations are computed from it, so most checklist operations
//! require one with a home state set.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::LimitsConfig;
use crate::error::{Error, Result};

/// Family composition and home state for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HouseholdProfile {
    /// Owning user.
    pub user_id: i64,
    /// Household last name.
    pub last_name: String,
    /// Number of adults.
    pub adults: u32,
    /// Number of seniors.
    pub seniors: u32,
    /// Number of children.
    pub children: u32,
    /// Number of pets.
    pub pets: u32,
    /// Home state code, e.g. `CA`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Free-text note on special needs.
    pub special_needs: String,
    /// When the profile was last saved (assigned by storage layer).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl HouseholdProfile {
    /// The home state code.
    ///
    /// # Errors
    ///
    /// Returns `Error::MissingHousehold` if no home state is set.
    pub fn home_state(&self) -> Result<&str> {
        match self.state.as_deref() {
            Some(code) if !code.is_empty() => Ok(code),
            _ => Err(Error::MissingHousehold {
                user_id: self.user_id,
            }),
        }
    }

    /// Total number of people (pets excluded).
    #[must_use]
    pub fn people(&self) -> u32 {
        self.adults
            .saturating_add(self.seniors)
            .saturating_add(self.children)
    }
}

/// Raw household form input, before validation.
///
/// Every field is text as submitted; [`HouseholdForm::validate`] turns it
/// into a [`HouseholdProfile`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HouseholdForm {
    /// Household last name.
    pub name: Option<String>,
    /// Number of adults.
    pub adults: Option<String>,
    /// Number of seniors.
    pub seniors: Option<String>,
    /// Number of children.
    pub children: Option<String>,
    /// Number of pets.
    pub pets: Option<String>,
    /// Home state code.
    pub state: Option<String>,
    /// Special needs note.
    pub special: Option<String>,
}

fn state_code_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new("^[A-Za-z]+$").expect("static pattern is valid"))
}

fn present(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

impl HouseholdForm {
    /// Validate the form against the known state codes and configured limits.
    ///
    /// All violations are collected. A count that is missing is reported as
    /// missing only; it is not also reported as non-numeric.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` listing every violation found.
    pub fn validate(
        &self,
        user_id: i64,
        known_states: &[String],
        limits: &LimitsConfig,
    ) -> Result<HouseholdProfile> {
        let mut violations = Vec::new();

        let fields = [
            ("Name", &self.name),
            ("Adults", &self.adults),
            ("Seniors", &self.seniors),
            ("Children", &self.children),
            ("Pets", &self.pets),
            ("State", &self.state),
            ("Special", &self.special),
        ];
        for (label, value) in fields {
            if present(value.as_ref()).is_none() {
                violations.push(format!("{label} is required."));
            }
        }

        let name = present(self.name.as_ref()).unwrap_or_default();
        if name.chars().count() > limits.max_name_length {
            violations.push(format!(
                "Name must be at most {} characters.",
                limits.max_name_length
            ));
        }

        let mut count = |label: &str, value: &Option<String>| -> u32 {
            let Some(raw) = present(value.as_ref()) else {
                return 0;
            };
            match raw.parse::<u32>() {
                Ok(n) if n <= limits.max_household_count => n,
                Ok(_) => {
                    violations.push(format!(
                        "{label} must be at most {}.",
                        limits.max_household_count
                    ));
                    0
                }
                Err(_) => {
                    violations.push(format!("{label} must be a non-negative whole number."));
                    0
                }
            }
        };
        let adults = count("Adults", &self.adults);
        let seniors = count("Seniors", &self.seniors);
        let children = count("Children", &self.children);
        let pets = count("Pets", &self.pets);

        let state = present(self.state.as_ref()).map(str::to_ascii_uppercase);
        if let Some(code) = &state {
            if !state_code_pattern().is_match(code) || !known_states.iter().any(|s| s == code) {
                violations.push("Not a valid state.".to_string());
            }
        }

        Error::check(violations)?;

        Ok(HouseholdProfile {
            user_id,
            last_name: name.to_string(),
            adults,
            seniors,
            children,
            pets,
            state,
            special_needs: present(self.special.as_ref()).unwrap_or_default().to_string(),
            updated_at: None,
        })
    }
}
