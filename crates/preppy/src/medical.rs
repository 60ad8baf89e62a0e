//! Medical records for the people in a household.
//!
//! A record holds what responders or a shelter would need to know about one
//! person: blood type, medications, allergies and insurance details.

use serde::{Deserialize, Serialize};

use crate::config::LimitsConfig;
use crate::error::{Error, Result};

/// Accepted blood types, in their stored spelling.
pub const BLOOD_TYPES: &[&str] = &["A+", "A-", "B+", "B-", "AB+", "AB-", "O+", "O-", "Unknown"];

/// A stored medical record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicalRecord {
    /// Row id.
    pub id: i64,
    /// Owning user.
    pub user_id: i64,
    /// Record fields.
    #[serde(flatten)]
    pub details: MedicalDetails,
}

/// Editable medical record fields. Missing fields are stored as empty text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MedicalDetails {
    /// First name of the person the record is for.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Blood type, one of [`BLOOD_TYPES`].
    pub blood_type: String,
    /// Current medications.
    pub medications: String,
    /// Known allergies.
    pub allergies: String,
    /// Anything else worth knowing.
    pub other: String,
    /// Insurance carrier.
    pub insurance: String,
    /// Insurance policy number.
    pub policy: String,
}

impl MedicalDetails {
    /// Trim every field, normalize the blood type and check the record.
    ///
    /// A record needs a first name and a blood type. Blood types are matched
    /// case-insensitively, so `ab-` is stored as `AB-`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` listing every violation found.
    pub fn validated(self, limits: &LimitsConfig) -> Result<Self> {
        let mut details = Self {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            blood_type: self.blood_type.trim().to_string(),
            medications: self.medications.trim().to_string(),
            allergies: self.allergies.trim().to_string(),
            other: self.other.trim().to_string(),
            insurance: self.insurance.trim().to_string(),
            policy: self.policy.trim().to_string(),
        };

        let mut violations = Vec::new();
        if details.first_name.is_empty() {
            violations.push("Please provide a first name.".to_string());
        }
        if details.blood_type.is_empty() {
            violations.push("Please provide a blood type.".to_string());
        } else if let Some(canonical) = canonical_blood_type(&details.blood_type) {
            details.blood_type = canonical.to_string();
        } else {
            violations.push(format!(
                "Blood type must be one of {}.",
                BLOOD_TYPES.join(", ")
            ));
        }
        violations.extend(limits.name_violations(&[
            ("First name", details.first_name.as_str()),
            ("Last name", details.last_name.as_str()),
            ("Insurance", details.insurance.as_str()),
            ("Policy", details.policy.as_str()),
        ]));
        violations.extend(limits.note_violations(&[
            ("Medications", details.medications.as_str()),
            ("Allergies", details.allergies.as_str()),
            ("Other", details.other.as_str()),
        ]));

        Error::check(violations)?;
        Ok(details)
    }

    /// Display name, e.g. `Ana Rivera`.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

fn canonical_blood_type(raw: &str) -> Option<&'static str> {
    BLOOD_TYPES
        .iter()
        .copied()
        .find(|known| known.eq_ignore_ascii_case(raw))
}
