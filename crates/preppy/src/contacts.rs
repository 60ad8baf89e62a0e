//! Emergency contacts.

use serde::{Deserialize, Serialize};

use crate::config::LimitsConfig;
use crate::error::{Error, Result};

/// A stored emergency contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Row id.
    pub id: i64,
    /// Owning user.
    pub user_id: i64,
    /// Contact details.
    #[serde(flatten)]
    pub details: ContactDetails,
}

/// Editable contact fields. Missing fields are stored as empty text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactDetails {
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Phone number.
    pub phone: String,
    /// Email address.
    pub email: String,
    /// Postal address.
    pub address: String,
}

impl ContactDetails {
    /// Trim every field and check it is usable.
    ///
    /// A contact needs a name (first or last) and a way to reach them (phone
    /// or email); no field may exceed the configured length.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` listing every violation found.
    pub fn validated(self, limits: &LimitsConfig) -> Result<Self> {
        let details = Self {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            phone: self.phone.trim().to_string(),
            email: self.email.trim().to_string(),
            address: self.address.trim().to_string(),
        };

        let mut violations = Vec::new();
        if details.first_name.is_empty() && details.last_name.is_empty() {
            violations.push("A contact needs a first or last name.".to_string());
        }
        if details.phone.is_empty() && details.email.is_empty() {
            violations.push("A contact needs a phone number or email.".to_string());
        }
        if !details.email.is_empty() && !details.email.contains('@') {
            violations.push("Email address is not valid.".to_string());
        }
        violations.extend(limits.name_violations(&[
            ("First name", details.first_name.as_str()),
            ("Last name", details.last_name.as_str()),
            ("Phone", details.phone.as_str()),
            ("Email", details.email.as_str()),
            ("Address", details.address.as_str()),
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
