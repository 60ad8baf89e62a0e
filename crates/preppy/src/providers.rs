//! Medical providers: doctors, clinics and pharmacies a household relies on.

use serde::{Deserialize, Serialize};

use crate::config::LimitsConfig;
use crate::error::{Error, Result};

/// A stored medical provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    /// Row id.
    pub id: i64,
    /// Owning user.
    pub user_id: i64,
    /// Provider fields.
    #[serde(flatten)]
    pub details: ProviderDetails,
}

/// Editable provider fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderDetails {
    /// First name, empty for a clinic or pharmacy.
    pub first_name: String,
    /// Last name or practice name.
    pub last_name: String,
    /// Household member the provider sees.
    pub patient: String,
    /// Phone number.
    pub phone: String,
    /// Office address.
    pub address: String,
}

impl ProviderDetails {
    /// Trim every field and check the provider can be found and reached.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` listing every violation found.
    pub fn validated(self, limits: &LimitsConfig) -> Result<Self> {
        let details = Self {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            patient: self.patient.trim().to_string(),
            phone: self.phone.trim().to_string(),
            address: self.address.trim().to_string(),
        };

        let required = [
            ("last name", &details.last_name),
            ("phone", &details.phone),
            ("address", &details.address),
        ];
        let mut violations: Vec<String> = required
            .iter()
            .filter(|(_, value)| value.is_empty())
            .map(|(label, _)| format!("Please provide a valid {label}."))
            .collect();
        violations.extend(limits.name_violations(&[
            ("First name", details.first_name.as_str()),
            ("Last name", details.last_name.as_str()),
            ("Patient", details.patient.as_str()),
            ("Phone", details.phone.as_str()),
            ("Address", details.address.as_str()),
        ]));

        Error::check(violations)?;
        Ok(details)
    }

    /// Display name, e.g. `Dr Osei` or `Eastside Pharmacy`.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details() -> ProviderDetails {
        ProviderDetails {
            first_name: "Kofi".to_string(),
            last_name: " Osei ".to_string(),
            patient: "Ana".to_string(),
            phone: "555-0142".to_string(),
            address: "12 Main St".to_string(),
        }
    }

    #[test]
    fn test_validated_trims() {
        let d = details().validated(&LimitsConfig::default()).unwrap();
        assert_eq!(d.last_name, "Osei");
        assert_eq!(d.display_name(), "Kofi Osei");
    }

    #[test]
    fn test_validated_accumulates_required_fields() {
        let Err(Error::Validation { violations }) =
            ProviderDetails::default().validated(&LimitsConfig::default())
        else {
            panic!("expected validation error");
        };
        assert_eq!(
            violations,
            vec![
                "Please provide a valid last name.".to_string(),
                "Please provide a valid phone.".to_string(),
                "Please provide a valid address.".to_string(),
            ]
        );
    }

    #[test]
    fn test_first_name_optional() {
        let d = ProviderDetails {
            first_name: String::new(),
            last_name: "Eastside Pharmacy".to_string(),
            ..details()
        };
        let d = d.validated(&LimitsConfig::default()).unwrap();
        assert_eq!(d.display_name(), "Eastside Pharmacy");
    }

    #[test]
    fn test_validated_length_limit() {
        let limits = LimitsConfig {
            max_name_length: 4,
            ..LimitsConfig::default()
        };
        let err = details().validated(&limits).unwrap_err();
        assert!(err.to_string().contains("Address must be at most 4 characters."));
    }
}
