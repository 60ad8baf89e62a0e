//! Household profiles and the recommendations computed from them.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};
use tracing::{debug, info, warn};

use crate::config::LimitsConfig;
use crate::error::{Error, Result};
use crate::household::{HouseholdForm, HouseholdProfile};
use crate::kit::KitType;
use crate::recommend::{self, Recommendation};

use super::Storage;

impl Storage {
    /// Insert or update a household profile.
    ///
    /// Returns the profile as stored, with `updated_at` set.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn save_household(&self, profile: &HouseholdProfile) -> Result<HouseholdProfile> {
        let updated_at = Utc::now();
        self.conn.execute(
            r"
            INSERT INTO households
                (user_id, last_name, adults, seniors, children, pets, state_code, special_needs, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT(user_id) DO UPDATE SET
                last_name = excluded.last_name,
                adults = excluded.adults,
                seniors = excluded.seniors,
                children = excluded.children,
                pets = excluded.pets,
                state_code = excluded.state_code,
                special_needs = excluded.special_needs,
                updated_at = excluded.updated_at
            ",
            params![
                profile.user_id,
                profile.last_name,
                profile.adults,
                profile.seniors,
                profile.children,
                profile.pets,
                profile.state,
                profile.special_needs,
                updated_at.to_rfc3339(),
            ],
        )?;

        info!("Saved household for user {}", profile.user_id);
        Ok(HouseholdProfile {
            updated_at: Some(updated_at),
            ..profile.clone()
        })
    }

    /// Validate a household form against the loaded states and save it.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` listing every problem with the form, or a
    /// storage error.
    pub fn submit_household(
        &self,
        user_id: i64,
        form: &HouseholdForm,
        limits: &LimitsConfig,
    ) -> Result<HouseholdProfile> {
        let states = self.state_codes()?;
        if states.is_empty() {
            warn!("No states loaded; every household state will be rejected");
        }
        let profile = form.validate(user_id, &states, limits)?;
        self.save_household(&profile)
    }

    /// Get a user's household profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn household(&self, user_id: i64) -> Result<Option<HouseholdProfile>> {
        let result = self
            .conn
            .query_row(
                r"
                SELECT user_id, last_name, adults, seniors, children, pets,
                       state_code, special_needs, updated_at
                FROM households WHERE user_id = ?1
                ",
                [user_id],
                Self::row_to_household,
            )
            .optional()?;
        Ok(result)
    }

    /// Get a user's household profile, failing if it has not been set up.
    ///
    /// # Errors
    ///
    /// Returns `Error::MissingHousehold` if there is no profile.
    pub fn require_household(&self, user_id: i64) -> Result<HouseholdProfile> {
        self.household(user_id)?
            .ok_or(Error::MissingHousehold { user_id })
    }

    /// Compute a user's recommended checklist for a kit.
    ///
    /// # Errors
    ///
    /// Returns `Error::MissingHousehold` if the user has no profile or the
    /// profile has no home state, or a storage error.
    pub fn recommend(&self, user_id: i64, kit: KitType) -> Result<Recommendation> {
        let household = self.require_household(user_id)?;
        let state = household.home_state()?;

        let rows = self.candidate_rows(kit)?;
        let home_disasters = self.home_disaster_ids(state)?;
        debug!(
            "Recommending {} for user {} from {} catalog rows",
            kit,
            user_id,
            rows.len()
        );

        recommend::recommend(&household, kit, &rows, &home_disasters)
    }

    /// Convert a database row to a `HouseholdProfile`.
    fn row_to_household(row: &rusqlite::Row) -> rusqlite::Result<HouseholdProfile> {
        let updated_at: String = row.get(8)?;
        let updated_at = DateTime::parse_from_rfc3339(&updated_at)
            .map(|dt| dt.with_timezone(&Utc))
            .ok();

        Ok(HouseholdProfile {
            user_id: row.get(0)?,
            last_name: row.get(1)?,
            adults: row.get(2)?,
            seniors: row.get(3)?,
            children: row.get(4)?,
            pets: row.get(5)?,
            state: row.get(6)?,
            special_needs: row.get(7)?,
            updated_at,
        })
    }
}
