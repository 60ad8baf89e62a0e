//! Medical provider records, scoped to their owning user.

use rusqlite::{params, OptionalExtension};
use tracing::{debug, info};

use crate::error::Result;
use crate::providers::{Provider, ProviderDetails};

use super::Storage;

impl Storage {
    /// Add a provider. `details` should already be validated.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn add_provider(&self, user_id: i64, details: &ProviderDetails) -> Result<Provider> {
        self.conn.execute(
            r"
            INSERT INTO providers (user_id, first_name, last_name, patient, phone, address)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
            params![
                user_id,
                details.first_name,
                details.last_name,
                details.patient,
                details.phone,
                details.address,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        info!("Added provider {} for user {}", id, user_id);
        Ok(Provider {
            id,
            user_id,
            details: details.clone(),
        })
    }

    /// A user's providers, ordered by last then first name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn providers(&self, user_id: i64) -> Result<Vec<Provider>> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT id, user_id, first_name, last_name, patient, phone, address
            FROM providers WHERE user_id = ?1
            ORDER BY last_name, first_name, id
            ",
        )?;
        let providers = stmt
            .query_map([user_id], Self::row_to_provider)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(providers)
    }

    /// One of a user's providers.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn provider(&self, user_id: i64, id: i64) -> Result<Option<Provider>> {
        let result = self
            .conn
            .query_row(
                r"
                SELECT id, user_id, first_name, last_name, patient, phone, address
                FROM providers WHERE id = ?1 AND user_id = ?2
                ",
                [id, user_id],
                Self::row_to_provider,
            )
            .optional()?;
        Ok(result)
    }

    /// Overwrite a provider's details.
    ///
    /// Returns `false` if the user has no provider with that id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn update_provider(&self, user_id: i64, id: i64, details: &ProviderDetails) -> Result<bool> {
        let affected = self.conn.execute(
            r"
            UPDATE providers
            SET first_name = ?1, last_name = ?2, patient = ?3, phone = ?4, address = ?5
            WHERE id = ?6 AND user_id = ?7
            ",
            params![
                details.first_name,
                details.last_name,
                details.patient,
                details.phone,
                details.address,
                id,
                user_id,
            ],
        )?;
        debug!("Updated provider {} for user {}: {} rows", id, user_id, affected);
        Ok(affected > 0)
    }

    /// Delete a provider.
    ///
    /// Returns `false` if the user has no provider with that id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_provider(&self, user_id: i64, id: i64) -> Result<bool> {
        let affected = self.conn.execute(
            "DELETE FROM providers WHERE id = ?1 AND user_id = ?2",
            [id, user_id],
        )?;
        if affected > 0 {
            info!("Deleted provider {} for user {}", id, user_id);
        }
        Ok(affected > 0)
    }

    fn row_to_provider(row: &rusqlite::Row) -> rusqlite::Result<Provider> {
        Ok(Provider {
            id: row.get(0)?,
            user_id: row.get(1)?,
            details: ProviderDetails {
                first_name: row.get(2)?,
                last_name: row.get(3)?,
                patient: row.get(4)?,
                phone: row.get(5)?,
                address: row.get(6)?,
            },
        })
    }
}
