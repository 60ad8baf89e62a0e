//! Medical records, scoped to their owning user.

use rusqlite::{params, OptionalExtension};
use tracing::{debug, info};

use crate::error::Result;
use crate::medical::{MedicalDetails, MedicalRecord};

use super::Storage;

const SELECT_RECORD: &str = r"
    SELECT id, user_id, first_name, last_name, blood_type, medications, allergies,
           other, insurance, policy
    FROM medical_records
";

impl Storage {
    /// Add a medical record. `details` should already be validated.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn add_medical_record(
        &self,
        user_id: i64,
        details: &MedicalDetails,
    ) -> Result<MedicalRecord> {
        self.conn.execute(
            r"
            INSERT INTO medical_records (user_id, first_name, last_name, blood_type,
                medications, allergies, other, insurance, policy)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ",
            params![
                user_id,
                details.first_name,
                details.last_name,
                details.blood_type,
                details.medications,
                details.allergies,
                details.other,
                details.insurance,
                details.policy,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        info!("Added medical record {} for user {}", id, user_id);
        Ok(MedicalRecord {
            id,
            user_id,
            details: details.clone(),
        })
    }

    /// A user's medical records, ordered by first then last name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn medical_records(&self, user_id: i64) -> Result<Vec<MedicalRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "{SELECT_RECORD} WHERE user_id = ?1 ORDER BY first_name, last_name, id"
        ))?;
        let records = stmt
            .query_map([user_id], Self::row_to_medical_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// One of a user's medical records.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn medical_record(&self, user_id: i64, id: i64) -> Result<Option<MedicalRecord>> {
        let result = self
            .conn
            .query_row(
                &format!("{SELECT_RECORD} WHERE id = ?1 AND user_id = ?2"),
                [id, user_id],
                Self::row_to_medical_record,
            )
            .optional()?;
        Ok(result)
    }

    /// Overwrite a medical record.
    ///
    /// Returns `false` if the user has no record with that id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn update_medical_record(
        &self,
        user_id: i64,
        id: i64,
        details: &MedicalDetails,
    ) -> Result<bool> {
        let affected = self.conn.execute(
            r"
            UPDATE medical_records
            SET first_name = ?1, last_name = ?2, blood_type = ?3, medications = ?4,
                allergies = ?5, other = ?6, insurance = ?7, policy = ?8
            WHERE id = ?9 AND user_id = ?10
            ",
            params![
                details.first_name,
                details.last_name,
                details.blood_type,
                details.medications,
                details.allergies,
                details.other,
                details.insurance,
                details.policy,
                id,
                user_id,
            ],
        )?;
        debug!(
            "Updated medical record {} for user {}: {} rows",
            id, user_id, affected
        );
        Ok(affected > 0)
    }

    /// Delete a medical record.
    ///
    /// Returns `false` if the user has no record with that id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_medical_record(&self, user_id: i64, id: i64) -> Result<bool> {
        let affected = self.conn.execute(
            "DELETE FROM medical_records WHERE id = ?1 AND user_id = ?2",
            [id, user_id],
        )?;
        if affected > 0 {
            info!("Deleted medical record {} for user {}", id, user_id);
        }
        Ok(affected > 0)
    }

    fn row_to_medical_record(row: &rusqlite::Row) -> rusqlite::Result<MedicalRecord> {
        Ok(MedicalRecord {
            id: row.get(0)?,
            user_id: row.get(1)?,
            details: MedicalDetails {
                first_name: row.get(2)?,
                last_name: row.get(3)?,
                blood_type: row.get(4)?,
                medications: row.get(5)?,
                allergies: row.get(6)?,
                other: row.get(7)?,
                insurance: row.get(8)?,
                policy: row.get(9)?,
            },
        })
    }
}
