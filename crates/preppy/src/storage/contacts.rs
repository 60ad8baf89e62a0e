//! Emergency contact records, always scoped to their owning user.

use rusqlite::{params, OptionalExtension};
use tracing::{debug, info};

use crate::contacts::{Contact, ContactDetails};
use crate::error::Result;

use super::Storage;

impl Storage {
    /// Add a contact for a user. `details` should already be validated.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn add_contact(&self, user_id: i64, details: &ContactDetails) -> Result<Contact> {
        self.conn.execute(
            r"
            INSERT INTO contacts (user_id, first_name, last_name, phone, email, address)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
            params![
                user_id,
                details.first_name,
                details.last_name,
                details.phone,
                details.email,
                details.address,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        info!("Added contact {} for user {}", id, user_id);
        Ok(Contact {
            id,
            user_id,
            details: details.clone(),
        })
    }

    /// A user's contacts, ordered by last then first name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn contacts(&self, user_id: i64) -> Result<Vec<Contact>> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT id, user_id, first_name, last_name, phone, email, address
            FROM contacts WHERE user_id = ?1
            ORDER BY last_name, first_name, id
            ",
        )?;
        let contacts = stmt
            .query_map([user_id], Self::row_to_contact)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(contacts)
    }

    /// One of a user's contacts.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn contact(&self, user_id: i64, id: i64) -> Result<Option<Contact>> {
        let result = self
            .conn
            .query_row(
                r"
                SELECT id, user_id, first_name, last_name, phone, email, address
                FROM contacts WHERE id = ?1 AND user_id = ?2
                ",
                [id, user_id],
                Self::row_to_contact,
            )
            .optional()?;
        Ok(result)
    }

    /// Overwrite a contact's details.
    ///
    /// Returns `false` if the user has no contact with that id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn update_contact(&self, user_id: i64, id: i64, details: &ContactDetails) -> Result<bool> {
        let affected = self.conn.execute(
            r"
            UPDATE contacts
            SET first_name = ?1, last_name = ?2, phone = ?3, email = ?4, address = ?5
            WHERE id = ?6 AND user_id = ?7
            ",
            params![
                details.first_name,
                details.last_name,
                details.phone,
                details.email,
                details.address,
                id,
                user_id,
            ],
        )?;
        debug!("Updated contact {} for user {}: {} rows", id, user_id, affected);
        Ok(affected > 0)
    }

    /// Delete a contact.
    ///
    /// Returns `false` if the user has no contact with that id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_contact(&self, user_id: i64, id: i64) -> Result<bool> {
        let affected = self.conn.execute(
            "DELETE FROM contacts WHERE id = ?1 AND user_id = ?2",
            [id, user_id],
        )?;
        if affected > 0 {
            info!("Deleted contact {} for user {}", id, user_id);
        }
        Ok(affected > 0)
    }

    /// Convert a database row to a `Contact`.
    fn row_to_contact(row: &rusqlite::Row) -> rusqlite::Result<Contact> {
        Ok(Contact {
            id: row.get(0)?,
            user_id: row.get(1)?,
            details: ContactDetails {
                first_name: row.get(2)?,
                last_name: row.get(3)?,
                phone: row.get(4)?,
                email: row.get(5)?,
                address: row.get(6)?,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details(first: &str, last: &str) -> ContactDetails {
        ContactDetails {
            first_name: first.to_string(),
            last_name: last.to_string(),
            phone: "555-0100".to_string(),
            ..ContactDetails::default()
        }
    }

    #[test]
    fn test_add_and_list_contacts() {
        let storage = Storage::open_in_memory().unwrap();
        storage.add_contact(1, &details("Ana", "Rivera")).unwrap();
        storage.add_contact(1, &details("Ben", "Adams")).unwrap();
        storage.add_contact(2, &details("Cy", "Other")).unwrap();

        let contacts = storage.contacts(1).unwrap();
        let names: Vec<_> = contacts.iter().map(|c| c.details.display_name()).collect();
        assert_eq!(names, vec!["Ben Adams", "Ana Rivera"]);
    }

    #[test]
    fn test_get_contact() {
        let storage = Storage::open_in_memory().unwrap();
        let added = storage.add_contact(1, &details("Ana", "Rivera")).unwrap();

        assert_eq!(storage.contact(1, added.id).unwrap(), Some(added.clone()));
        assert!(storage.contact(2, added.id).unwrap().is_none());
    }

    #[test]
    fn test_update_contact() {
        let storage = Storage::open_in_memory().unwrap();
        let added = storage.add_contact(1, &details("Ana", "Rivera")).unwrap();

        let mut changed = details("Ana", "Rivera");
        changed.email = "ana@example.com".to_string();
        assert!(storage.update_contact(1, added.id, &changed).unwrap());

        let loaded = storage.contact(1, added.id).unwrap().unwrap();
        assert_eq!(loaded.details.email, "ana@example.com");
    }

    #[test]
    fn test_update_other_users_contact_is_refused() {
        let storage = Storage::open_in_memory().unwrap();
        let added = storage.add_contact(1, &details("Ana", "Rivera")).unwrap();

        assert!(!storage
            .update_contact(2, added.id, &details("Mallory", "X"))
            .unwrap());
        assert_eq!(
            storage.contact(1, added.id).unwrap().unwrap().details.first_name,
            "Ana"
        );
    }

    #[test]
    fn test_delete_contact_scoped_to_user() {
        let storage = Storage::open_in_memory().unwrap();
        let added = storage.add_contact(1, &details("Ana", "Rivera")).unwrap();

        assert!(!storage.delete_contact(2, added.id).unwrap());
        assert!(storage.delete_contact(1, added.id).unwrap());
        assert!(storage.contacts(1).unwrap().is_empty());
        assert!(!storage.delete_contact(1, added.id).unwrap());
    }
}
