//! Routine schedule members and events.
//!
//! Events belong to a member, and members to a user; every event query joins
//! through the member so a user only ever sees or changes their own events.

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::routine::{Event, EventDetails, Member};

use super::Storage;

const SELECT_EVENT: &str = r"
    SELECT e.id, e.member_id, e.title, e.start_day, e.start_time, e.end_day, e.end_time,
           e.address, e.description
    FROM routine_events e
    JOIN routine_members m ON m.id = e.member_id
";

impl Storage {
    /// Add a household member to the routine schedule. `name` should
    /// already be checked with [`crate::routine::member_name`].
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn add_member(&self, user_id: i64, name: &str) -> Result<Member> {
        self.conn.execute(
            "INSERT INTO routine_members (user_id, name) VALUES (?1, ?2)",
            params![user_id, name],
        )?;
        let id = self.conn.last_insert_rowid();
        info!("Added routine member {} for user {}", id, user_id);
        Ok(Member {
            id,
            user_id,
            name: name.to_string(),
        })
    }

    /// A user's schedule members, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn members(&self, user_id: i64) -> Result<Vec<Member>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, name FROM routine_members WHERE user_id = ?1 ORDER BY name, id",
        )?;
        let members = stmt
            .query_map([user_id], |row| {
                Ok(Member {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    name: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(members)
    }

    /// Remove a member and all of their events.
    ///
    /// Returns `false` if the user has no member with that id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails; nothing is removed.
    pub fn remove_member(&self, user_id: i64, id: i64) -> Result<bool> {
        let tx = self.write_transaction()?;
        if !member_belongs_to(&tx, user_id, id)? {
            return Ok(false);
        }
        let events = tx.execute("DELETE FROM routine_events WHERE member_id = ?1", [id])?;
        tx.execute("DELETE FROM routine_members WHERE id = ?1", [id])?;
        tx.commit()?;

        info!(
            "Removed routine member {} and {} events for user {}",
            id, events, user_id
        );
        Ok(true)
    }

    /// Add an event for one of the user's members.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` if the member is not the user's. Returns
    /// an error if the database operation fails.
    pub fn add_event(&self, user_id: i64, details: &EventDetails) -> Result<Event> {
        let tx = self.write_transaction()?;
        require_member(&tx, user_id, details.member_id)?;
        tx.execute(
            r"
            INSERT INTO routine_events (member_id, title, start_day, start_time, end_day,
                end_time, address, description)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ",
            params![
                details.member_id,
                details.title,
                details.start_day,
                details.start_time,
                details.end_day,
                details.end_time,
                details.address,
                details.description,
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        info!("Added routine event {} for user {}", id, user_id);
        Ok(Event {
            id,
            details: details.clone(),
        })
    }

    /// A user's events across all members, in start order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn events(&self, user_id: i64) -> Result<Vec<Event>> {
        let mut stmt = self.conn.prepare(&format!(
            "{SELECT_EVENT} WHERE m.user_id = ?1 ORDER BY e.start_day, e.start_time, e.id"
        ))?;
        let events = stmt
            .query_map([user_id], Self::row_to_event)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(events)
    }

    /// One of a user's events.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn event(&self, user_id: i64, id: i64) -> Result<Option<Event>> {
        let result = self
            .conn
            .query_row(
                &format!("{SELECT_EVENT} WHERE e.id = ?1 AND m.user_id = ?2"),
                [id, user_id],
                Self::row_to_event,
            )
            .optional()?;
        Ok(result)
    }

    /// Overwrite an event, possibly moving it to another of the user's members.
    ///
    /// Returns `false` if the user has no event with that id.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` if the new member is not the user's.
    /// Returns an error if the database operation fails.
    pub fn update_event(&self, user_id: i64, id: i64, details: &EventDetails) -> Result<bool> {
        let tx = self.write_transaction()?;
        require_member(&tx, user_id, details.member_id)?;
        let affected = tx.execute(
            r"
            UPDATE routine_events
            SET member_id = ?1, title = ?2, start_day = ?3, start_time = ?4, end_day = ?5,
                end_time = ?6, address = ?7, description = ?8
            WHERE id = ?9
              AND member_id IN (SELECT id FROM routine_members WHERE user_id = ?10)
            ",
            params![
                details.member_id,
                details.title,
                details.start_day,
                details.start_time,
                details.end_day,
                details.end_time,
                details.address,
                details.description,
                id,
                user_id,
            ],
        )?;
        tx.commit()?;

        debug!("Updated routine event {} for user {}: {} rows", id, user_id, affected);
        Ok(affected > 0)
    }

    /// Delete an event.
    ///
    /// Returns `false` if the user has no event with that id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_event(&self, user_id: i64, id: i64) -> Result<bool> {
        let affected = self.conn.execute(
            r"
            DELETE FROM routine_events
            WHERE id = ?1
              AND member_id IN (SELECT id FROM routine_members WHERE user_id = ?2)
            ",
            [id, user_id],
        )?;
        if affected > 0 {
            info!("Deleted routine event {} for user {}", id, user_id);
        }
        Ok(affected > 0)
    }

    fn row_to_event(row: &rusqlite::Row) -> rusqlite::Result<Event> {
        Ok(Event {
            id: row.get(0)?,
            details: EventDetails {
                member_id: row.get(1)?,
                title: row.get(2)?,
                start_day: row.get(3)?,
                start_time: row.get(4)?,
                end_day: row.get(5)?,
                end_time: row.get(6)?,
                address: row.get(7)?,
                description: row.get(8)?,
            },
        })
    }
}

fn member_belongs_to(conn: &Connection, user_id: i64, member_id: i64) -> Result<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM routine_members WHERE id = ?1 AND user_id = ?2",
            [member_id, user_id],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

fn require_member(conn: &Connection, user_id: i64, member_id: i64) -> Result<()> {
    if member_belongs_to(conn, user_id, member_id)? {
        Ok(())
    } else {
        Err(Error::invalid(format!(
            "No household member {member_id} on your schedule."
        )))
    }
}
