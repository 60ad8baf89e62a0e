//! Evacuation meet-up points, scoped to their owning user.

use rusqlite::{params, Connection};
use tracing::{debug, info};

use crate::error::Result;
use crate::evacuation::{plan_meetup_points, MeetupPlan, MeetupPoint};

use super::Storage;

impl Storage {
    /// A user's meet-up points, ordered by title then position.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn meetup_points(&self, user_id: i64) -> Result<Vec<MeetupPoint>> {
        meetup_points_in(&self.conn, user_id)
    }

    /// Replace a user's meet-up points with the submitted set.
    ///
    /// Points are matched by coordinates: missing ones are removed, new ones
    /// added and changed titles updated, all in one transaction. Points
    /// should already be validated.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` if the same coordinates are submitted
    /// twice, before anything is written. Storage errors roll the whole
    /// submission back.
    pub fn save_meetup_points(&self, user_id: i64, points: &[MeetupPoint]) -> Result<MeetupPlan> {
        let tx = self.write_transaction()?;
        let stored = meetup_points_in(&tx, user_id)?;
        let plan = plan_meetup_points(&stored, points)?;

        for point in &plan.remove {
            tx.execute(
                "DELETE FROM meetup_points WHERE user_id = ?1 AND latitude = ?2 AND longitude = ?3",
                params![user_id, point.latitude, point.longitude],
            )?;
            debug!("Removed meet-up point {} for user {}", point, user_id);
        }
        for point in &plan.retitle {
            tx.execute(
                r"
                UPDATE meetup_points SET title = ?4
                WHERE user_id = ?1 AND latitude = ?2 AND longitude = ?3
                ",
                params![user_id, point.latitude, point.longitude, point.title],
            )?;
        }
        for point in &plan.add {
            insert_point(&tx, user_id, point)?;
        }
        tx.commit()?;

        info!(
            "Saved meet-up points for user {}: {} added, {} removed, {} retitled",
            user_id,
            plan.add.len(),
            plan.remove.len(),
            plan.retitle.len()
        );
        Ok(plan)
    }

    /// Add a meet-up point, or retitle the one already at those coordinates.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn add_meetup_point(&self, user_id: i64, point: &MeetupPoint) -> Result<()> {
        self.conn.execute(
            r"
            INSERT INTO meetup_points (user_id, latitude, longitude, title)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(user_id, latitude, longitude) DO UPDATE SET title = excluded.title
            ",
            params![user_id, point.latitude, point.longitude, point.title],
        )?;
        info!("Saved meet-up point {} for user {}", point, user_id);
        Ok(())
    }

    /// Remove the meet-up point at the given coordinates.
    ///
    /// Returns `false` if the user has no point there.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn remove_meetup_point(&self, user_id: i64, latitude: f64, longitude: f64) -> Result<bool> {
        let affected = self.conn.execute(
            "DELETE FROM meetup_points WHERE user_id = ?1 AND latitude = ?2 AND longitude = ?3",
            params![user_id, latitude, longitude],
        )?;
        Ok(affected > 0)
    }
}

fn insert_point(conn: &Connection, user_id: i64, point: &MeetupPoint) -> Result<()> {
    conn.execute(
        "INSERT INTO meetup_points (user_id, latitude, longitude, title) VALUES (?1, ?2, ?3, ?4)",
        params![user_id, point.latitude, point.longitude, point.title],
    )?;
    Ok(())
}

fn meetup_points_in(conn: &Connection, user_id: i64) -> Result<Vec<MeetupPoint>> {
    let mut stmt = conn.prepare(
        r"
        SELECT latitude, longitude, title FROM meetup_points
        WHERE user_id = ?1
        ORDER BY title, latitude, longitude
        ",
    )?;
    let points = stmt
        .query_map([user_id], |row| {
            Ok(MeetupPoint {
                latitude: row.get(0)?,
                longitude: row.get(1)?,
                title: row.get(2)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(latitude: f64, longitude: f64, title: &str) -> MeetupPoint {
        MeetupPoint {
            latitude,
            longitude,
            title: title.to_string(),
        }
    }

    #[test]
    fn test_save_meetup_points_replaces_set() {
        let storage = Storage::open_in_memory().unwrap();
        let first = [
            point(37.77, -122.42, "City Hall"),
            point(37.8, -122.4, "Pier"),
        ];
        storage.save_meetup_points(1, &first).unwrap();

        let plan = storage
            .save_meetup_points(
                1,
                &[point(37.8, -122.4, "Pier 39"), point(37.76, -122.44, "Park")],
            )
            .unwrap();
        assert_eq!(plan.remove.len(), 1);
        assert_eq!(plan.add.len(), 1);
        assert_eq!(plan.retitle.len(), 1);

        let titles: Vec<_> = storage
            .meetup_points(1)
            .unwrap()
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(titles, vec!["Park", "Pier 39"]);
    }

    #[test]
    fn test_resaving_same_points_is_noop() {
        let storage = Storage::open_in_memory().unwrap();
        let points = [point(-33.9, 18.4, "Beach")];
        storage.save_meetup_points(1, &points).unwrap();

        let stored = storage.meetup_points(1).unwrap();
        assert_eq!(stored, points);
        assert!(storage.save_meetup_points(1, &stored).unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_submission_writes_nothing() {
        let storage = Storage::open_in_memory().unwrap();
        storage.save_meetup_points(1, &[point(1.0, 1.0, "A")]).unwrap();

        let err = storage
            .save_meetup_points(1, &[point(2.0, 2.0, "B"), point(2.0, 2.0, "C")])
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(storage.meetup_points(1).unwrap(), vec![point(1.0, 1.0, "A")]);
    }

    #[test]
    fn test_points_scoped_to_user() {
        let storage = Storage::open_in_memory().unwrap();
        storage.save_meetup_points(1, &[point(1.0, 1.0, "A")]).unwrap();
        storage.save_meetup_points(2, &[]).unwrap();

        assert_eq!(storage.meetup_points(1).unwrap().len(), 1);
        assert!(!storage.remove_meetup_point(2, 1.0, 1.0).unwrap());
        assert!(storage.remove_meetup_point(1, 1.0, 1.0).unwrap());
    }

    #[test]
    fn test_add_meetup_point_retitles_existing() {
        let storage = Storage::open_in_memory().unwrap();
        storage.add_meetup_point(1, &point(1.0, 1.0, "Old")).unwrap();
        storage.add_meetup_point(1, &point(1.0, 1.0, "New")).unwrap();

        assert_eq!(storage.meetup_points(1).unwrap(), vec![point(1.0, 1.0, "New")]);
    }
}
