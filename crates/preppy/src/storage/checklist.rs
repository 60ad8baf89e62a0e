//! Kit selections, progress flags and custom items.
//!
//! Submissions are validated first, then diffed against state read inside
//! the same transaction, and the resulting [`Plan`] is applied before the
//! transaction commits.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use tracing::{debug, info};

use crate::checklist::{union_items, Checklist, CustomItem, VisibleItem};
use crate::error::{Error, Result};
use crate::kit::{CatalogSource, KitType};
use crate::reconcile::{reconcile, reconcile_progress, Operation, Plan};

use super::catalog::catalog_keys_in;
use super::schema::{NO, YES};
use super::Storage;

impl Storage {
    /// Replace the catalog items selected for a kit.
    ///
    /// `keys` is the full set the user wants. Custom items keep their own
    /// selections and are unaffected. Removing an item also clears its
    /// acquired flag for this kit.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` if nothing is submitted or any key is not
    /// a catalog item of the kit, before anything is written. Storage errors
    /// roll the whole submission back.
    pub fn save_selection(&self, user_id: i64, kit: KitType, keys: &[String]) -> Result<Plan> {
        let submitted: BTreeSet<String> = keys.iter().cloned().collect();
        if submitted.is_empty() {
            return Err(Error::invalid(format!(
                "Please select at least one item for your {}.",
                kit.label()
            )));
        }

        let tx = self.write_transaction()?;

        let known = catalog_keys_in(&tx, kit)?;
        let violations: Vec<String> = submitted
            .difference(&known)
            .map(|key| format!("Unknown {kit} item: {key}."))
            .collect();
        Error::check(violations)?;

        let previous = selected_catalog_keys_in(&tx, user_id, kit)?;
        let plan = reconcile(user_id, kit, &previous, &submitted);
        apply_in(&tx, &plan)?;
        tx.commit()?;

        info!(
            "Saved {} selection for user {}: {} added, {} removed",
            kit,
            user_id,
            plan.inserts(),
            plan.deletes()
        );
        Ok(plan)
    }

    /// Record which items of a kit are acquired (supplies) or done (tasks).
    ///
    /// `keys` is the full set of checked items; anything visible in the
    /// checklist and not listed is cleared. The flag of the other supply kit
    /// is never touched.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` if any key is not on the kit's checklist,
    /// before anything is written. Storage errors roll the whole submission
    /// back.
    pub fn save_progress(&self, user_id: i64, kit: KitType, keys: &[String]) -> Result<Plan> {
        let checked: BTreeSet<String> = keys.iter().cloned().collect();

        let tx = self.write_transaction()?;

        let visible: BTreeSet<String> = visible_items_in(&tx, user_id, kit)?
            .into_iter()
            .map(|item| item.key)
            .collect();
        let violations: Vec<String> = checked
            .difference(&visible)
            .map(|key| format!("{key} is not on your {} checklist.", kit.label()))
            .collect();
        Error::check(violations)?;

        let previous = acquired_keys_in(&tx, user_id, kit)?;
        let tracked = tracked_keys_in(&tx, user_id, kit)?;
        let plan = reconcile_progress(user_id, kit, &previous, &checked, &tracked);
        apply_in(&tx, &plan)?;
        tx.commit()?;

        info!(
            "Saved {} progress for user {}: {} operations",
            kit,
            user_id,
            plan.operations.len()
        );
        Ok(plan)
    }

    /// Apply a reconciliation plan atomically.
    ///
    /// # Errors
    ///
    /// Returns an error if any operation fails; none of the plan is kept.
    pub fn apply(&self, plan: &Plan) -> Result<()> {
        let tx = self.write_transaction()?;
        apply_in(&tx, plan)?;
        tx.commit()?;
        Ok(())
    }

    /// Selected catalog items merged with custom items, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn visible_items(&self, user_id: i64, kit: KitType) -> Result<Vec<VisibleItem>> {
        visible_items_in(&self.conn, user_id, kit)
    }

    /// A kit's checklist with acquired flags.
    ///
    /// Returns [`Checklist::NotBuilt`] when the user has neither selected
    /// nor added anything for the kit.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn checklist(&self, user_id: i64, kit: KitType) -> Result<Checklist> {
        let items = visible_items_in(&self.conn, user_id, kit)?;
        let acquired = acquired_keys_in(&self.conn, user_id, kit)?;
        Ok(Checklist::from_visible(items, &acquired))
    }

    /// Keys with a selection record for the kit, catalog and custom alike.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn selected_keys(&self, user_id: i64, kit: KitType) -> Result<BTreeSet<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT item_key FROM selections WHERE user_id = ?1 AND kit = ?2")?;
        let keys = stmt
            .query_map(params![user_id, kit.as_str()], |row| row.get(0))?
            .collect::<std::result::Result<BTreeSet<String>, _>>()?;
        Ok(keys)
    }

    /// Keys whose acquired/done flag is set for the kit.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn acquired_keys(&self, user_id: i64, kit: KitType) -> Result<BTreeSet<String>> {
        acquired_keys_in(&self.conn, user_id, kit)
    }

    /// Add a custom item together with its selection record.
    ///
    /// A catalog item selected later under the same name hides the custom
    /// one from the checklist; it is still listed by [`Self::custom_items`]
    /// and can be removed with [`Self::remove_item`].
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` if an item with the same name is already
    /// on the kit's checklist. Returns an error if the database operation
    /// fails; neither row is kept.
    pub fn add_custom_item(&self, item: &CustomItem) -> Result<()> {
        let tx = self.write_transaction()?;
        let taken = visible_items_in(&tx, item.user_id, item.kit)?
            .iter()
            .any(|visible| visible.name == item.name);
        if taken {
            return Err(Error::invalid(format!(
                "{} is already on your {} checklist.",
                item.name,
                item.kit.label()
            )));
        }
        tx.execute(
            r"
            INSERT INTO custom_items (key, user_id, kit, name, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ",
            params![
                item.key,
                item.user_id,
                item.kit.as_str(),
                item.name,
                item.created_at.to_rfc3339(),
            ],
        )?;
        tx.execute(
            "INSERT INTO selections (user_id, kit, item_key) VALUES (?1, ?2, ?3)",
            params![item.user_id, item.kit.as_str(), item.key],
        )?;
        tx.commit()?;

        info!(
            "Added custom {} item {:?} for user {}",
            item.kit, item.name, item.user_id
        );
        Ok(())
    }

    /// A user's custom items for a kit, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn custom_items(&self, user_id: i64, kit: KitType) -> Result<Vec<CustomItem>> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT key, name, created_at FROM custom_items
            WHERE user_id = ?1 AND kit = ?2
            ORDER BY name, created_at
            ",
        )?;
        let items = stmt
            .query_map(params![user_id, kit.as_str()], |row| {
                let created_at: String = row.get(2)?;
                Ok(CustomItem {
                    user_id,
                    kit,
                    key: row.get(0)?,
                    name: row.get(1)?,
                    created_at: DateTime::parse_from_rfc3339(&created_at)
                        .map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc)),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(items)
    }

    /// Remove an item from a kit.
    ///
    /// Works for catalog and custom keys. Deletes the custom item if there is
    /// one, deletes the selection record and clears the kit's flag, all in one
    /// transaction. Returns `false` if the key was not in the kit.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails; nothing is changed.
    pub fn remove_item(&self, user_id: i64, kit: KitType, key: &str) -> Result<bool> {
        let table = kit.progress_table();
        let column = kit.progress_column();

        let tx = self.write_transaction()?;
        let custom = tx.execute(
            "DELETE FROM custom_items WHERE key = ?1 AND user_id = ?2 AND kit = ?3",
            params![key, user_id, kit.as_str()],
        )?;
        let selections = tx.execute(
            "DELETE FROM selections WHERE user_id = ?1 AND kit = ?2 AND item_key = ?3",
            params![user_id, kit.as_str(), key],
        )?;
        if custom > 0 {
            tx.execute(
                &format!("DELETE FROM {table} WHERE user_id = ?1 AND item_key = ?2"),
                params![user_id, key],
            )?;
        } else {
            tx.execute(
                &format!("UPDATE {table} SET {column} = ?1 WHERE user_id = ?2 AND item_key = ?3"),
                params![NO, user_id, key],
            )?;
        }
        tx.commit()?;

        let removed = custom + selections > 0;
        if removed {
            info!("Removed {} from {} for user {}", key, kit, user_id);
        } else {
            debug!("Nothing to remove for {} in {} for user {}", key, kit, user_id);
        }
        Ok(removed)
    }
}

/// Execute each operation of a plan on the given connection.
///
/// Callers wrap this in a transaction. Inserting a row that already exists
/// and setting a flag on a missing progress row are errors.
fn apply_in(conn: &Connection, plan: &Plan) -> Result<()> {
    let kit = plan.kit.as_str();
    let table = plan.kit.progress_table();
    let column = plan.kit.progress_column();

    for op in &plan.operations {
        let affected = match op {
            Operation::InsertSelection(key) => conn.execute(
                "INSERT INTO selections (user_id, kit, item_key) VALUES (?1, ?2, ?3)",
                params![plan.user_id, kit, key],
            )?,
            Operation::DeleteSelection(key) => conn.execute(
                "DELETE FROM selections WHERE user_id = ?1 AND kit = ?2 AND item_key = ?3",
                params![plan.user_id, kit, key],
            )?,
            Operation::ClearAcquired(key) => conn.execute(
                &format!("UPDATE {table} SET {column} = ?1 WHERE user_id = ?2 AND item_key = ?3"),
                params![NO, plan.user_id, key],
            )?,
            Operation::SetAcquired(key) => {
                let affected = conn.execute(
                    &format!(
                        "UPDATE {table} SET {column} = ?1 WHERE user_id = ?2 AND item_key = ?3"
                    ),
                    params![YES, plan.user_id, key],
                )?;
                if affected == 0 {
                    return Err(Error::internal(format!(
                        "no progress row to update for {key}"
                    )));
                }
                affected
            }
            Operation::InsertProgress(key) => conn.execute(
                &format!("INSERT INTO {table} (user_id, item_key, {column}) VALUES (?1, ?2, ?3)"),
                params![plan.user_id, key, YES],
            )?,
        };
        debug!("{:?} for user {} ({} rows)", op, plan.user_id, affected);
    }

    Ok(())
}

/// Catalog keys selected for a kit; custom item selections are excluded.
fn selected_catalog_keys_in(
    conn: &Connection,
    user_id: i64,
    kit: KitType,
) -> Result<BTreeSet<String>> {
    let mut stmt = conn.prepare(
        r"
        SELECT s.item_key FROM selections s
        WHERE s.user_id = ?1 AND s.kit = ?2
          AND NOT EXISTS (SELECT 1 FROM custom_items c WHERE c.key = s.item_key)
        ",
    )?;
    let keys = stmt
        .query_map(params![user_id, kit.as_str()], |row| row.get(0))?
        .collect::<std::result::Result<BTreeSet<String>, _>>()?;
    Ok(keys)
}

fn acquired_keys_in(conn: &Connection, user_id: i64, kit: KitType) -> Result<BTreeSet<String>> {
    let sql = format!(
        "SELECT item_key FROM {} WHERE user_id = ?1 AND {} = ?2",
        kit.progress_table(),
        kit.progress_column()
    );
    let mut stmt = conn.prepare(&sql)?;
    let keys = stmt
        .query_map(params![user_id, YES], |row| row.get(0))?
        .collect::<std::result::Result<BTreeSet<String>, _>>()?;
    Ok(keys)
}

/// Keys with a progress row of any state in the kit's progress table.
fn tracked_keys_in(conn: &Connection, user_id: i64, kit: KitType) -> Result<BTreeSet<String>> {
    let sql = format!(
        "SELECT item_key FROM {} WHERE user_id = ?1",
        kit.progress_table()
    );
    let mut stmt = conn.prepare(&sql)?;
    let keys = stmt
        .query_map([user_id], |row| row.get(0))?
        .collect::<std::result::Result<BTreeSet<String>, _>>()?;
    Ok(keys)
}

fn visible_items_in(conn: &Connection, user_id: i64, kit: KitType) -> Result<Vec<VisibleItem>> {
    let catalog_sql = match kit.source() {
        CatalogSource::Supplies => {
            r"
            SELECT i.name, i.key FROM selections s
            JOIN supplies i ON i.key = s.item_key
            WHERE s.user_id = ?1 AND s.kit = ?2
            ORDER BY i.id
            "
        }
        CatalogSource::Tasks => {
            r"
            SELECT i.name, i.key FROM selections s
            JOIN tasks i ON i.key = s.item_key
            WHERE s.user_id = ?1 AND s.kit = ?2
            ORDER BY i.id
            "
        }
    };
    let catalog = query_items(conn, catalog_sql, user_id, kit, false)?;
    let custom = query_items(
        conn,
        "SELECT name, key FROM custom_items WHERE user_id = ?1 AND kit = ?2 ORDER BY created_at",
        user_id,
        kit,
        true,
    )?;

    Ok(union_items(catalog, custom))
}

fn query_items(
    conn: &Connection,
    sql: &str,
    user_id: i64,
    kit: KitType,
    custom: bool,
) -> Result<Vec<VisibleItem>> {
    let mut stmt = conn.prepare(sql)?;
    let items = stmt
        .query_map(params![user_id, kit.as_str()], |row| {
            Ok(VisibleItem {
                name: row.get(0)?,
                key: row.get(1)?,
                custom,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(items)
}
