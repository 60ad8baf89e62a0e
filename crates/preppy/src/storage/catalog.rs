//! Catalog tables: bulk replacement and the joins recommendations read.

use std::collections::{BTreeSet, HashSet};

use rusqlite::{params, Connection};
use serde::Serialize;
use tracing::info;

use crate::catalog::{Applicability, Catalog, State};
use crate::error::Result;
use crate::kit::{CatalogSource, KitType};
use crate::recommend::CandidateRow;

use super::schema::CATALOG_TABLES;
use super::Storage;

/// Row counts of the catalog tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CatalogStats {
    /// Disaster situations.
    pub disasters: i64,
    /// States.
    pub states: i64,
    /// Supplies.
    pub supplies: i64,
    /// Tasks.
    pub tasks: i64,
}

impl CatalogStats {
    /// Whether no catalog has been loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.disasters == 0 && self.supplies == 0 && self.tasks == 0
    }
}

impl Storage {
    /// Replace every catalog table with the given catalog.
    ///
    /// Runs in one transaction. Household, checklist and contact data is not
    /// touched; selections whose keys vanish from the new catalog simply stop
    /// showing up.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog fails validation or a write fails, in
    /// which case the previous catalog is left in place.
    pub fn load_catalog(&self, catalog: &Catalog) -> Result<()> {
        catalog.validate()?;

        let tx = self.write_transaction()?;
        for table in CATALOG_TABLES {
            tx.execute(&format!("DELETE FROM {table}"), [])?;
        }

        {
            let mut stmt =
                tx.prepare("INSERT INTO disasters (id, name, probability) VALUES (?1, ?2, ?3)")?;
            for disaster in &catalog.disasters {
                stmt.execute(params![disaster.id, disaster.name, disaster.probability])?;
            }

            let mut stmt =
                tx.prepare("INSERT INTO states (id, code, full_name) VALUES (?1, ?2, ?3)")?;
            for state in &catalog.states {
                stmt.execute(params![state.id, state.code, state.full_name])?;
            }

            let mut stmt = tx.prepare(
                r"
                INSERT INTO supplies
                    (id, key, name, per_person, go_bag, shelter, adult, senior, child, pet)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                ",
            )?;
            for supply in &catalog.supplies {
                stmt.execute(params![
                    supply.id,
                    supply.key,
                    supply.name,
                    supply.per_person,
                    supply.go_bag,
                    supply.shelter,
                    supply.adult,
                    supply.senior,
                    supply.child,
                    supply.pet,
                ])?;
            }

            let mut stmt = tx.prepare(
                r"
                INSERT INTO tasks (id, key, name, description, adult, senior, child, pet)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                ",
            )?;
            for task in &catalog.tasks {
                stmt.execute(params![
                    task.id,
                    task.key,
                    task.name,
                    task.description,
                    task.adult,
                    task.senior,
                    task.child,
                    task.pet,
                ])?;
            }

            let mut stmt = tx
                .prepare("INSERT INTO disaster_supplies (disaster_id, supply_id) VALUES (?1, ?2)")?;
            for link in &catalog.disaster_supplies {
                stmt.execute(params![link.disaster_id, link.item_id])?;
            }

            let mut stmt =
                tx.prepare("INSERT INTO disaster_tasks (disaster_id, task_id) VALUES (?1, ?2)")?;
            for link in &catalog.disaster_tasks {
                stmt.execute(params![link.disaster_id, link.item_id])?;
            }

            let mut stmt = tx
                .prepare("INSERT INTO state_disasters (state_id, disaster_id) VALUES (?1, ?2)")?;
            for link in &catalog.state_disasters {
                stmt.execute(params![link.state_id, link.disaster_id])?;
            }
        }

        tx.commit()?;
        info!(
            "Catalog replaced: {} disasters, {} states, {} supplies, {} tasks",
            catalog.disasters.len(),
            catalog.states.len(),
            catalog.supplies.len(),
            catalog.tasks.len()
        );
        Ok(())
    }

    /// All states, ordered by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn states(&self) -> Result<Vec<State>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, code, full_name FROM states ORDER BY code")?;
        let states = stmt
            .query_map([], |row| {
                Ok(State {
                    id: row.get(0)?,
                    code: row.get(1)?,
                    full_name: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(states)
    }

    /// Known state codes, ordered.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn state_codes(&self) -> Result<Vec<String>> {
        Ok(self.states()?.into_iter().map(|s| s.code).collect())
    }

    /// Count the rows of each catalog table.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn catalog_stats(&self) -> Result<CatalogStats> {
        Ok(CatalogStats {
            disasters: self.count_rows("disasters")?,
            states: self.count_rows("states")?,
            supplies: self.count_rows("supplies")?,
            tasks: self.count_rows("tasks")?,
        })
    }

    /// The disaster × item join for a kit's catalog.
    ///
    /// Rows come back ordered by disaster probability, disaster id, then item
    /// id. Task rows carry `false` supply flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn candidate_rows(&self, kit: KitType) -> Result<Vec<CandidateRow>> {
        let sql = match kit.source() {
            CatalogSource::Supplies => {
                r"
                SELECT d.id, d.name, d.probability, s.key, s.name,
                       s.adult, s.senior, s.child, s.pet, s.go_bag, s.shelter
                FROM disasters d
                JOIN disaster_supplies ds ON ds.disaster_id = d.id
                JOIN supplies s ON s.id = ds.supply_id
                ORDER BY d.probability, d.id, s.id
                "
            }
            CatalogSource::Tasks => {
                r"
                SELECT d.id, d.name, d.probability, t.key, t.name,
                       t.adult, t.senior, t.child, t.pet, 0, 0
                FROM disasters d
                JOIN disaster_tasks dt ON dt.disaster_id = d.id
                JOIN tasks t ON t.id = dt.task_id
                ORDER BY d.probability, d.id, t.id
                "
            }
        };

        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(CandidateRow {
                    disaster_id: row.get(0)?,
                    disaster: row.get(1)?,
                    probability: row.get(2)?,
                    item_key: row.get(3)?,
                    item_name: row.get(4)?,
                    applicability: Applicability {
                        adult: row.get(5)?,
                        senior: row.get(6)?,
                        child: row.get(7)?,
                        pet: row.get(8)?,
                    },
                    go_bag: row.get(9)?,
                    shelter: row.get(10)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Ids of the disasters linked to a state.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn home_disaster_ids(&self, state_code: &str) -> Result<HashSet<i64>> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT sd.disaster_id
            FROM state_disasters sd
            JOIN states s ON s.id = sd.state_id
            WHERE s.code = ?1
            ",
        )?;
        let ids = stmt
            .query_map([state_code], |row| row.get(0))?
            .collect::<std::result::Result<HashSet<i64>, _>>()?;
        Ok(ids)
    }
}

/// Catalog keys admitted by a kit, read through any connection or transaction.
pub(crate) fn catalog_keys_in(conn: &Connection, kit: KitType) -> Result<BTreeSet<String>> {
    let sql = match kit {
        KitType::GoBag => "SELECT key FROM supplies WHERE go_bag = 1",
        KitType::Shelter => "SELECT key FROM supplies WHERE shelter = 1",
        KitType::Task => "SELECT key FROM tasks",
    };
    let mut stmt = conn.prepare(sql)?;
    let keys = stmt
        .query_map([], |row| row.get(0))?
        .collect::<std::result::Result<BTreeSet<String>, _>>()?;
    Ok(keys)
}
