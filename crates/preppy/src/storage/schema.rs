//! `SQLite` schema definitions for preppy.
//!
//! Statements are grouped by the schema version that introduced them; see
//! [`super::migrations`] for how they are applied.

/// Value stored in acquired/done flag columns when set.
pub const YES: &str = "Yes";

/// Value stored in acquired/done flag columns when clear.
pub const NO: &str = "No";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// Version 1: catalog reference data.
pub const CATALOG_STATEMENTS: &[&str] = &[
    r"
    CREATE TABLE IF NOT EXISTS disasters (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        probability INTEGER NOT NULL
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS states (
        id INTEGER PRIMARY KEY,
        code TEXT NOT NULL UNIQUE,
        full_name TEXT NOT NULL UNIQUE
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS supplies (
        id INTEGER PRIMARY KEY,
        key TEXT NOT NULL UNIQUE,
        name TEXT NOT NULL,
        per_person REAL,
        go_bag INTEGER NOT NULL DEFAULT 0,
        shelter INTEGER NOT NULL DEFAULT 0,
        adult INTEGER NOT NULL DEFAULT 0,
        senior INTEGER NOT NULL DEFAULT 0,
        child INTEGER NOT NULL DEFAULT 0,
        pet INTEGER NOT NULL DEFAULT 0
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS tasks (
        id INTEGER PRIMARY KEY,
        key TEXT NOT NULL UNIQUE,
        name TEXT NOT NULL,
        description TEXT,
        adult INTEGER NOT NULL DEFAULT 1,
        senior INTEGER NOT NULL DEFAULT 1,
        child INTEGER NOT NULL DEFAULT 1,
        pet INTEGER NOT NULL DEFAULT 1
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS disaster_supplies (
        disaster_id INTEGER NOT NULL,
        supply_id INTEGER NOT NULL,
        PRIMARY KEY (disaster_id, supply_id)
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS disaster_tasks (
        disaster_id INTEGER NOT NULL,
        task_id INTEGER NOT NULL,
        PRIMARY KEY (disaster_id, task_id)
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS state_disasters (
        state_id INTEGER NOT NULL,
        disaster_id INTEGER NOT NULL,
        PRIMARY KEY (state_id, disaster_id)
    )
    ",
];

/// Version 2: households, selections, progress and custom items.
pub const CHECKLIST_STATEMENTS: &[&str] = &[
    r"
    CREATE TABLE IF NOT EXISTS households (
        user_id INTEGER PRIMARY KEY,
        last_name TEXT NOT NULL,
        adults INTEGER NOT NULL DEFAULT 0,
        seniors INTEGER NOT NULL DEFAULT 0,
        children INTEGER NOT NULL DEFAULT 0,
        pets INTEGER NOT NULL DEFAULT 0,
        state_code TEXT,
        special_needs TEXT NOT NULL DEFAULT 'No',
        updated_at TEXT NOT NULL
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS selections (
        user_id INTEGER NOT NULL,
        kit TEXT NOT NULL CHECK (kit IN ('go-bag', 'shelter', 'task')),
        item_key TEXT NOT NULL,
        PRIMARY KEY (user_id, kit, item_key)
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS saved_supplies (
        user_id INTEGER NOT NULL,
        item_key TEXT NOT NULL,
        go_bag TEXT NOT NULL DEFAULT 'No' CHECK (go_bag IN ('Yes', 'No')),
        shelter TEXT NOT NULL DEFAULT 'No' CHECK (shelter IN ('Yes', 'No')),
        PRIMARY KEY (user_id, item_key)
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS saved_tasks (
        user_id INTEGER NOT NULL,
        item_key TEXT NOT NULL,
        done TEXT NOT NULL DEFAULT 'No' CHECK (done IN ('Yes', 'No')),
        PRIMARY KEY (user_id, item_key)
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS custom_items (
        key TEXT PRIMARY KEY,
        user_id INTEGER NOT NULL,
        kit TEXT NOT NULL CHECK (kit IN ('go-bag', 'shelter', 'task')),
        name TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    ",
    r"
    CREATE INDEX IF NOT EXISTS idx_custom_items_user_kit ON custom_items(user_id, kit)
    ",
];

/// Version 3: emergency contacts.
pub const CONTACT_STATEMENTS: &[&str] = &[
    r"
    CREATE TABLE IF NOT EXISTS contacts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        first_name TEXT NOT NULL DEFAULT '',
        last_name TEXT NOT NULL DEFAULT '',
        phone TEXT NOT NULL DEFAULT '',
        email TEXT NOT NULL DEFAULT '',
        address TEXT NOT NULL DEFAULT ''
    )
    ",
    r"
    CREATE INDEX IF NOT EXISTS idx_contacts_user ON contacts(user_id)
    ",
];

/// Version 4: medical records and medical providers.
pub const HEALTH_STATEMENTS: &[&str] = &[
    r"
    CREATE TABLE IF NOT EXISTS medical_records (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL DEFAULT '',
        blood_type TEXT NOT NULL,
        medications TEXT NOT NULL DEFAULT '',
        allergies TEXT NOT NULL DEFAULT '',
        other TEXT NOT NULL DEFAULT '',
        insurance TEXT NOT NULL DEFAULT '',
        policy TEXT NOT NULL DEFAULT ''
    )
    ",
    r"
    CREATE INDEX IF NOT EXISTS idx_medical_records_user ON medical_records(user_id)
    ",
    r"
    CREATE TABLE IF NOT EXISTS providers (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        first_name TEXT NOT NULL DEFAULT '',
        last_name TEXT NOT NULL,
        patient TEXT NOT NULL DEFAULT '',
        phone TEXT NOT NULL,
        address TEXT NOT NULL
    )
    ",
    r"
    CREATE INDEX IF NOT EXISTS idx_providers_user ON providers(user_id)
    ",
];

/// Version 5: routine schedule members and their events.
pub const ROUTINE_STATEMENTS: &[&str] = &[
    r"
    CREATE TABLE IF NOT EXISTS routine_members (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        name TEXT NOT NULL
    )
    ",
    r"
    CREATE INDEX IF NOT EXISTS idx_routine_members_user ON routine_members(user_id)
    ",
    r"
    CREATE TABLE IF NOT EXISTS routine_events (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        member_id INTEGER NOT NULL REFERENCES routine_members(id),
        title TEXT NOT NULL DEFAULT '',
        start_day TEXT NOT NULL,
        start_time TEXT NOT NULL,
        end_day TEXT NOT NULL,
        end_time TEXT NOT NULL,
        address TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT ''
    )
    ",
    r"
    CREATE INDEX IF NOT EXISTS idx_routine_events_member ON routine_events(member_id)
    ",
];

/// Version 6: evacuation meet-up points.
pub const MEETUP_STATEMENTS: &[&str] = &[r"
    CREATE TABLE IF NOT EXISTS meetup_points (
        user_id INTEGER NOT NULL,
        latitude REAL NOT NULL CHECK (latitude BETWEEN -90 AND 90),
        longitude REAL NOT NULL CHECK (longitude BETWEEN -180 AND 180),
        title TEXT NOT NULL DEFAULT '',
        PRIMARY KEY (user_id, latitude, longitude)
    )
    "];

/// Catalog tables, in the order they are cleared and refilled.
pub const CATALOG_TABLES: &[&str] = &[
    "disasters",
    "states",
    "supplies",
    "tasks",
    "disaster_supplies",
    "disaster_tasks",
    "state_disasters",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statements_not_empty() {
        for stmt in CATALOG_STATEMENTS
            .iter()
            .chain(CHECKLIST_STATEMENTS)
            .chain(CONTACT_STATEMENTS)
            .chain(HEALTH_STATEMENTS)
            .chain(ROUTINE_STATEMENTS)
            .chain(MEETUP_STATEMENTS)
        {
            assert!(!stmt.trim().is_empty());
        }
    }

    #[test]
    fn test_flag_columns_are_constrained() {
        let saved_supplies = CHECKLIST_STATEMENTS
            .iter()
            .find(|s| s.contains("saved_supplies"))
            .unwrap();
        assert!(saved_supplies.contains("go_bag TEXT NOT NULL DEFAULT 'No'"));
        assert!(saved_supplies.contains("shelter TEXT NOT NULL DEFAULT 'No'"));
    }

    #[test]
    fn test_selections_unique_per_kit() {
        let selections = CHECKLIST_STATEMENTS
            .iter()
            .find(|s| s.contains("TABLE IF NOT EXISTS selections"))
            .unwrap();
        assert!(selections.contains("PRIMARY KEY (user_id, kit, item_key)"));
    }

    #[test]
    fn test_blood_type_required() {
        let medical = HEALTH_STATEMENTS
            .iter()
            .find(|s| s.contains("TABLE IF NOT EXISTS medical_records"))
            .unwrap();
        assert!(medical.contains("blood_type TEXT NOT NULL,"));
    }

    #[test]
    fn test_meetup_points_keyed_by_coordinates() {
        assert!(MEETUP_STATEMENTS[0].contains("PRIMARY KEY (user_id, latitude, longitude)"));
    }

    #[test]
    fn test_every_catalog_table_is_created() {
        for table in CATALOG_TABLES {
            let create = format!("CREATE TABLE IF NOT EXISTS {table} (");
            assert!(
                CATALOG_STATEMENTS.iter().any(|s| s.contains(&create)),
                "missing {table}"
            );
        }
    }

    #[test]
    fn test_create_metadata_table_structure() {
        assert!(CREATE_METADATA_TABLE.contains("key TEXT PRIMARY KEY"));
        assert!(CREATE_METADATA_TABLE.contains("value TEXT NOT NULL"));
    }
}
