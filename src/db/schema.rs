//! Schema definitions for both credential stores
//!
//! The two stores are deliberately independent databases with no shared
//! constraints; the only cross-store invariant (a globally unique RFID)
//! is enforced by a UNIQUE column in each store plus the precheck.

use rusqlite::Connection;
use tracing::info;

use crate::error::{RegistrarError, StoreSide};

/// Current schema version for migrations
pub const SCHEMA_VERSION: i32 = 1;

/// Initialize the stakeholders (identity) store schema
pub fn init_identity_schema(conn: &Connection) -> Result<(), RegistrarError> {
    init_schema(conn, StoreSide::Identity, STAKEHOLDERS_SCHEMA)
}

/// Initialize the entrysense (link/role) store schema
pub fn init_access_schema(conn: &Connection) -> Result<(), RegistrarError> {
    init_schema(conn, StoreSide::Access, ENTRYSENSE_SCHEMA)
}

fn init_schema(conn: &Connection, store: StoreSide, tables: &str) -> Result<(), RegistrarError> {
    let current_version = get_schema_version(conn, store)?;

    if current_version == 0 {
        info!(store = %store, "Creating new schema v{}", SCHEMA_VERSION);
        conn.execute_batch(tables).map_err(|e| {
            RegistrarError::Internal(format!("Failed to create {} tables: {}", store, e))
        })?;
        set_schema_version(conn, store, SCHEMA_VERSION)?;
    } else if current_version < SCHEMA_VERSION {
        info!(
            store = %store,
            "Migrating schema from v{} to v{}", current_version, SCHEMA_VERSION
        );
        migrate_schema(conn, store, current_version)?;
    }

    Ok(())
}

/// Get current schema version (0 if not initialized)
fn get_schema_version(conn: &Connection, store: StoreSide) -> Result<i32, RegistrarError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL)",
        [],
    )
    .map_err(|e| {
        RegistrarError::Internal(format!(
            "Failed to create {} schema_version table: {}",
            store, e
        ))
    })?;

    let version: i32 = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get(0)
        })
        .unwrap_or(0);

    Ok(version)
}

fn set_schema_version(
    conn: &Connection,
    store: StoreSide,
    version: i32,
) -> Result<(), RegistrarError> {
    conn.execute("DELETE FROM schema_version", []).map_err(|e| {
        RegistrarError::Internal(format!("Failed to clear {} schema_version: {}", store, e))
    })?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?)", [version])
        .map_err(|e| {
            RegistrarError::Internal(format!("Failed to set {} schema_version: {}", store, e))
        })?;
    Ok(())
}

fn migrate_schema(
    conn: &Connection,
    store: StoreSide,
    _from_version: i32,
) -> Result<(), RegistrarError> {
    // No migrations yet; branch on _from_version here once SCHEMA_VERSION
    // moves past 1.
    set_schema_version(conn, store, SCHEMA_VERSION)
}

/// Store A: canonical person profiles, one row per registered credential.
/// The UNIQUE rfid column is the authoritative duplicate guard for this store.
const STAKEHOLDERS_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS stakeholders (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    rfid TEXT NOT NULL UNIQUE,
    role TEXT NOT NULL,
    photo TEXT NOT NULL DEFAULT '',
    first_name TEXT NOT NULL,
    middle_initial TEXT NOT NULL DEFAULT '',
    last_name TEXT NOT NULL,
    department TEXT NOT NULL DEFAULT '',
    course_or_position TEXT NOT NULL DEFAULT '',
    address TEXT NOT NULL DEFAULT '',
    contact_number TEXT NOT NULL DEFAULT '',
    birthdate TEXT NOT NULL DEFAULT '',
    height TEXT NOT NULL DEFAULT '',
    weight TEXT NOT NULL DEFAULT '',
    gender TEXT NOT NULL DEFAULT '',
    civil_status TEXT NOT NULL DEFAULT '',
    emergency_contact TEXT NOT NULL DEFAULT '',
    emergency_address TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_stakeholders_role ON stakeholders(role);
"#;

/// Store B: the rfid_info link table plus one table per role profile and the
/// per-role cross-link tables tying link ids to generated role identifiers.
const ENTRYSENSE_SCHEMA: &str = r#"
-- Link table; the store-assigned id keys the generated role identifier
CREATE TABLE IF NOT EXISTS rfid_info (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    rfid_uid TEXT NOT NULL UNIQUE,
    role TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS student (
    student_id TEXT PRIMARY KEY NOT NULL,
    first_name TEXT NOT NULL,
    middle_name TEXT NOT NULL DEFAULT '',
    last_name TEXT NOT NULL,
    department TEXT NOT NULL DEFAULT '',
    course TEXT NOT NULL DEFAULT '',
    photo TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS employee (
    employee_id TEXT PRIMARY KEY NOT NULL,
    first_name TEXT NOT NULL,
    middle_name TEXT NOT NULL DEFAULT '',
    last_name TEXT NOT NULL,
    department TEXT NOT NULL DEFAULT '',
    position TEXT NOT NULL DEFAULT '',
    photo TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS guest (
    guest_id TEXT PRIMARY KEY NOT NULL,
    first_name TEXT NOT NULL,
    middle_name TEXT NOT NULL DEFAULT '',
    last_name TEXT NOT NULL,
    purpose TEXT NOT NULL DEFAULT '',
    photo TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS rfid_student_info (
    rfid_id INTEGER NOT NULL,
    student_id TEXT NOT NULL,
    PRIMARY KEY (rfid_id, student_id),
    FOREIGN KEY (rfid_id) REFERENCES rfid_info(id) ON DELETE CASCADE,
    FOREIGN KEY (student_id) REFERENCES student(student_id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS rfid_employee_info (
    rfid_id INTEGER NOT NULL,
    employee_id TEXT NOT NULL,
    PRIMARY KEY (rfid_id, employee_id),
    FOREIGN KEY (rfid_id) REFERENCES rfid_info(id) ON DELETE CASCADE,
    FOREIGN KEY (employee_id) REFERENCES employee(employee_id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS rfid_guest_info (
    rfid_id INTEGER NOT NULL,
    guest_id TEXT NOT NULL,
    PRIMARY KEY (rfid_id, guest_id),
    FOREIGN KEY (rfid_id) REFERENCES rfid_info(id) ON DELETE CASCADE,
    FOREIGN KEY (guest_id) REFERENCES guest(guest_id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_rfid_info_role ON rfid_info(role);
"#;
