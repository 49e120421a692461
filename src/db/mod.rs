//! SQLite store handles for the two credential databases
//!
//! Store A (`stakeholders.db`) owns the canonical person profile. Store B
//! (`entrysense.db`) owns the link table and the role-specific profiles.
//! They are separate databases on separate connections with no shared
//! transaction manager; the registration coordinator choreographs writes
//! across both.

pub mod access;
pub mod identity;
pub mod schema;

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;
use tracing::{debug, info};

use crate::error::{RegistrarError, StoreSide};

/// Store A: the stakeholders identity database
pub struct IdentityDb {
    conn: Mutex<Connection>,
}

impl IdentityDb {
    /// Open or create the stakeholders store
    pub fn open(db_path: &Path) -> Result<Self, RegistrarError> {
        info!("Opening stakeholders store at {:?}", db_path);
        let conn = open_connection(db_path, StoreSide::Identity)?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.with_conn(schema::init_identity_schema)?;
        Ok(db)
    }

    /// Open an in-memory store (for testing)
    pub fn open_in_memory() -> Result<Self, RegistrarError> {
        debug!("Opening in-memory stakeholders store");
        let conn = open_in_memory_connection(StoreSide::Identity)?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.with_conn(schema::init_identity_schema)?;
        Ok(db)
    }

    /// Run a read operation against the connection
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, RegistrarError>
    where
        F: FnOnce(&Connection) -> Result<T, RegistrarError>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RegistrarError::Internal(format!("Lock poisoned: {}", e)))?;
        f(&conn)
    }

    /// Run a write operation (transactions need a mutable connection)
    pub fn with_conn_mut<F, T>(&self, f: F) -> Result<T, RegistrarError>
    where
        F: FnOnce(&mut Connection) -> Result<T, RegistrarError>,
    {
        let mut conn = self
            .conn
            .lock()
            .map_err(|e| RegistrarError::Internal(format!("Lock poisoned: {}", e)))?;
        f(&mut conn)
    }
}

/// Store B: the entrysense link/role database
pub struct AccessDb {
    conn: Mutex<Connection>,
}

impl AccessDb {
    /// Open or create the entrysense store
    pub fn open(db_path: &Path) -> Result<Self, RegistrarError> {
        info!("Opening entrysense store at {:?}", db_path);
        let conn = open_connection(db_path, StoreSide::Access)?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.with_conn(schema::init_access_schema)?;
        Ok(db)
    }

    /// Open an in-memory store (for testing)
    pub fn open_in_memory() -> Result<Self, RegistrarError> {
        debug!("Opening in-memory entrysense store");
        let conn = open_in_memory_connection(StoreSide::Access)?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.with_conn(schema::init_access_schema)?;
        Ok(db)
    }

    /// Run a read operation against the connection
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, RegistrarError>
    where
        F: FnOnce(&Connection) -> Result<T, RegistrarError>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RegistrarError::Internal(format!("Lock poisoned: {}", e)))?;
        f(&conn)
    }

    /// Run a write operation (transactions need a mutable connection)
    pub fn with_conn_mut<F, T>(&self, f: F) -> Result<T, RegistrarError>
    where
        F: FnOnce(&mut Connection) -> Result<T, RegistrarError>,
    {
        let mut conn = self
            .conn
            .lock()
            .map_err(|e| RegistrarError::Internal(format!("Lock poisoned: {}", e)))?;
        f(&mut conn)
    }
}

fn open_connection(db_path: &Path, store: StoreSide) -> Result<Connection, RegistrarError> {
    let conn = Connection::open(db_path)
        .map_err(|e| RegistrarError::Connection(store, e.to_string()))?;

    // WAL mode for better concurrent read performance
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")
        .map_err(|e| RegistrarError::Internal(format!("Failed to set PRAGMA: {}", e)))?;

    Ok(conn)
}

fn open_in_memory_connection(store: StoreSide) -> Result<Connection, RegistrarError> {
    Connection::open_in_memory().map_err(|e| RegistrarError::Connection(store, e.to_string()))
}

/// Row counts across both stores, surfaced by the health endpoint
#[derive(Debug, Clone, serde::Serialize)]
pub struct StoreStats {
    pub stakeholder_count: u64,
    pub link_count: u64,
}

/// Gather row counts from both stores
pub fn stats(identity: &IdentityDb, access: &AccessDb) -> Result<StoreStats, RegistrarError> {
    let stakeholder_count: i64 = identity.with_conn(|conn| {
        conn.query_row("SELECT COUNT(*) FROM stakeholders", [], |row| row.get(0))
            .map_err(|e| RegistrarError::Internal(format!("Count failed: {}", e)))
    })?;

    let link_count: i64 = access.with_conn(|conn| {
        conn.query_row("SELECT COUNT(*) FROM rfid_info", [], |row| row.get(0))
            .map_err(|e| RegistrarError::Internal(format!("Count failed: {}", e)))
    })?;

    Ok(StoreStats {
        stakeholder_count: stakeholder_count as u64,
        link_count: link_count as u64,
    })
}

// Re-exports
pub use identity::StakeholderRow;
