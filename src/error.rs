//! Error types for entrysense-registrar

use std::fmt;

use thiserror::Error;

/// Which of the two credential stores an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreSide {
    /// Store A: the canonical stakeholder profile database.
    Identity,
    /// Store B: the entrysense link + role-record database.
    Access,
}

impl StoreSide {
    pub fn db_name(&self) -> &'static str {
        match self {
            StoreSide::Identity => "stakeholders",
            StoreSide::Access => "entrysense",
        }
    }
}

impl fmt::Display for StoreSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.db_name())
    }
}

#[derive(Error, Debug)]
pub enum RegistrarError {
    #[error("Invalid registration: {0}")]
    Validation(String),

    #[error("RFID {tag} is already registered in the {store} database")]
    Duplicate { tag: String, store: StoreSide },

    #[error("{0} database connection failed: {1}")]
    Connection(StoreSide, String),

    #[error("{store} insert into {table} failed: {message}")]
    Insert {
        store: StoreSide,
        table: &'static str,
        message: String,
    },

    /// The access store committed but the identity store's commit failed.
    /// Compensation has been attempted; the named link id may be orphaned.
    #[error(
        "Partial commit for RFID {tag}: entrysense committed (link id {link_id}) \
         but the stakeholders commit failed: {message}. Compensation was attempted; \
         verify link id {link_id} manually."
    )]
    PartialCommit {
        tag: String,
        link_id: i64,
        message: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RegistrarError {
    /// Map a failed insert on a tag column, treating a uniqueness-constraint
    /// violation as the authoritative duplicate signal (the precheck is
    /// advisory only). Only valid for the inserts keyed by the tag itself;
    /// other tables use [`RegistrarError::insert_failure`].
    pub fn from_insert(
        store: StoreSide,
        table: &'static str,
        tag: &str,
        err: rusqlite::Error,
    ) -> Self {
        if let rusqlite::Error::SqliteFailure(e, _) = &err {
            if e.code == rusqlite::ErrorCode::ConstraintViolation {
                return RegistrarError::Duplicate {
                    tag: tag.to_string(),
                    store,
                };
            }
        }
        RegistrarError::Insert {
            store,
            table,
            message: err.to_string(),
        }
    }

    /// Map a failed insert on a non-tag table. Constraint violations here
    /// are ordinary insert failures, not duplicate credentials.
    pub fn insert_failure(store: StoreSide, table: &'static str, err: rusqlite::Error) -> Self {
        RegistrarError::Insert {
            store,
            table,
            message: err.to_string(),
        }
    }
}
