//! Dual-store transaction coordinator
//!
//! Registers a credential across both stores using one local transaction per
//! store: insert into stakeholders, insert link + role rows into entrysense,
//! commit entrysense, then commit stakeholders. Any failure before the first
//! commit rolls both transactions back (rusqlite rolls back on drop). The one
//! non-atomic window is between the two commits; if the stakeholders commit
//! fails there, compensating deletes undo the rows entrysense just committed.

use std::sync::Arc;

use rusqlite::Connection;
use tracing::{info, warn};

use crate::db::{access, identity, AccessDb, IdentityDb};
use crate::error::{RegistrarError, StoreSide};

use super::precheck;
use super::request::{validate, Registration, RegistrationRequest, RegistrationResponse};
use super::roles::build_role_record;

/// Outcome of a successful registration
#[derive(Debug, Clone)]
pub struct Registered {
    pub rfid: String,
    pub link_id: i64,
    /// Generated role identifier; absent for unrecognized roles
    pub generated_id: Option<String>,
}

/// The registration coordinator. Holds no state between requests beyond the
/// two store handles; all durable state lives in the stores.
pub struct Registrar {
    identity_db: Arc<IdentityDb>,
    access_db: Arc<AccessDb>,
}

impl Registrar {
    pub fn new(identity_db: Arc<IdentityDb>, access_db: Arc<AccessDb>) -> Self {
        Self {
            identity_db,
            access_db,
        }
    }

    /// Register a credential. Every error is translated into the response
    /// message here; nothing propagates past this boundary.
    pub fn register(&self, request: RegistrationRequest) -> RegistrationResponse {
        match self.try_register(request) {
            Ok(registered) => {
                info!(
                    rfid = %registered.rfid,
                    link_id = registered.link_id,
                    generated_id = registered.generated_id.as_deref().unwrap_or("-"),
                    "Registration committed in both stores"
                );
                let message = match &registered.generated_id {
                    Some(id) => format!(
                        "Stakeholder registered successfully in both databases. Assigned ID: {}",
                        id
                    ),
                    None => "Stakeholder registered successfully in both databases. \
                             No role profile was created for this role."
                        .to_string(),
                };
                RegistrationResponse::ok(message)
            }
            Err(err) => {
                warn!(error = %err, "Registration failed");
                RegistrationResponse::failed(err.to_string())
            }
        }
    }

    fn try_register(&self, request: RegistrationRequest) -> Result<Registered, RegistrarError> {
        let registration = validate(request)?;

        precheck::check_available(&self.identity_db, &self.access_db, &registration.rfid)?;

        self.identity_db.with_conn_mut(|identity_conn| {
            self.access_db
                .with_conn_mut(|access_conn| register_in_both(identity_conn, access_conn, &registration))
        })
    }
}

/// The ordered dual-store write. Both connections are held for the whole
/// sequence; the request blocks until both stores have resolved.
fn register_in_both(
    identity_conn: &mut Connection,
    access_conn: &mut Connection,
    registration: &Registration,
) -> Result<Registered, RegistrarError> {
    // Step 1: identity record under store A's transaction. A failure here
    // aborts before store B is touched.
    let identity_tx = identity_conn
        .transaction()
        .map_err(|e| RegistrarError::Connection(StoreSide::Identity, e.to_string()))?;
    identity::insert_stakeholder(&identity_tx, registration)?;

    // Steps 2-3: link record then role record under store B's transaction.
    let access_tx = access_conn
        .transaction()
        .map_err(|e| RegistrarError::Connection(StoreSide::Access, e.to_string()))?;
    let link_id = access::insert_link(&access_tx, &registration.rfid, registration.role.tag())?;

    let role_record = build_role_record(registration, link_id);
    if let Some(record) = &role_record {
        access::insert_role_record(&access_tx, link_id, record)?;
    }

    // Step 4: entrysense commits first. It holds the richer role profile and
    // is treated as source of truth in the window between the two commits.
    // A failure here drops both transactions, rolling both stores back.
    access_tx
        .commit()
        .map_err(|e| RegistrarError::Connection(StoreSide::Access, format!("commit failed: {}", e)))?;

    if let Err(e) = identity_tx.commit() {
        // Entrysense is already durable; undo what it just committed and
        // report the partial commit distinctly for operator follow-up.
        warn!(
            rfid = %registration.rfid,
            link_id,
            error = %e,
            "Stakeholders commit failed after entrysense committed; compensating"
        );
        access::compensate_committed_rows(access_conn, link_id, role_record.as_ref());
        return Err(RegistrarError::PartialCommit {
            tag: registration.rfid.clone(),
            link_id,
            message: e.to_string(),
        });
    }

    Ok(Registered {
        rfid: registration.rfid.clone(),
        link_id,
        generated_id: role_record.map(|r| r.generated_id().to_string()),
    })
}
