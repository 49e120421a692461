//! Advisory uniqueness precheck
//!
//! Rejects the common duplicate case before any transactional work starts.
//! Two concurrent submissions of the same tag can both pass this check; the
//! UNIQUE columns in each store are the authoritative guard.

use crate::db::{access, identity, AccessDb, IdentityDb};
use crate::error::{RegistrarError, StoreSide};

/// Confirm the RFID is not yet registered in either store, naming the store
/// holding the conflict otherwise.
pub fn check_available(
    identity_db: &IdentityDb,
    access_db: &AccessDb,
    rfid: &str,
) -> Result<(), RegistrarError> {
    if identity_db.with_conn(|conn| identity::rfid_exists(conn, rfid))? {
        return Err(RegistrarError::Duplicate {
            tag: rfid.to_string(),
            store: StoreSide::Identity,
        });
    }

    if access_db.with_conn(|conn| access::rfid_exists(conn, rfid))? {
        return Err(RegistrarError::Duplicate {
            tag: rfid.to_string(),
            store: StoreSide::Access,
        });
    }

    Ok(())
}
