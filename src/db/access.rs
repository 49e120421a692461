//! Entrysense (store B) operations
//!
//! The link insert and role-record insert run inside the coordinator's
//! transaction on store B. The compensating deletes run outside any
//! transaction, after store B has already committed.

use rusqlite::{params, Connection};
use tracing::{debug, warn};

use crate::error::{RegistrarError, StoreSide};
use crate::registration::RoleRecord;

/// Insert the link record, returning the store-assigned numeric id. The id
/// is usable immediately within the same transaction for the role record.
pub fn insert_link(conn: &Connection, rfid: &str, role: &str) -> Result<i64, RegistrarError> {
    conn.execute(
        "INSERT INTO rfid_info (rfid_uid, role) VALUES (?, ?)",
        params![rfid, role],
    )
    .map_err(|e| RegistrarError::from_insert(StoreSide::Access, "rfid_info", rfid, e))?;

    let link_id = conn.last_insert_rowid();
    debug!(rfid = %rfid, link_id, "Inserted link row");
    Ok(link_id)
}

/// Check whether an RFID is already linked in store B
pub fn rfid_exists(conn: &Connection, rfid: &str) -> Result<bool, RegistrarError> {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM rfid_info WHERE rfid_uid = ?",
            params![rfid],
            |row| row.get(0),
        )
        .map_err(|e| RegistrarError::Internal(format!("Query failed: {}", e)))?;

    Ok(count > 0)
}

/// Insert the role-specific profile plus its cross-link row tying the link
/// id to the generated identifier.
pub fn insert_role_record(
    conn: &Connection,
    link_id: i64,
    record: &RoleRecord,
) -> Result<(), RegistrarError> {
    match record {
        RoleRecord::Student(r) => {
            conn.execute(
                r#"
                INSERT INTO student (student_id, first_name, middle_name, last_name, department, course, photo)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
                params![
                    r.student_id,
                    r.first_name,
                    r.middle_name,
                    r.last_name,
                    r.department,
                    r.course,
                    r.photo,
                ],
            )
            .map_err(|e| RegistrarError::insert_failure(StoreSide::Access, "student", e))?;

            conn.execute(
                "INSERT INTO rfid_student_info (rfid_id, student_id) VALUES (?, ?)",
                params![link_id, r.student_id],
            )
            .map_err(|e| {
                RegistrarError::insert_failure(StoreSide::Access, "rfid_student_info", e)
            })?;
        }
        RoleRecord::Employee(r) => {
            conn.execute(
                r#"
                INSERT INTO employee (employee_id, first_name, middle_name, last_name, department, position, photo)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
                params![
                    r.employee_id,
                    r.first_name,
                    r.middle_name,
                    r.last_name,
                    r.department,
                    r.position,
                    r.photo,
                ],
            )
            .map_err(|e| RegistrarError::insert_failure(StoreSide::Access, "employee", e))?;

            conn.execute(
                "INSERT INTO rfid_employee_info (rfid_id, employee_id) VALUES (?, ?)",
                params![link_id, r.employee_id],
            )
            .map_err(|e| {
                RegistrarError::insert_failure(StoreSide::Access, "rfid_employee_info", e)
            })?;
        }
        RoleRecord::Guest(r) => {
            conn.execute(
                r#"
                INSERT INTO guest (guest_id, first_name, middle_name, last_name, purpose, photo)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
                params![
                    r.guest_id,
                    r.first_name,
                    r.middle_name,
                    r.last_name,
                    r.purpose,
                    r.photo,
                ],
            )
            .map_err(|e| RegistrarError::insert_failure(StoreSide::Access, "guest", e))?;

            conn.execute(
                "INSERT INTO rfid_guest_info (rfid_id, guest_id) VALUES (?, ?)",
                params![link_id, r.guest_id],
            )
            .map_err(|e| {
                RegistrarError::insert_failure(StoreSide::Access, "rfid_guest_info", e)
            })?;
        }
    }

    debug!(link_id, generated_id = %record.generated_id(), "Inserted role record");
    Ok(())
}

/// Best-effort compensating deletes after store B committed but store A's
/// commit failed. Errors are logged, never propagated; the original failure
/// must stay the one reported to the caller.
pub fn compensate_committed_rows(conn: &Connection, link_id: i64, record: Option<&RoleRecord>) {
    if let Some(record) = record {
        let (profile_sql, crosslink_sql) = match record {
            RoleRecord::Student(_) => (
                "DELETE FROM student WHERE student_id = ?",
                "DELETE FROM rfid_student_info WHERE rfid_id = ?",
            ),
            RoleRecord::Employee(_) => (
                "DELETE FROM employee WHERE employee_id = ?",
                "DELETE FROM rfid_employee_info WHERE rfid_id = ?",
            ),
            RoleRecord::Guest(_) => (
                "DELETE FROM guest WHERE guest_id = ?",
                "DELETE FROM rfid_guest_info WHERE rfid_id = ?",
            ),
        };

        if let Err(e) = conn.execute(crosslink_sql, params![link_id]) {
            warn!(link_id, error = %e, "Compensating cross-link delete failed");
        }
        if let Err(e) = conn.execute(profile_sql, params![record.generated_id()]) {
            warn!(
                generated_id = %record.generated_id(),
                error = %e,
                "Compensating role record delete failed"
            );
        }
    }

    if let Err(e) = conn.execute("DELETE FROM rfid_info WHERE id = ?", params![link_id]) {
        warn!(link_id, error = %e, "Compensating link delete failed");
    }
}
