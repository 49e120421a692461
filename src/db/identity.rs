//! Stakeholder (store A) operations
//!
//! The insert runs inside the coordinator's transaction; lookups, listing
//! and validity renewal are single-store operations with no cross-store
//! coordination.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{RegistrarError, StoreSide};
use crate::registration::Registration;

/// Stakeholder row from store A
#[derive(Debug, Clone, Serialize)]
pub struct StakeholderRow {
    pub id: i64,
    pub rfid: String,
    pub role: String,
    pub photo: String,
    pub first_name: String,
    pub middle_initial: String,
    pub last_name: String,
    pub department: String,
    pub course_or_position: String,
    pub address: String,
    pub contact_number: String,
    pub birthdate: String,
    pub height: String,
    pub weight: String,
    pub gender: String,
    pub civil_status: String,
    pub emergency_contact: String,
    pub emergency_address: String,
    pub created_at: String,
}

impl StakeholderRow {
    fn from_row(row: &Row) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            rfid: row.get("rfid")?,
            role: row.get("role")?,
            photo: row.get("photo")?,
            first_name: row.get("first_name")?,
            middle_initial: row.get("middle_initial")?,
            last_name: row.get("last_name")?,
            department: row.get("department")?,
            course_or_position: row.get("course_or_position")?,
            address: row.get("address")?,
            contact_number: row.get("contact_number")?,
            birthdate: row.get("birthdate")?,
            height: row.get("height")?,
            weight: row.get("weight")?,
            gender: row.get("gender")?,
            civil_status: row.get("civil_status")?,
            emergency_contact: row.get("emergency_contact")?,
            emergency_address: row.get("emergency_address")?,
            created_at: row.get("created_at")?,
        })
    }
}

/// Insert the identity record. Caller supplies the connection of an open
/// transaction; a uniqueness-constraint violation maps to the duplicate error.
pub fn insert_stakeholder(conn: &Connection, reg: &Registration) -> Result<(), RegistrarError> {
    conn.execute(
        r#"
        INSERT INTO stakeholders (
            rfid, role, photo, first_name, middle_initial, last_name, department,
            course_or_position, address, contact_number, birthdate, height, weight,
            gender, civil_status, emergency_contact, emergency_address
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
        params![
            reg.rfid,
            reg.role.tag(),
            reg.photo,
            reg.first_name,
            reg.middle_initial,
            reg.last_name,
            reg.department,
            reg.course_or_position,
            reg.address,
            reg.contact_number,
            reg.birthdate,
            reg.height,
            reg.weight,
            reg.gender,
            reg.civil_status,
            reg.emergency_contact,
            reg.emergency_address,
        ],
    )
    .map_err(|e| RegistrarError::from_insert(StoreSide::Identity, "stakeholders", &reg.rfid, e))?;

    debug!(rfid = %reg.rfid, "Inserted stakeholder row");
    Ok(())
}

/// Check whether an RFID is already registered in store A
pub fn rfid_exists(conn: &Connection, rfid: &str) -> Result<bool, RegistrarError> {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM stakeholders WHERE rfid = ?",
            params![rfid],
            |row| row.get(0),
        )
        .map_err(|e| RegistrarError::Internal(format!("Query failed: {}", e)))?;

    Ok(count > 0)
}

/// Fetch one stakeholder by RFID
pub fn get_by_rfid(conn: &Connection, rfid: &str) -> Result<Option<StakeholderRow>, RegistrarError> {
    let mut stmt = conn
        .prepare("SELECT * FROM stakeholders WHERE rfid = ? LIMIT 1")
        .map_err(|e| RegistrarError::Internal(format!("Prepare failed: {}", e)))?;

    let mut rows = stmt
        .query(params![rfid])
        .map_err(|e| RegistrarError::Internal(format!("Query failed: {}", e)))?;

    match rows
        .next()
        .map_err(|e| RegistrarError::Internal(format!("Row fetch failed: {}", e)))?
    {
        Some(row) => {
            let stakeholder = StakeholderRow::from_row(row)
                .map_err(|e| RegistrarError::Internal(format!("Row parse failed: {}", e)))?;
            Ok(Some(stakeholder))
        }
        None => Ok(None),
    }
}

/// List all stakeholders, newest first
pub fn list_stakeholders(conn: &Connection) -> Result<Vec<StakeholderRow>, RegistrarError> {
    let mut stmt = conn
        .prepare("SELECT * FROM stakeholders ORDER BY id DESC")
        .map_err(|e| RegistrarError::Internal(format!("Prepare failed: {}", e)))?;

    let rows = stmt
        .query_map([], StakeholderRow::from_row)
        .map_err(|e| RegistrarError::Internal(format!("Query failed: {}", e)))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| RegistrarError::Internal(format!("Row parse failed: {}", e)))?;

    Ok(rows)
}

/// Editable subset of a stakeholder profile, keyed by RFID
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StakeholderUpdate {
    #[serde(default)]
    pub rfid: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub middle_initial: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub course_or_position: String,
    #[serde(default)]
    pub contact_number: String,
}

/// Update a stakeholder's profile fields in store A only. The RFID and the
/// store-B records are untouched; a role change here does not rebuild the
/// role profile. Returns false when the RFID is not registered.
pub fn update_stakeholder(
    conn: &Connection,
    update: &StakeholderUpdate,
) -> Result<bool, RegistrarError> {
    let changes = conn
        .execute(
            r#"
            UPDATE stakeholders SET
                first_name = ?,
                middle_initial = ?,
                last_name = ?,
                role = ?,
                department = ?,
                course_or_position = ?,
                contact_number = ?
            WHERE rfid = ?
            "#,
            params![
                update.first_name,
                update.middle_initial,
                update.last_name,
                update.role,
                update.department,
                update.course_or_position,
                update.contact_number,
                update.rfid,
            ],
        )
        .map_err(|e| RegistrarError::Internal(format!("Update failed: {}", e)))?;

    debug!(rfid = %update.rfid, updated = changes > 0, "Stakeholder update");
    Ok(changes > 0)
}

/// Reset the creation timestamp of a credential, renewing its validity for
/// another year. Returns false when the RFID is not registered.
pub fn renew_validity(conn: &Connection, rfid: &str) -> Result<bool, RegistrarError> {
    let changes = conn
        .execute(
            "UPDATE stakeholders SET created_at = datetime('now') WHERE rfid = ?",
            params![rfid],
        )
        .map_err(|e| RegistrarError::Internal(format!("Renew failed: {}", e)))?;

    Ok(changes > 0)
}
