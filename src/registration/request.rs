//! Registration request payload and validation
//!
//! Validation happens before any store is touched; a rejected request has no
//! side effects anywhere.

use serde::{Deserialize, Serialize};

use crate::error::RegistrarError;

/// Raw registration submission, as posted by the enrollment UI
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistrationRequest {
    /// Tag identifier read from the physical credential
    #[serde(default)]
    pub rfid: String,
    /// One of student/employee/guest, or a free-form role
    #[serde(default)]
    pub role: String,
    /// Opaque photo payload (base64 from the capture UI)
    #[serde(default)]
    pub photo: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub middle_initial: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub course_or_position: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub contact_number: String,
    #[serde(default)]
    pub birthdate: String,
    #[serde(default)]
    pub height: String,
    #[serde(default)]
    pub weight: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub civil_status: String,
    #[serde(default)]
    pub emergency_contact: String,
    #[serde(default)]
    pub emergency_address: String,
}

/// Result of a register call: a flag plus a human-readable message
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationResponse {
    pub success: bool,
    pub message: String,
}

impl RegistrationResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Role tag on a registration. Roles outside the recognized set still
/// register (identity + link record only) but produce no role profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    Student,
    Employee,
    Guest,
    Other(String),
}

impl Role {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "student" => Role::Student,
            "employee" => Role::Employee,
            "guest" => Role::Guest,
            other => Role::Other(other.to_string()),
        }
    }

    /// The role string as stored in both databases
    pub fn tag(&self) -> &str {
        match self {
            Role::Student => "student",
            Role::Employee => "employee",
            Role::Guest => "guest",
            Role::Other(tag) => tag,
        }
    }
}

/// A validated, normalized registration ready for the coordinator
#[derive(Debug, Clone)]
pub struct Registration {
    pub rfid: String,
    pub role: Role,
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
}

/// Validate and normalize a raw request. No store access happens here.
pub fn validate(request: RegistrationRequest) -> Result<Registration, RegistrarError> {
    let rfid = request.rfid.trim().to_string();
    if rfid.is_empty() {
        return Err(RegistrarError::Validation(
            "Missing or invalid RFID".to_string(),
        ));
    }

    let role = request.role.trim();
    if role.is_empty() {
        return Err(RegistrarError::Validation("Missing role".to_string()));
    }

    let first_name = request.first_name.trim().to_string();
    let last_name = request.last_name.trim().to_string();
    if first_name.is_empty() || last_name.is_empty() {
        return Err(RegistrarError::Validation(
            "First and last name are required".to_string(),
        ));
    }

    Ok(Registration {
        rfid,
        role: Role::parse(role),
        photo: request.photo,
        first_name,
        middle_initial: request.middle_initial.trim().to_string(),
        last_name,
        department: request.department.trim().to_string(),
        course_or_position: request.course_or_position.trim().to_string(),
        address: request.address.trim().to_string(),
        contact_number: request.contact_number.trim().to_string(),
        birthdate: request.birthdate.trim().to_string(),
        height: request.height.trim().to_string(),
        weight: request.weight.trim().to_string(),
        gender: request.gender.trim().to_string(),
        civil_status: request.civil_status.trim().to_string(),
        emergency_contact: request.emergency_contact.trim().to_string(),
        emergency_address: request.emergency_address.trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_request() -> RegistrationRequest {
        RegistrationRequest {
            rfid: "04A1B2C3".to_string(),
            role: "student".to_string(),
            first_name: "Ana".to_string(),
            last_name: "Reyes".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn accepts_minimal_request() {
        let reg = validate(minimal_request()).unwrap();
        assert_eq!(reg.rfid, "04A1B2C3");
        assert_eq!(reg.role, Role::Student);
        assert_eq!(reg.department, "");
    }

    #[test]
    fn trims_rfid_and_names() {
        let mut req = minimal_request();
        req.rfid = "  04A1B2C3  ".to_string();
        req.first_name = " Ana ".to_string();
        let reg = validate(req).unwrap();
        assert_eq!(reg.rfid, "04A1B2C3");
        assert_eq!(reg.first_name, "Ana");
    }

    #[test]
    fn rejects_missing_rfid() {
        let mut req = minimal_request();
        req.rfid = "   ".to_string();
        assert!(matches!(
            validate(req),
            Err(RegistrarError::Validation(_))
        ));
    }

    #[test]
    fn rejects_missing_names() {
        let mut req = minimal_request();
        req.first_name = String::new();
        req.last_name = String::new();
        assert!(matches!(
            validate(req),
            Err(RegistrarError::Validation(_))
        ));
    }

    #[test]
    fn rejects_missing_role() {
        let mut req = minimal_request();
        req.role = "  ".to_string();
        assert!(matches!(
            validate(req),
            Err(RegistrarError::Validation(_))
        ));
    }

    #[test]
    fn unrecognized_role_is_kept_verbatim() {
        let mut req = minimal_request();
        req.role = "visitor".to_string();
        let reg = validate(req).unwrap();
        assert_eq!(reg.role, Role::Other("visitor".to_string()));
        assert_eq!(reg.role.tag(), "visitor");
    }
}
