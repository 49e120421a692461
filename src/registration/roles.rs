//! Role record fan-out
//!
//! Builds the role-specific profile row from a validated registration and
//! the link id assigned by the entrysense store. Pure construction; the
//! coordinator performs the actual inserts.

use super::request::{Registration, Role};

/// The role-specific profile to insert into the entrysense store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleRecord {
    Student(StudentRecord),
    Employee(EmployeeRecord),
    Guest(GuestRecord),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentRecord {
    pub student_id: String,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub department: String,
    pub course: String,
    pub photo: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeRecord {
    pub employee_id: String,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub department: String,
    pub position: String,
    pub photo: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuestRecord {
    pub guest_id: String,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub purpose: String,
    pub photo: String,
}

impl RoleRecord {
    /// The generated human-readable identifier, e.g. `S-0042`
    pub fn generated_id(&self) -> &str {
        match self {
            RoleRecord::Student(r) => &r.student_id,
            RoleRecord::Employee(r) => &r.employee_id,
            RoleRecord::Guest(r) => &r.guest_id,
        }
    }
}

/// Format the generated identifier: role prefix plus the link id zero-padded
/// to four digits. Wider ids are not truncated.
fn generated_id(prefix: char, link_id: i64) -> String {
    format!("{}-{:04}", prefix, link_id)
}

/// Build the role record for a registration, keyed by the link id the
/// entrysense store assigned. Roles outside the recognized set get no role
/// record; the registration still completes with identity + link rows only.
pub fn build_role_record(registration: &Registration, link_id: i64) -> Option<RoleRecord> {
    match &registration.role {
        Role::Student => Some(RoleRecord::Student(StudentRecord {
            student_id: generated_id('S', link_id),
            first_name: registration.first_name.clone(),
            middle_name: registration.middle_initial.clone(),
            last_name: registration.last_name.clone(),
            department: registration.department.clone(),
            course: registration.course_or_position.clone(),
            photo: registration.photo.clone(),
        })),
        Role::Employee => Some(RoleRecord::Employee(EmployeeRecord {
            employee_id: generated_id('E', link_id),
            first_name: registration.first_name.clone(),
            middle_name: registration.middle_initial.clone(),
            last_name: registration.last_name.clone(),
            department: registration.department.clone(),
            position: registration.course_or_position.clone(),
            photo: registration.photo.clone(),
        })),
        Role::Guest => Some(RoleRecord::Guest(GuestRecord {
            guest_id: generated_id('G', link_id),
            first_name: registration.first_name.clone(),
            middle_name: registration.middle_initial.clone(),
            last_name: registration.last_name.clone(),
            purpose: registration.course_or_position.clone(),
            photo: registration.photo.clone(),
        })),
        Role::Other(_) => None,
    }
}
