//! Integration tests for dual-store registration
//!
//! These run the full coordinator against real in-memory SQLite stores,
//! using commit hooks to observe commit ordering and to force the
//! partial-commit window.

use std::sync::{Arc, Mutex};

use entrysense_registrar::db::identity::{self, StakeholderUpdate};
use entrysense_registrar::{
    AccessDb, IdentityDb, Registrar, RegistrarError, RegistrationRequest,
};
use tempfile::TempDir;

fn make_registrar() -> (Arc<IdentityDb>, Arc<AccessDb>, Registrar) {
    let identity_db = Arc::new(IdentityDb::open_in_memory().unwrap());
    let access_db = Arc::new(AccessDb::open_in_memory().unwrap());
    let registrar = Registrar::new(identity_db.clone(), access_db.clone());
    (identity_db, access_db, registrar)
}

fn request(rfid: &str, role: &str) -> RegistrationRequest {
    RegistrationRequest {
        rfid: rfid.to_string(),
        role: role.to_string(),
        first_name: "Ana".to_string(),
        last_name: "Reyes".to_string(),
        department: "CCS".to_string(),
        course_or_position: "BSCS".to_string(),
        ..Default::default()
    }
}

fn identity_count(db: &IdentityDb, rfid: &str) -> i64 {
    db.with_conn(|conn| {
        conn.query_row(
            "SELECT COUNT(*) FROM stakeholders WHERE rfid = ?",
            [rfid],
            |row| row.get(0),
        )
        .map_err(|e| RegistrarError::Internal(e.to_string()))
    })
    .unwrap()
}

fn access_count(db: &AccessDb, table: &str) -> i64 {
    db.with_conn(|conn| {
        conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
            row.get(0)
        })
        .map_err(|e| RegistrarError::Internal(e.to_string()))
    })
    .unwrap()
}

#[test]
fn successful_student_registration_writes_all_records() {
    let (identity_db, access_db, registrar) = make_registrar();

    let response = registrar.register(request("04A1B2C3", "student"));
    assert!(response.success, "unexpected failure: {}", response.message);
    assert!(response.message.contains("S-0001"));

    assert_eq!(identity_count(&identity_db, "04A1B2C3"), 1);
    assert_eq!(access_count(&access_db, "rfid_info"), 1);
    assert_eq!(access_count(&access_db, "student"), 1);

    let (role, student_id): (String, String) = access_db
        .with_conn(|conn| {
            conn.query_row(
                "SELECT i.role, s.student_id
                 FROM rfid_info i
                 JOIN rfid_student_info link ON link.rfid_id = i.id
                 JOIN student s ON s.student_id = link.student_id
                 WHERE i.rfid_uid = ?",
                ["04A1B2C3"],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .map_err(|e| RegistrarError::Internal(e.to_string()))
        })
        .unwrap();
    assert_eq!(role, "student");
    assert_eq!(student_id, "S-0001");
}

#[test]
fn role_fanout_uses_store_assigned_link_ids() {
    let (_identity_db, access_db, registrar) = make_registrar();

    let first = registrar.register(request("TAG-A", "employee"));
    assert!(first.success);
    assert!(first.message.contains("E-0001"));

    let second = registrar.register(request("TAG-B", "guest"));
    assert!(second.success);
    assert!(second.message.contains("G-0002"));

    assert_eq!(access_count(&access_db, "employee"), 1);
    assert_eq!(access_count(&access_db, "guest"), 1);
    assert_eq!(access_count(&access_db, "rfid_employee_info"), 1);
    assert_eq!(access_count(&access_db, "rfid_guest_info"), 1);
}

#[test]
fn duplicate_rfid_is_rejected_naming_the_store() {
    let (identity_db, _access_db, registrar) = make_registrar();

    assert!(registrar.register(request("DUP-1", "student")).success);

    let second = registrar.register(request("DUP-1", "student"));
    assert!(!second.success);
    assert!(second.message.contains("stakeholders"));
    assert_eq!(identity_count(&identity_db, "DUP-1"), 1);
}

#[test]
fn duplicate_in_access_store_only_is_detected() {
    let (identity_db, access_db, registrar) = make_registrar();

    // Simulate drift: the tag is linked in entrysense but has no profile
    access_db
        .with_conn(|conn| {
            conn.execute(
                "INSERT INTO rfid_info (rfid_uid, role) VALUES (?, ?)",
                ["GHOST-1", "student"],
            )
            .map_err(|e| RegistrarError::Internal(e.to_string()))
        })
        .unwrap();

    let response = registrar.register(request("GHOST-1", "student"));
    assert!(!response.success);
    assert!(response.message.contains("entrysense"));
    assert_eq!(identity_count(&identity_db, "GHOST-1"), 0);
}

#[test]
fn validation_failures_touch_no_store() {
    let (identity_db, access_db, registrar) = make_registrar();

    let missing_rfid = registrar.register(RegistrationRequest {
        role: "student".to_string(),
        first_name: "Ana".to_string(),
        last_name: "Reyes".to_string(),
        ..Default::default()
    });
    assert!(!missing_rfid.success);

    let missing_names = registrar.register(RegistrationRequest {
        rfid: "TAG-X".to_string(),
        role: "student".to_string(),
        ..Default::default()
    });
    assert!(!missing_names.success);

    assert_eq!(identity_count(&identity_db, "TAG-X"), 0);
    assert_eq!(access_count(&access_db, "rfid_info"), 0);
}

#[test]
fn unknown_role_registers_without_role_record() {
    let (identity_db, access_db, registrar) = make_registrar();

    let response = registrar.register(request("VIS-1", "visitor"));
    assert!(response.success, "unexpected failure: {}", response.message);
    assert!(response.message.contains("No role profile"));

    assert_eq!(identity_count(&identity_db, "VIS-1"), 1);
    assert_eq!(access_count(&access_db, "rfid_info"), 1);
    assert_eq!(access_count(&access_db, "student"), 0);
    assert_eq!(access_count(&access_db, "employee"), 0);
    assert_eq!(access_count(&access_db, "guest"), 0);

    let role: String = access_db
        .with_conn(|conn| {
            conn.query_row(
                "SELECT role FROM rfid_info WHERE rfid_uid = ?",
                ["VIS-1"],
                |row| row.get(0),
            )
            .map_err(|e| RegistrarError::Internal(e.to_string()))
        })
        .unwrap();
    assert_eq!(role, "visitor");
}

#[test]
fn failure_after_link_insert_leaves_no_rows_in_either_store() {
    let (identity_db, access_db, registrar) = make_registrar();

    // Force the role record insert to fail mid-choreography
    access_db
        .with_conn(|conn| {
            conn.execute_batch("DROP TABLE rfid_student_info; DROP TABLE student;")
                .map_err(|e| RegistrarError::Internal(e.to_string()))
        })
        .unwrap();

    let response = registrar.register(request("FAIL-1", "student"));
    assert!(!response.success);

    assert_eq!(identity_count(&identity_db, "FAIL-1"), 0);
    assert_eq!(access_count(&access_db, "rfid_info"), 0);
}

#[test]
fn entrysense_commits_before_stakeholders() {
    let (identity_db, access_db, registrar) = make_registrar();

    let order: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));

    let recorder = order.clone();
    identity_db
        .with_conn(move |conn| {
            conn.commit_hook(Some(move || {
                recorder.lock().unwrap().push("stakeholders");
                false
            }));
            Ok(())
        })
        .unwrap();

    let recorder = order.clone();
    access_db
        .with_conn(move |conn| {
            conn.commit_hook(Some(move || {
                recorder.lock().unwrap().push("entrysense");
                false
            }));
            Ok(())
        })
        .unwrap();

    let response = registrar.register(request("ORDER-1", "student"));
    assert!(response.success, "unexpected failure: {}", response.message);

    assert_eq!(*order.lock().unwrap(), vec!["entrysense", "stakeholders"]);
}

#[test]
fn failed_identity_commit_triggers_compensation() {
    let (identity_db, access_db, registrar) = make_registrar();

    // Abort every commit on the stakeholders store, so entrysense commits
    // and the stakeholders commit then fails
    identity_db
        .with_conn(|conn| {
            conn.commit_hook(Some(|| true));
            Ok(())
        })
        .unwrap();

    let response = registrar.register(request("PART-1", "student"));
    assert!(!response.success);
    assert!(response.message.contains("Partial commit"));
    assert!(response.message.contains("PART-1"));

    identity_db
        .with_conn(|conn| {
            conn.commit_hook(None::<fn() -> bool>);
            Ok(())
        })
        .unwrap();

    // The aborted commit rolled the identity store back, and compensation
    // removed the rows entrysense had already committed
    assert_eq!(identity_count(&identity_db, "PART-1"), 0);
    assert_eq!(access_count(&access_db, "rfid_info"), 0);
    assert_eq!(access_count(&access_db, "student"), 0);
    assert_eq!(access_count(&access_db, "rfid_student_info"), 0);

    // The tag is reusable after compensation
    let retry = registrar.register(request("PART-1", "student"));
    assert!(retry.success, "unexpected failure: {}", retry.message);
}

#[test]
fn profile_update_rewrites_identity_fields_only() {
    let (identity_db, access_db, registrar) = make_registrar();
    assert!(registrar.register(request("UPD-1", "student")).success);

    let updated = identity_db
        .with_conn(|conn| {
            identity::update_stakeholder(
                conn,
                &StakeholderUpdate {
                    rfid: "UPD-1".to_string(),
                    first_name: "Maria".to_string(),
                    middle_initial: "C".to_string(),
                    last_name: "Santos".to_string(),
                    role: "employee".to_string(),
                    department: "HR".to_string(),
                    course_or_position: "Clerk".to_string(),
                    contact_number: "09171234567".to_string(),
                },
            )
        })
        .unwrap();
    assert!(updated);

    let row = identity_db
        .with_conn(|conn| identity::get_by_rfid(conn, "UPD-1"))
        .unwrap()
        .unwrap();
    assert_eq!(row.first_name, "Maria");
    assert_eq!(row.last_name, "Santos");
    assert_eq!(row.role, "employee");
    assert_eq!(row.contact_number, "09171234567");
    // Fields outside the editable subset are untouched
    assert_eq!(row.rfid, "UPD-1");
    assert_eq!(row.address, "");

    // Store B is untouched: the link still carries the original role and
    // the student profile is still there
    let link_role: String = access_db
        .with_conn(|conn| {
            conn.query_row(
                "SELECT role FROM rfid_info WHERE rfid_uid = ?",
                ["UPD-1"],
                |row| row.get(0),
            )
            .map_err(|e| RegistrarError::Internal(e.to_string()))
        })
        .unwrap();
    assert_eq!(link_role, "student");
    assert_eq!(access_count(&access_db, "student"), 1);
}

#[test]
fn profile_update_of_unknown_rfid_matches_nothing() {
    let (identity_db, _access_db, _registrar) = make_registrar();

    let updated = identity_db
        .with_conn(|conn| {
            identity::update_stakeholder(
                conn,
                &StakeholderUpdate {
                    rfid: "NOPE-1".to_string(),
                    ..Default::default()
                },
            )
        })
        .unwrap();
    assert!(!updated);
}

#[test]
fn role_table_conflict_is_not_reported_as_duplicate() {
    let (identity_db, access_db, registrar) = make_registrar();

    // Occupy the generated id the first link id will produce, so the role
    // record insert hits a primary-key conflict that is not a tag duplicate
    access_db
        .with_conn(|conn| {
            conn.execute(
                "INSERT INTO student (student_id, first_name, last_name)
                 VALUES ('S-0001', 'Stray', 'Row')",
                [],
            )
            .map_err(|e| RegistrarError::Internal(e.to_string()))
        })
        .unwrap();

    let response = registrar.register(request("CONF-1", "student"));
    assert!(!response.success);
    assert!(
        response.message.contains("student"),
        "expected the failing table in the message: {}",
        response.message
    );
    assert!(
        !response.message.contains("already registered"),
        "a role-table conflict must not read as a duplicate credential: {}",
        response.message
    );

    // Both transactions rolled back
    assert_eq!(identity_count(&identity_db, "CONF-1"), 0);
    assert_eq!(access_count(&access_db, "rfid_info"), 0);
}

#[test]
fn stores_persist_across_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let identity_path = temp_dir.path().join("stakeholders.db");
    let access_path = temp_dir.path().join("entrysense.db");

    {
        let identity_db = Arc::new(IdentityDb::open(&identity_path).unwrap());
        let access_db = Arc::new(AccessDb::open(&access_path).unwrap());
        let registrar = Registrar::new(identity_db, access_db);
        let response = registrar.register(request("DISK-1", "employee"));
        assert!(response.success, "unexpected failure: {}", response.message);
    }

    let identity_db = IdentityDb::open(&identity_path).unwrap();
    let access_db = AccessDb::open(&access_path).unwrap();
    assert_eq!(identity_count(&identity_db, "DISK-1"), 1);
    assert_eq!(access_count(&access_db, "employee"), 1);
}
