//! EntrySense Registrar - dual-store RFID credential registration
//!
//! Registers a physical RFID credential against a person's identity across
//! two independently-owned SQLite databases:
//!
//! - **stakeholders.db** (store A): the canonical person profile
//! - **entrysense.db** (store B): the link table and role-specific profiles
//!
//! There is no shared transaction manager across the two stores. The
//! coordinator guarantees all-or-nothing registration with one local
//! transaction per store, a fixed commit order (entrysense before
//! stakeholders), and best-effort compensation for the narrow window where
//! entrysense has committed but the stakeholders commit fails.
//!
//! ## Registration flow
//!
//! ```text
//! request -> validate -> precheck -> coordinator
//!                                      |- tx A: insert stakeholder
//!                                      |- tx B: insert link, insert role record
//!                                      |- commit B, then commit A
//!                                      '- on failure: roll back / compensate
//! ```

pub mod config;
pub mod db;
pub mod error;
pub mod http;
pub mod registration;

// Re-exports
pub use config::Config;
pub use db::{AccessDb, IdentityDb};
pub use error::{RegistrarError, StoreSide};
pub use http::HttpServer;
pub use registration::{Registrar, RegistrationRequest, RegistrationResponse};
