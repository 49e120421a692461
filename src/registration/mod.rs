//! Registration core: validation, uniqueness precheck, role record fan-out,
//! and the dual-store transaction coordinator.

pub mod coordinator;
pub mod precheck;
pub mod request;
pub mod roles;

pub use coordinator::Registrar;
pub use request::{validate, Registration, RegistrationRequest, RegistrationResponse, Role};
pub use roles::{build_role_record, RoleRecord};
