//! Authentication domain module.
//!
//! # Module Structure
//!
//! - `session`: session model and lifetime math
//! - `password`: PBKDF2 password hashing and verification
//! - `repository`: persisted auth record and its repository trait

pub mod password;
mod repository;
mod session;

pub use password::{hash_password, verify_password};
pub use repository::{AuthRecord, AuthRepository};
pub use session::{AuthSession, SESSION_DURATION_MS, is_session_expired};
