//! Member credential handling.

pub mod password;

pub use password::{PasswordError, hash_password, validate_password, verify_password};
