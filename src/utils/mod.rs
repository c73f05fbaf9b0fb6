//! Helpers shared across layers.
//!
//! - [`db_error`] - Classification of PostgreSQL constraint violations
//! - [`password`] - Argon2id password hashing and verification

pub mod db_error;
pub mod password;
