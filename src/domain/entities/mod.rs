//! Core domain entities representing the account data model.
//!
//! Entities are plain data structures without I/O.
//!
//! # Entity Types
//!
//! - [`User`] - A user account with preferences attached
//! - [`UserPreferences`] - Notification preferences, one row per user
//! - [`UserProjection`] - Password-free view stored in the cache
//!
//! Creation inputs live next to their entity: [`CreateUser`] is what the
//! service accepts, [`NewUser`] is what the repository inserts.

pub mod preferences;
pub mod user;

pub use preferences::{PreferenceFlags, UserPreferences};
pub use user::{CreateUser, NewUser, User, UserProjection};
