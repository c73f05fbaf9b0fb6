//! Application layer services implementing business logic.
//!
//! This layer orchestrates domain operations by coordinating repository and
//! cache calls. Services consume repository traits and provide a clean API for
//! HTTP handlers.
//!
//! # Available Services
//!
//! - [`services::user_service::UserService`] - User lifecycle and cache policy

pub mod services;
