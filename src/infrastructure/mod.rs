//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer, providing
//! concrete implementations for data persistence and caching.
//!
//! # Modules
//!
//! - [`cache`] - Cache transports (Redis, in-memory, no-op) and the typed user cache
//! - [`persistence`] - PostgreSQL repository implementations

pub mod cache;
pub mod persistence;
