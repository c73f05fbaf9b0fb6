//! PostgreSQL repository implementations.
//!
//! Concrete implementations of domain repository traits using SQLx.
//!
//! # Repositories
//!
//! - [`PgUserRepository`] - Users and their notification preferences

pub mod pg_user_repository;

pub use pg_user_repository::PgUserRepository;
