//! Database module for SQLite operations.
//!
//! This module provides:
//! - Database initialization and migrations
//! - Repository layer for database operations
//! - Optional fixture seeding for demo databases

pub mod migrations;
pub mod repo;
pub mod seed;

pub use migrations::init_db;
pub use repo::Repository;
pub use seed::{seed_fixtures, SeedError};
