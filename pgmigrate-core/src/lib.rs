//! Versioned up/down SQL migrations for postgresql.
//!
//! Migrations live in a directory as `<version>_<identifier>.up.sql` and
//! `<version>_<identifier>.down.sql` pairs. The database keeps a single
//! version marker, flagged dirty while a migration body is running.

pub mod config;
pub mod db;
pub mod error;
pub mod file;
pub mod migration;
pub mod migrator;
pub mod planner;
