//! Core business logic, independent of any presentation layer.
//!
//! Functions here take a database connection and plain values, and return
//! entity models or small result structs.

/// Login, password hashing and the identity port
pub mod auth;
/// Authors, genres, formats, publishers, books and copies
pub mod catalog;
/// Checkouts, returns and loan queries
pub mod lending;
/// Member and administrator accounts
pub mod members;
/// Overdue and circulation reports
pub mod report;
/// Demonstration data for a fresh database
pub mod seed;
/// Form validation for editable entities
pub mod validation;
