//! Unified error types for the library system.
//!
//! Validation, authentication and lending-rule failures are recoverable and
//! meant to be shown to the user; database and I/O failures propagate as-is.

use crate::core::validation::FieldError;
use thiserror::Error;

/// Every failure the library system can report.
#[derive(Debug, Error)]
pub enum Error {
    /// Settings or seed data could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Persistence failure from the ORM
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// One or more fields of an entity failed validation; nothing was saved
    #[error("One or more fields are invalid. {entity} cannot be saved.")]
    Validation {
        /// Entity kind being saved (e.g. "Book")
        entity: &'static str,
        /// Each failing field with its message
        errors: Vec<FieldError>,
    },

    /// No administrator or member has this username
    #[error("The username is incorrect.")]
    UnknownUsername {
        /// The username that was looked up
        username: String,
    },

    /// The username exists but the password hash did not match
    #[error("The password is incorrect.")]
    IncorrectPassword,

    /// A username is already taken by another account
    #[error("The username '{username}' is already in use.")]
    UsernameTaken {
        /// The requested username
        username: String,
    },

    /// The member has an open loan past its due date
    #[error(
        "You have overdue books. You cannot check out more materials until you return your overdue items."
    )]
    OverdueItems {
        /// Member whose checkout was refused
        member_id: i64,
    },

    /// A selected copy is archived, missing, or already checked out
    #[error("The transaction is invalid. Please choose books that are available (copy {copy_id}).")]
    CopyUnavailable {
        /// The offending copy
        copy_id: i64,
    },

    /// Checkout or return was requested for zero copies
    #[error("Please select at least one copy.")]
    EmptySelection,

    /// A copy being returned has no open transaction detail
    #[error("Copy {copy_id} is not checked out.")]
    NoOpenLoan {
        /// The copy that has no open loan
        copy_id: i64,
    },

    /// A record addressed by id does not exist or is archived
    #[error("{entity} {id} not found")]
    NotFound {
        /// Entity kind (e.g. "Member")
        entity: &'static str,
        /// The id that was looked up
        id: i64,
    },

    /// Listing navigation beyond the available pages
    #[error("Page {page} is out of range (1..={page_count})")]
    PageOutOfRange {
        /// Requested page
        page: usize,
        /// Number of pages available
        page_count: usize,
    },
}

impl Error {
    /// Whether this error is a recoverable, user-visible failure rather than
    /// an infrastructure fault.
    #[must_use]
    pub const fn is_user_facing(&self) -> bool {
        !matches!(self, Self::Database(_) | Self::Io(_) | Self::Config { .. })
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
