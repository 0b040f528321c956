//! Field-level validation for catalog and member forms.
//!
//! Each draft reports a message per failing field, and is valid only when
//! every field passes. Saving an invalid draft is refused before any database
//! access.

use chrono::{Datelike, Local};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single failing field and the message to show next to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Field name as shown on the form
    pub field: &'static str,
    /// Human-readable problem description
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Field validation shared by every editable entity.
pub trait Validate {
    /// Entity kind used in error messages
    const ENTITY: &'static str;

    /// Fields checked by [`Validate::validation_errors`], in form order.
    const FIELDS: &'static [&'static str];

    /// Message for a single field, `None` when the field is valid.
    fn field_error(&self, field: &str) -> Option<String>;

    /// All failing fields.
    fn validation_errors(&self) -> Vec<FieldError> {
        Self::FIELDS
            .iter()
            .copied()
            .filter_map(|field| {
                self.field_error(field).map(|message| FieldError { field, message })
            })
            .collect()
    }

    /// True when every field passes.
    fn is_valid(&self) -> bool {
        Self::FIELDS.iter().all(|field| self.field_error(field).is_none())
    }

    /// Converts an invalid draft into [`crate::errors::Error::Validation`].
    fn ensure_valid(&self) -> crate::errors::Result<()> {
        let errors = self.validation_errors();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(crate::errors::Error::Validation {
                entity: Self::ENTITY,
                errors,
            })
        }
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn too_long(value: &str, max: usize) -> bool {
    value.chars().count() > max
}

/// Personal and place names: letters, combining marks, apostrophes, spaces,
/// periods and hyphens.
fn is_name_like(value: &str) -> bool {
    !value.is_empty()
        && value.chars().all(|c| {
            c.is_alphabetic()
                || matches!(c, '\'' | ' ' | '.' | '-')
                || ('\u{0300}'..='\u{036F}').contains(&c)
        })
}

/// Editable fields of an author.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorDraft {
    pub first_name: String,
    pub last_name: String,
}

impl Validate for AuthorDraft {
    const ENTITY: &'static str = "Author";
    const FIELDS: &'static [&'static str] = &["FirstName", "LastName"];

    fn field_error(&self, field: &str) -> Option<String> {
        match field {
            "FirstName" if is_blank(&self.first_name) || too_long(&self.first_name, 100) => {
                Some("Please enter a first name of less than 100 characters".to_string())
            }
            "LastName" if too_long(&self.last_name, 200) => {
                Some("Last names cannot be more than 200 characters".to_string())
            }
            _ => None,
        }
    }
}

/// Editable fields of a genre.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreDraft {
    pub name: String,
}

impl Validate for GenreDraft {
    const ENTITY: &'static str = "Genre";
    const FIELDS: &'static [&'static str] = &["Name"];

    fn field_error(&self, field: &str) -> Option<String> {
        (field == "Name" && (is_blank(&self.name) || too_long(&self.name, 150)))
            .then(|| "Please enter a name of less than 150 characters".to_string())
    }
}

/// Editable fields of a format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatDraft {
    pub kind: String,
}

impl Validate for FormatDraft {
    const ENTITY: &'static str = "Format";
    const FIELDS: &'static [&'static str] = &["Type"];

    fn field_error(&self, field: &str) -> Option<String> {
        (field == "Type" && (is_blank(&self.kind) || too_long(&self.kind, 100)))
            .then(|| "Please enter a type of less than 100 characters".to_string())
    }
}

/// Editable fields of a publisher.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublisherDraft {
    pub name: String,
    pub location: Option<String>,
}

impl Validate for PublisherDraft {
    const ENTITY: &'static str = "Publisher";
    const FIELDS: &'static [&'static str] = &["Name", "Location"];

    fn field_error(&self, field: &str) -> Option<String> {
        match field {
            "Name" if is_blank(&self.name) => Some("Please enter a publisher name.".to_string()),
            "Name" if too_long(&self.name, 200) || !is_name_like(&self.name) => {
                Some("Please enter a valid name.".to_string())
            }
            "Location" => self
                .location
                .as_deref()
                .filter(|location| too_long(location, 200) || !is_name_like(location))
                .map(|_| "Please enter a valid location.".to_string()),
            _ => None,
        }
    }
}

/// Editable fields of a book.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookDraft {
    pub title: String,
    pub isbn: String,
    pub author_id: i64,
    pub genre_id: i64,
}

impl Validate for BookDraft {
    const ENTITY: &'static str = "Book";
    const FIELDS: &'static [&'static str] = &["Title", "Isbn"];

    fn field_error(&self, field: &str) -> Option<String> {
        match field {
            "Title" if is_blank(&self.title) => Some("Please enter a title".to_string()),
            "Isbn" if is_blank(&self.isbn) || self.isbn.chars().count() != 13 => Some(
                "Please enter a valid 13-digit ISBN.\nAdd prefix 978 to 10-digit ISBNs"
                    .to_string(),
            ),
            _ => None,
        }
    }
}

/// Editable fields of a book copy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookCopyDraft {
    pub book_id: i64,
    pub format_id: i64,
    pub publisher_id: i64,
    pub copyright_year: i32,
    pub number_of_pages: Option<i32>,
    pub shelf_number: Option<String>,
}

impl Validate for BookCopyDraft {
    const ENTITY: &'static str = "Copy";
    const FIELDS: &'static [&'static str] = &["NumberOfPages", "ShelfNumber", "CopyrightYear"];

    fn field_error(&self, field: &str) -> Option<String> {
        match field {
            "NumberOfPages" => self
                .number_of_pages
                .filter(|pages| !(1..=3100).contains(pages))
                .map(|_| "The number of pages must be between 1 and 3100".to_string()),
            "ShelfNumber" => self
                .shelf_number
                .as_deref()
                .filter(|shelf| too_long(shelf, 4))
                .map(|_| "Shelf number cannot be more than 4 characters".to_string()),
            "CopyrightYear" => {
                let current_year = Local::now().year();
                (self.copyright_year > current_year)
                    .then(|| format!("The copyright year must be {current_year} or earlier"))
            }
            _ => None,
        }
    }
}

/// Editable fields of a member. `password` is plaintext until saved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDraft {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub password: String,
}

impl Validate for MemberDraft {
    const ENTITY: &'static str = "Member";
    const FIELDS: &'static [&'static str] = &["FirstName", "LastName", "Username", "Password"];

    fn field_error(&self, field: &str) -> Option<String> {
        match field {
            "FirstName" if self.first_name.is_empty() => {
                Some("Please enter a first name.".to_string())
            }
            "FirstName" if too_long(&self.first_name, 100) || !is_name_like(&self.first_name) => {
                Some("Please enter a valid first name.".to_string())
            }
            "LastName" if self.last_name.is_empty() => {
                Some("Please enter a last name.".to_string())
            }
            "LastName" if too_long(&self.last_name, 100) || !is_name_like(&self.last_name) => {
                Some("Please enter a valid last name.".to_string())
            }
            "Username" if is_blank(&self.username) => Some("Please enter a username.".to_string()),
            "Password" if self.password.is_empty() => Some("Please enter a password.".to_string()),
            _ => None,
        }
    }
}
