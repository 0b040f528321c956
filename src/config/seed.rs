//! Demonstration data loading from seed.toml
//!
//! The seed file describes administrators, the catalog, members and a short
//! lending history. Rows refer to each other by their 1-based position in
//! their own list (e.g. `author = 2` is the second `[[authors]]` entry), so the
//! file stays independent of database ids. Passwords are plaintext here and
//! are hashed with a fresh token when seeded.

use crate::errors::{Error, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::Path;

/// Entire seed.toml file
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    pub administrators: Vec<SeedAccount>,
    pub authors: Vec<SeedAuthor>,
    pub genres: Vec<SeedNamed>,
    pub formats: Vec<SeedNamed>,
    pub publishers: Vec<SeedPublisher>,
    pub books: Vec<SeedBook>,
    pub copies: Vec<SeedCopy>,
    pub members: Vec<SeedMember>,
    pub transactions: Vec<SeedTransaction>,
    pub details: Vec<SeedDetail>,
}

/// An administrator login
#[derive(Debug, Clone, Deserialize)]
pub struct SeedAccount {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedAuthor {
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

/// A genre or format, identified only by its display name
#[derive(Debug, Clone, Deserialize)]
pub struct SeedNamed {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedPublisher {
    pub name: String,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedBook {
    pub title: String,
    pub isbn: String,
    /// Position in `authors`
    pub author: usize,
    /// Position in `genres`
    pub genre: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedCopy {
    /// Position in `books`
    pub book: usize,
    /// Position in `formats`
    pub format: usize,
    /// Position in `publishers`
    pub publisher: usize,
    pub copyright_year: i32,
    pub number_of_pages: Option<i32>,
    pub shelf_number: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedMember {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedTransaction {
    /// Position in `members`
    pub member: usize,
    pub check_out_date: NaiveDate,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedDetail {
    /// Position in `transactions`
    pub transaction: usize,
    /// Position in `copies`
    pub copy: usize,
    pub due_date: NaiveDate,
    pub check_in_date: Option<NaiveDate>,
}

impl SeedConfig {
    /// Parses and cross-checks seed data from TOML text.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let seed: Self = toml::from_str(contents).map_err(|e| Error::Config {
            message: format!("Failed to parse seed file: {e}"),
        })?;
        seed.check_references()?;
        Ok(seed)
    }

    /// Verifies that every 1-based reference points inside its target list.
    fn check_references(&self) -> Result<()> {
        fn in_range(what: &str, position: usize, len: usize) -> Result<()> {
            if position == 0 || position > len {
                return Err(Error::Config {
                    message: format!("Seed {what} reference {position} is outside 1..={len}"),
                });
            }
            Ok(())
        }

        for book in &self.books {
            in_range("author", book.author, self.authors.len())?;
            in_range("genre", book.genre, self.genres.len())?;
        }
        for copy in &self.copies {
            in_range("book", copy.book, self.books.len())?;
            in_range("format", copy.format, self.formats.len())?;
            in_range("publisher", copy.publisher, self.publishers.len())?;
        }
        for transaction in &self.transactions {
            in_range("member", transaction.member, self.members.len())?;
        }
        for detail in &self.details {
            in_range("transaction", detail.transaction, self.transactions.len())?;
            in_range("copy", detail.copy, self.copies.len())?;
        }
        Ok(())
    }
}

/// Loads seed data from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - A row references a position that does not exist
pub fn load_seed<P: AsRef<Path>>(path: P) -> Result<SeedConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read seed file: {e}"),
    })?;
    SeedConfig::from_toml(&contents)
}
