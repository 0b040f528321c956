//! Application settings loaded from `library.toml` and the environment.
//!
//! Every field has a default, so a missing file is not an error. The
//! `DATABASE_URL` environment variable (usually from `.env`) overrides the
//! file's database URL.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_CONFIG_PATH: &str = "library.toml";

/// Runtime settings for the library system.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// sea-orm connection string
    pub database_url: String,
    /// Days between checkout and due date
    pub loan_period_days: u32,
    /// Rows per page in every listing
    pub page_size: usize,
    /// TOML file holding demonstration data
    pub seed_file: String,
    /// Whether to insert the demonstration data into an empty database
    pub seed_on_empty: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: "sqlite://data/library.sqlite?mode=rwc".to_string(),
            loan_period_days: 21,
            page_size: 10,
            seed_file: "seed.toml".to_string(),
            seed_on_empty: true,
        }
    }
}

impl Settings {
    /// Parses settings from TOML text.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let settings: Self = toml::from_str(contents).map_err(|e| Error::Config {
            message: format!("Failed to parse settings: {e}"),
        })?;
        settings.check()?;
        Ok(settings)
    }

    fn check(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(Error::Config {
                message: "page_size must be at least 1".to_string(),
            });
        }
        if self.loan_period_days == 0 {
            return Err(Error::Config {
                message: "loan_period_days must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Loads settings from a TOML file, falling back to defaults when the file
/// does not exist.
///
/// # Errors
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load settings from: {:?}", path_ref);

    let mut settings = if path_ref.exists() {
        let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
            message: format!("Failed to read settings file {}: {e}", path_ref.display()),
        })?;
        Settings::from_toml(&contents)?
    } else {
        tracing::info!("No settings file at {:?}, using defaults", path_ref);
        Settings::default()
    };

    if let Ok(url) = std::env::var("DATABASE_URL") {
        settings.database_url = url;
    }

    Ok(settings)
}

/// Loads settings from `LIBRARY_CONFIG` or `./library.toml`.
pub fn load_default_settings() -> Result<Settings> {
    let path =
        std::env::var("LIBRARY_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    load_settings(path)
}
