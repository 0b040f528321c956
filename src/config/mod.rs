/// Database connection and schema creation
pub mod database;

/// Demonstration data loading from seed.toml
pub mod seed;

/// Application settings from library.toml and the environment
pub mod settings;

pub use settings::Settings;
