//! Authentication - password hashing and login.
//!
//! Stored passwords are `base64(sha256(password ++ token))`, where `token` is
//! the account's random identity token. Administrators and members are two
//! unrelated tables that share the [`Credentialed`] capability; login is
//! written against that capability and against the [`IdentityStore`] port,
//! never against a concrete table.

use crate::{
    entities::{Administrator, Member, administrator, member},
    errors::{Error, Result},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use sea_orm::{DatabaseConnection, prelude::*};
use sha2::{Digest, Sha256};
use std::future::Future;
use tracing::{info, warn};

/// Hashes a plaintext password salted with the account's identity token.
#[must_use]
pub fn hash_password(password: &str, token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.update(token.as_bytes());
    STANDARD.encode(hasher.finalize())
}

/// Generates a fresh identity token for a new account.
#[must_use]
pub fn new_token() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Anything that can be logged into.
pub trait Credentialed {
    /// Login name
    fn username(&self) -> &str;
    /// Stored salted hash
    fn password_hash(&self) -> &str;
    /// Identity token used as the salt
    fn token(&self) -> &str;

    /// Whether `password` hashes to the stored value.
    fn verify_password(&self, password: &str) -> bool {
        hash_password(password, self.token()) == self.password_hash()
    }
}

impl Credentialed for member::Model {
    fn username(&self) -> &str {
        &self.username
    }

    fn password_hash(&self) -> &str {
        &self.password
    }

    fn token(&self) -> &str {
        &self.token
    }
}

impl Credentialed for administrator::Model {
    fn username(&self) -> &str {
        &self.username
    }

    fn password_hash(&self) -> &str {
        &self.password
    }

    fn token(&self) -> &str {
        &self.token
    }
}

/// A logged-in (or loggable) account of either role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAccount {
    /// Librarian with catalog access
    Administrator(administrator::Model),
    /// Patron with checkout access
    Member(member::Model),
}

impl UserAccount {
    fn credentials(&self) -> &dyn Credentialed {
        match self {
            Self::Administrator(admin) => admin,
            Self::Member(member) => member,
        }
    }
}

impl Credentialed for UserAccount {
    fn username(&self) -> &str {
        self.credentials().username()
    }

    fn password_hash(&self) -> &str {
        self.credentials().password_hash()
    }

    fn token(&self) -> &str {
        self.credentials().token()
    }
}

/// Identity port: looks accounts up by username.
///
/// Administrators take precedence over members with the same username.
/// Archived members are not returned.
pub trait IdentityStore {
    /// Finds the account for `username`, if any.
    fn find_user(&self, username: &str) -> impl Future<Output = Result<Option<UserAccount>>> + Send;
}

impl IdentityStore for DatabaseConnection {
    async fn find_user(&self, username: &str) -> Result<Option<UserAccount>> {
        if let Some(admin) = Administrator::find()
            .filter(administrator::Column::Username.eq(username))
            .one(self)
            .await?
        {
            return Ok(Some(UserAccount::Administrator(admin)));
        }

        let member = Member::find()
            .filter(member::Column::Username.eq(username))
            .filter(member::Column::IsArchived.eq(false))
            .one(self)
            .await?;
        Ok(member.map(UserAccount::Member))
    }
}

/// Identity store held entirely in memory, for tests and tooling that run
/// without a database.
#[derive(Debug, Default, Clone)]
pub struct InMemoryIdentityStore {
    administrators: Vec<administrator::Model>,
    members: Vec<member::Model>,
}

impl InMemoryIdentityStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an administrator account.
    pub fn add_administrator(&mut self, admin: administrator::Model) {
        self.administrators.push(admin);
    }

    /// Adds a member account.
    pub fn add_member(&mut self, member: member::Model) {
        self.members.push(member);
    }
}

impl IdentityStore for InMemoryIdentityStore {
    async fn find_user(&self, username: &str) -> Result<Option<UserAccount>> {
        let admin = self
            .administrators
            .iter()
            .find(|a| a.username == username)
            .cloned()
            .map(UserAccount::Administrator);
        if admin.is_some() {
            return Ok(admin);
        }
        Ok(self
            .members
            .iter()
            .find(|m| m.username == username && !m.is_archived)
            .cloned()
            .map(UserAccount::Member))
    }
}

/// Validates a username and plaintext password.
///
/// # Errors
/// - [`Error::UnknownUsername`] when no account has that username
/// - [`Error::IncorrectPassword`] when the hash does not match
/// - [`Error::Database`] when the lookup itself fails
pub async fn authenticate<S: IdentityStore>(
    store: &S,
    username: &str,
    password: &str,
) -> Result<UserAccount> {
    let Some(account) = store.find_user(username).await? else {
        warn!(username, "Login failed: unknown username");
        return Err(Error::UnknownUsername {
            username: username.to_string(),
        });
    };

    if !account.verify_password(password) {
        warn!(username, "Login failed: incorrect password");
        return Err(Error::IncorrectPassword);
    }

    info!(username, "Login succeeded");
    Ok(account)
}
