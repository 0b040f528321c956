//! Login and the per-role consoles.
//!
//! A successful login yields either an [`AdminConsole`] or a
//! [`MemberConsole`]; each exposes only what that role may do. Consoles
//! publish a [`LibraryEvent`] on the shared bus after every committed change.

mod admin;
mod member;

pub use admin::AdminConsole;
pub use member::MemberConsole;

use crate::{
    config::Settings,
    core::{
        auth::{UserAccount, authenticate},
        members,
        validation::MemberDraft,
    },
    entities,
    errors::Result,
    events::{EntityKind, EventBus, LibraryEvent},
};
use chrono::{Local, NaiveDate};
use sea_orm::DatabaseConnection;

/// Everything a console needs: the store, the event bus and the settings.
#[derive(Debug, Clone)]
pub struct LibraryContext {
    pub db: DatabaseConnection,
    pub events: EventBus,
    pub settings: Settings,
    fixed_date: Option<NaiveDate>,
}

impl LibraryContext {
    #[must_use]
    pub fn new(db: DatabaseConnection, settings: Settings) -> Self {
        Self {
            db,
            events: EventBus::default(),
            settings,
            fixed_date: None,
        }
    }

    /// Pins "today" to `date` instead of the local calendar date.
    #[must_use]
    pub fn with_fixed_date(mut self, date: NaiveDate) -> Self {
        self.fixed_date = Some(date);
        self
    }

    /// The date lending operations run on.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.fixed_date
            .unwrap_or_else(|| Local::now().date_naive())
    }

    pub(crate) fn announce(&self, event: LibraryEvent) {
        self.events.publish(event);
    }
}

/// The console opened by a login.
#[derive(Debug)]
pub enum Console {
    Administrator(AdminConsole),
    Member(MemberConsole),
}

/// Authenticates against the context's database and opens the matching console.
///
/// # Errors
/// [`crate::errors::Error::UnknownUsername`] or
/// [`crate::errors::Error::IncorrectPassword`] on bad credentials.
pub async fn login(ctx: &LibraryContext, username: &str, password: &str) -> Result<Console> {
    let console = match authenticate(&ctx.db, username, password).await? {
        UserAccount::Administrator(account) => {
            Console::Administrator(AdminConsole::new(ctx.clone(), account))
        }
        UserAccount::Member(account) => Console::Member(MemberConsole::new(ctx.clone(), account)),
    };
    Ok(console)
}

/// Self-service sign-up from the login screen.
pub async fn register_member(
    ctx: &LibraryContext,
    draft: MemberDraft,
) -> Result<entities::member::Model> {
    let member = members::register_member(&ctx.db, draft).await?;
    ctx.announce(LibraryEvent::Added {
        kind: EntityKind::Member,
        id: member.id,
    });
    Ok(member)
}
