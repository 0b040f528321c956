//! Member and administrator account management.
//!
//! Registration hashes the password with a newly generated identity token
//! before anything is stored. Usernames are unique across both account
//! tables, since one login screen serves both roles.

use crate::{
    core::{
        auth::{hash_password, new_token},
        validation::{MemberDraft, Validate},
    },
    entities::{Administrator, Member, administrator, member},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::info;

async fn ensure_username_free<C: ConnectionTrait>(
    db: &C,
    username: &str,
    except_member: Option<i64>,
) -> Result<()> {
    let admin_taken = Administrator::find()
        .filter(administrator::Column::Username.eq(username))
        .one(db)
        .await?
        .is_some();

    let mut member_query = Member::find().filter(member::Column::Username.eq(username));
    if let Some(id) = except_member {
        member_query = member_query.filter(member::Column::Id.ne(id));
    }
    let member_taken = member_query.one(db).await?.is_some();

    if admin_taken || member_taken {
        return Err(Error::UsernameTaken {
            username: username.to_string(),
        });
    }
    Ok(())
}

/// Registers a new member after validating the form.
///
/// # Errors
/// Returns an error if:
/// - Any field is invalid
/// - The username is already used by a member or administrator
/// - The database insert fails
pub async fn register_member<C: ConnectionTrait>(
    db: &C,
    draft: MemberDraft,
) -> Result<member::Model> {
    draft.ensure_valid()?;
    let username = draft.username.trim().to_string();
    ensure_username_free(db, &username, None).await?;

    let token = new_token();
    let member = member::ActiveModel {
        first_name: Set(draft.first_name.trim().to_string()),
        last_name: Set(draft.last_name.trim().to_string()),
        username: Set(username),
        password: Set(hash_password(&draft.password, &token)),
        token: Set(token),
        is_archived: Set(false),
        ..Default::default()
    };

    let result = member.insert(db).await?;
    info!(member_id = result.id, "Registered member {}", result.username);
    Ok(result)
}

/// Updates a member's names, username and password.
///
/// The password in the draft is plaintext and is re-hashed with the member's
/// existing token.
pub async fn update_member(
    db: &DatabaseConnection,
    member_id: i64,
    draft: MemberDraft,
) -> Result<member::Model> {
    draft.ensure_valid()?;
    let existing = get_active_member(db, member_id).await?;
    let username = draft.username.trim().to_string();
    ensure_username_free(db, &username, Some(member_id)).await?;

    let password = hash_password(&draft.password, &existing.token);
    let mut member: member::ActiveModel = existing.into();
    member.first_name = Set(draft.first_name.trim().to_string());
    member.last_name = Set(draft.last_name.trim().to_string());
    member.username = Set(username);
    member.password = Set(password);

    member.update(db).await.map_err(Into::into)
}

/// Soft deletes a member. Their lending history stays intact.
pub async fn archive_member(db: &DatabaseConnection, member_id: i64) -> Result<member::Model> {
    let mut member: member::ActiveModel = get_active_member(db, member_id).await?.into();
    member.is_archived = Set(true);
    let result = member.update(db).await?;
    info!(member_id, "Archived member");
    Ok(result)
}

/// Finds a member by id, archived or not.
pub async fn get_member_by_id<C: ConnectionTrait>(
    db: &C,
    member_id: i64,
) -> Result<Option<member::Model>> {
    Member::find_by_id(member_id).one(db).await.map_err(Into::into)
}

/// Finds a non-archived member by id, failing with [`Error::NotFound`] otherwise.
pub async fn get_active_member<C: ConnectionTrait>(
    db: &C,
    member_id: i64,
) -> Result<member::Model> {
    get_member_by_id(db, member_id)
        .await?
        .filter(|m| !m.is_archived)
        .ok_or(Error::NotFound {
            entity: "Member",
            id: member_id,
        })
}

/// Retrieves all non-archived members ordered by last then first name.
pub async fn get_active_members(db: &DatabaseConnection) -> Result<Vec<member::Model>> {
    Member::find()
        .filter(member::Column::IsArchived.eq(false))
        .order_by_asc(member::Column::LastName)
        .order_by_asc(member::Column::FirstName)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Creates an administrator account.
pub async fn create_administrator<C: ConnectionTrait>(
    db: &C,
    username: &str,
    password: &str,
) -> Result<administrator::Model> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        return Err(Error::Validation {
            entity: "Administrator",
            errors: vec![crate::core::validation::FieldError {
                field: if username.is_empty() { "Username" } else { "Password" },
                message: "Username and password are required.".to_string(),
            }],
        });
    }
    ensure_username_free(db, username, None).await?;

    let token = new_token();
    let admin = administrator::ActiveModel {
        username: Set(username.to_string()),
        password: Set(hash_password(password, &token)),
        token: Set(token),
        ..Default::default()
    };
    admin.insert(db).await.map_err(Into::into)
}
