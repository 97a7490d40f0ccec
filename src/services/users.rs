// src/services/users.rs

use crate::{
    config::Config,
    error::AppError,
    models::{
        Page, Pagination, page_window,
        user::{
            AdminUpdateUserRequest, NewUser, Role, User, UserListParams, UserPatch, check_email,
            normalize_email,
        },
    },
    store::Store,
    utils::{
        guard::{Identity, permissions},
        hash::hash_password,
    },
};

pub async fn get(store: &dyn Store, id: i64) -> Result<User, AppError> {
    store
        .find_user(id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

pub async fn list(
    store: &dyn Store,
    caller: &Identity,
    params: UserListParams,
) -> Result<Page<User>, AppError> {
    caller.require(permissions::MANAGE_USERS)?;

    let (page, limit, offset) = page_window(params.page, params.limit);
    let search = params.search.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let (items, total) = store.list_users(search, offset, limit).await?;

    Ok(Page {
        items,
        pagination: Pagination::new(page, limit, total),
    })
}

/// Admin edit of any account. An admin can not demote themselves.
pub async fn admin_update(
    store: &dyn Store,
    caller: &Identity,
    id: i64,
    payload: AdminUpdateUserRequest,
) -> Result<User, AppError> {
    caller.require(permissions::MANAGE_USERS)?;

    let role = payload.role.as_deref().map(str::parse::<Role>).transpose()?;
    if id == caller.user_id && role.is_some_and(|r| r != Role::Admin) {
        return Err(AppError::BadRequest(
            "Cannot remove your own admin role".to_string(),
        ));
    }

    let mut patch = UserPatch {
        role,
        ..Default::default()
    };
    if let Some(name) = payload.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        patch.name = Some(name.to_string());
    }
    if let Some(email) = payload.email.as_deref().map(normalize_email).filter(|e| !e.is_empty()) {
        check_email(&email)?;
        patch.email = Some(email);
    }

    let user = store
        .update_user(id, patch)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    tracing::info!(user_id = id, by = caller.user_id, role = %user.role, "User updated by admin");
    Ok(user)
}

/// Deletes an account and its results. Quizzes the user wrote are kept.
/// An admin can not delete their own account here.
pub async fn admin_delete(store: &dyn Store, caller: &Identity, id: i64) -> Result<(), AppError> {
    caller.require(permissions::MANAGE_USERS)?;

    if id == caller.user_id {
        return Err(AppError::BadRequest(
            "Cannot delete your own account".to_string(),
        ));
    }

    if !store.delete_user(id).await? {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    tracing::info!(user_id = id, by = caller.user_id, "User deleted");
    Ok(())
}

/// Creates the configured admin account on startup if it does not exist.
pub async fn seed_admin(store: &dyn Store, config: &Config) -> Result<(), AppError> {
    let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) else {
        return Ok(());
    };

    let email = normalize_email(email);
    if store.find_user_by_email(&email).await?.is_some() {
        return Ok(());
    }

    tracing::info!("Seeding admin user: {}", email);
    store
        .insert_user(NewUser {
            name: config
                .admin_name
                .clone()
                .unwrap_or_else(|| "Administrator".to_string()),
            email,
            password_hash: hash_password(password)?,
            role: Role::Admin,
        })
        .await?;
    tracing::info!("Admin user created successfully.");
    Ok(())
}
