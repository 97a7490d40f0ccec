// src/handlers/auth.rs

use std::sync::Arc;

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};

use crate::{
    error::AppError,
    models::user::{AuthResponse, LoginRequest, RegisterRequest, UpdateProfileRequest},
    services::{credentials, users},
    store::Store,
    utils::{guard::Identity, jwt::TokenIssuer},
};

/// Registers a new user.
///
/// Returns 201 Created with a token and the user object (excluding password).
pub async fn register(
    State(store): State<Arc<dyn Store>>,
    State(tokens): State<TokenIssuer>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = credentials::register(store.as_ref(), payload).await?;
    let token = tokens.issue(&user)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            token_type: "Bearer",
            user,
        }),
    ))
}

/// Authenticates a user and returns a JWT token.
pub async fn login(
    State(store): State<Arc<dyn Store>>,
    State(tokens): State<TokenIssuer>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = credentials::verify(store.as_ref(), &payload.email, &payload.password).await?;
    let token = tokens.issue(&user)?;

    Ok(Json(AuthResponse {
        token,
        token_type: "Bearer",
        user,
    }))
}

/// Current user's profile.
pub async fn me(
    State(store): State<Arc<dyn Store>>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, AppError> {
    let user = users::get(store.as_ref(), identity.user_id).await?;
    Ok(Json(user))
}

/// Edits the current user's own name, email or password.
pub async fn update_me(
    State(store): State<Arc<dyn Store>>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = credentials::update_profile(store.as_ref(), identity.user_id, payload).await?;
    Ok(Json(user))
}
