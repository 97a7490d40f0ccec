// src/handlers/admin.rs

use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    error::AppError,
    models::{
        quiz::{QuizListParams, UpdateQuizRequest},
        user::{AdminUpdateUserRequest, UserListParams},
    },
    services::{concealment, quizzes, stats, users},
    store::Store,
    utils::guard::Identity,
};

/// Lists users, newest first, with optional name/email search.
/// Admin only.
pub async fn list_users(
    State(store): State<Arc<dyn Store>>,
    Extension(identity): Extension<Identity>,
    Query(params): Query<UserListParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = users::list(store.as_ref(), &identity, params).await?;
    Ok(Json(page))
}

/// Admin only.
pub async fn get_user(
    State(store): State<Arc<dyn Store>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user = users::get(store.as_ref(), id).await?;
    Ok(Json(user))
}

/// Updates name, email or role of a user.
/// Admin only. Admins can not drop their own admin role.
pub async fn update_user(
    State(store): State<Arc<dyn Store>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
    Json(payload): Json<AdminUpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = users::admin_update(store.as_ref(), &identity, id, payload).await?;
    Ok(Json(user))
}

/// Deletes a user by ID.
/// Admin only. Prevents deleting self.
pub async fn delete_user(
    State(store): State<Arc<dyn Store>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    users::admin_delete(store.as_ref(), &identity, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Lists every quiz with optional title search.
/// Admin only.
pub async fn list_quizzes(
    State(store): State<Arc<dyn Store>>,
    Query(params): Query<QuizListParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = quizzes::list(store.as_ref(), None, params).await?;
    Ok(Json(page))
}

/// Full quiz including correct answers.
/// Admin only.
pub async fn get_quiz(
    State(store): State<Arc<dyn Store>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let quiz = quizzes::get(store.as_ref(), id).await?;
    Ok(Json(concealment::view(&quiz, identity.role, true)))
}

/// Admin only.
pub async fn update_quiz(
    State(store): State<Arc<dyn Store>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    let quiz = quizzes::update(store.as_ref(), &identity, id, payload).await?;
    Ok(Json(concealment::view(&quiz, identity.role, true)))
}

/// Deletes a quiz and all of its results.
/// Admin only.
pub async fn delete_quiz(
    State(store): State<Arc<dyn Store>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    quizzes::delete(store.as_ref(), &identity, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Platform-wide counters.
/// Admin only.
pub async fn system_stats(
    State(store): State<Arc<dyn Store>>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, AppError> {
    let stats = stats::for_system(store.as_ref(), &identity).await?;
    Ok(Json(stats))
}
