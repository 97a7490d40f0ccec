// src/handlers/quiz.rs

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use crate::{
    error::AppError,
    models::quiz::{CreateQuizRequest, QuizListParams, QuizViewParams, UpdateQuizRequest},
    services::{concealment, quizzes},
    store::Store,
    utils::guard::Identity,
};

/// Lists quizzes (summary only, never questions). Public.
pub async fn list_quizzes(
    State(store): State<Arc<dyn Store>>,
    Query(params): Query<QuizListParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = quizzes::list(store.as_ref(), None, params).await?;
    Ok(Json(page))
}

/// Returns a quiz for taking or reviewing.
///
/// Teachers and admins may pass `?includeAnswers=true`; for everyone else
/// the correct answers are stripped regardless.
pub async fn get_quiz(
    State(store): State<Arc<dyn Store>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
    Query(params): Query<QuizViewParams>,
) -> Result<impl IntoResponse, AppError> {
    let quiz = quizzes::get(store.as_ref(), id).await?;
    Ok(Json(concealment::view(&quiz, identity.role, params.include_answers)))
}

/// Creates a quiz owned by the caller. Teachers and admins.
pub async fn create_quiz(
    State(store): State<Arc<dyn Store>>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<CreateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    let quiz = quizzes::create(store.as_ref(), &identity, payload).await?;
    Ok((StatusCode::CREATED, Json(json!({ "id": quiz.id }))))
}

/// Updates a quiz. Its author or an admin.
pub async fn update_quiz(
    State(store): State<Arc<dyn Store>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    let quiz = quizzes::update(store.as_ref(), &identity, id, payload).await?;
    Ok(Json(concealment::view(&quiz, identity.role, true)))
}

/// Deletes a quiz and all of its results. Its author or an admin.
pub async fn delete_quiz(
    State(store): State<Arc<dyn Store>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    quizzes::delete(store.as_ref(), &identity, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
