// src/handlers/teacher.rs

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};

use crate::{
    error::AppError,
    models::quiz::QuizListParams,
    services::{quizzes, results, stats},
    store::Store,
    utils::guard::Identity,
};

/// Quizzes written by the caller, with question and attempt counts.
pub async fn my_quizzes(
    State(store): State<Arc<dyn Store>>,
    Extension(identity): Extension<Identity>,
    Query(params): Query<QuizListParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = quizzes::list(store.as_ref(), Some(identity.user_id), params).await?;
    Ok(Json(page))
}

/// All attempts on one of the caller's quizzes (admins: any quiz).
pub async fn quiz_attempts(
    State(store): State<Arc<dyn Store>>,
    Extension(identity): Extension<Identity>,
    Path(quiz_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let attempts = results::for_quiz(store.as_ref(), &identity, quiz_id).await?;
    Ok(Json(attempts))
}

pub async fn my_stats(
    State(store): State<Arc<dyn Store>>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, AppError> {
    let stats = stats::for_author(store.as_ref(), &identity).await?;
    Ok(Json(stats))
}
