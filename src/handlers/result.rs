// src/handlers/result.rs

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    error::AppError,
    models::result::{SubmissionResponse, SubmitAnswersRequest},
    services::{results, scoring},
    store::Store,
    utils::guard::Identity,
};

/// Scores the caller's answers for a quiz.
///
/// 201 when this is the first result for the pair, 200 when an earlier one
/// was overwritten.
pub async fn submit(
    State(store): State<Arc<dyn Store>>,
    Extension(identity): Extension<Identity>,
    Path(quiz_id): Path<i64>,
    Json(req): Json<SubmitAnswersRequest>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = scoring::submit(store.as_ref(), &identity, quiz_id, &req.answers).await?;

    let status = if outcome.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((
        status,
        Json(SubmissionResponse {
            result_id: outcome.result.id,
            score: outcome.result.score,
            total: outcome.result.total,
        }),
    ))
}

/// The caller's own results with quiz titles.
pub async fn my_results(
    State(store): State<Arc<dyn Store>>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, AppError> {
    let entries = results::mine(store.as_ref(), &identity).await?;
    Ok(Json(entries))
}

/// Results on one quiz with taker name and email. Its author or an admin.
pub async fn quiz_results(
    State(store): State<Arc<dyn Store>>,
    Extension(identity): Extension<Identity>,
    Path(quiz_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let attempts = results::for_quiz(store.as_ref(), &identity, quiz_id).await?;
    Ok(Json(attempts.attempts))
}
