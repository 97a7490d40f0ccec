// src/services/results.rs

use serde::Serialize;

use crate::{
    error::AppError,
    models::result::{QuizResultEntry, UserResultEntry},
    services::quizzes,
    store::Store,
    utils::guard::{Identity, permissions},
};

/// Header of an attempts listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizHeader {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub question_count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAttempts {
    pub quiz: QuizHeader,
    pub attempts: Vec<QuizResultEntry>,
    pub total_attempts: usize,
}

/// The caller's own results, newest first.
pub async fn mine(store: &dyn Store, caller: &Identity) -> Result<Vec<UserResultEntry>, AppError> {
    store.results_for_user(caller.user_id).await
}

/// Every result on one quiz, with taker name and email.
/// Restricted to the quiz's author and admins.
pub async fn for_quiz(
    store: &dyn Store,
    caller: &Identity,
    quiz_id: i64,
) -> Result<QuizAttempts, AppError> {
    caller.require(permissions::VIEW_QUIZ_RESULTS)?;
    let quiz = quizzes::get(store, quiz_id).await?;
    caller.require_owner_or(quiz.created_by, permissions::MANAGE_ANY_QUIZ)?;

    let attempts = store.results_for_quiz(quiz_id).await?;
    Ok(QuizAttempts {
        total_attempts: attempts.len(),
        attempts,
        quiz: QuizHeader {
            id: quiz.id,
            question_count: quiz.questions.len(),
            title: quiz.title,
            description: quiz.description,
        },
    })
}
