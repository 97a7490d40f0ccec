// src/models/result.rs

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};

/// Outcome of one answered question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub question_index: usize,
    pub selected_answer_index: i64,
    pub is_correct: bool,
}

/// Represents the 'results' table.
/// At most one row exists per `(user_id, quiz_id)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub id: i64,
    pub user_id: i64,
    pub quiz_id: i64,
    pub responses: Vec<Response>,
    pub score: i64,
    pub total: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, FromRow)]
pub struct QuizResultRow {
    pub id: i64,
    pub user_id: i64,
    pub quiz_id: i64,
    pub responses: Json<Vec<Response>>,
    pub score: i64,
    pub total: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<QuizResultRow> for QuizResult {
    fn from(row: QuizResultRow) -> Self {
        QuizResult {
            id: row.id,
            user_id: row.user_id,
            quiz_id: row.quiz_id,
            responses: row.responses.0,
            score: row.score,
            total: row.total,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Scored submission handed to the store for upserting.
#[derive(Debug, Clone)]
pub struct NewResult {
    pub user_id: i64,
    pub quiz_id: i64,
    pub responses: Vec<Response>,
    pub score: i64,
    pub total: i64,
}

/// What the store did with a `NewResult`.
#[derive(Debug, Clone)]
pub struct UpsertOutcome {
    pub result: QuizResult,
    /// `false` when an earlier result for the same pair was overwritten.
    pub created: bool,
}

/// DTO for submitting answers, one selected option index per question.
#[derive(Debug, Deserialize)]
pub struct SubmitAnswersRequest {
    pub answers: Vec<i64>,
}

/// DTO returned after a submission.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResponse {
    pub result_id: i64,
    pub score: i64,
    pub total: i64,
}

/// A taker's own result, joined with the quiz title.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResultEntry {
    pub id: i64,
    pub quiz_id: i64,
    /// `None` only transiently; quiz deletion cascades to results.
    pub quiz_title: Option<String>,
    pub responses: Vec<Response>,
    pub score: i64,
    pub total: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, FromRow)]
pub struct UserResultRow {
    pub id: i64,
    pub quiz_id: i64,
    pub quiz_title: Option<String>,
    pub responses: Json<Vec<Response>>,
    pub score: i64,
    pub total: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<UserResultRow> for UserResultEntry {
    fn from(row: UserResultRow) -> Self {
        UserResultEntry {
            id: row.id,
            quiz_id: row.quiz_id,
            quiz_title: row.quiz_title,
            responses: row.responses.0,
            score: row.score,
            total: row.total,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// A result on one quiz, joined with the taker's name and email.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResultEntry {
    pub id: i64,
    pub user_id: i64,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub responses: Vec<Response>,
    pub score: i64,
    pub total: i64,
    pub percentage: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, FromRow)]
pub struct QuizResultEntryRow {
    pub id: i64,
    pub user_id: i64,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub responses: Json<Vec<Response>>,
    pub score: i64,
    pub total: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<QuizResultEntryRow> for QuizResultEntry {
    fn from(row: QuizResultEntryRow) -> Self {
        QuizResultEntry {
            id: row.id,
            user_id: row.user_id,
            user_name: row.user_name,
            user_email: row.user_email,
            percentage: percentage(row.score, row.total),
            responses: row.responses.0,
            score: row.score,
            total: row.total,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Rounded score percentage; zero for an empty quiz.
pub fn percentage(score: i64, total: i64) -> i64 {
    if total <= 0 {
        return 0;
    }
    ((score as f64 / total as f64) * 100.0).round() as i64
}

#[cfg(test)]
mod tests {
    use super::percentage;

    #[test]
    fn percentage_rounds_and_handles_empty() {
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(0, 0), 0);
        assert_eq!(percentage(4, 4), 100);
    }
}
