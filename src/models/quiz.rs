// src/models/quiz.rs

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use validator::Validate;

/// A validated multiple-choice question.
/// `correct_answer_index` is always within `options`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub text: String,
    pub options: Vec<String>,
    pub correct_answer_index: usize,
}

/// Represents the 'quizzes' table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub id: i64,
    pub title: String,
    pub description: String,

    /// Ordered, never empty.
    pub questions: Vec<Question>,

    /// Author. Not a foreign key: quizzes outlive their author's account.
    pub created_by: i64,

    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Raw row as read from Postgres. Questions are stored as a JSON array.
#[derive(Debug, FromRow)]
pub struct QuizRow {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub questions: Json<Vec<Question>>,
    pub created_by: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<QuizRow> for Quiz {
    fn from(row: QuizRow) -> Self {
        Quiz {
            id: row.id,
            title: row.title,
            description: row.description,
            questions: row.questions.0,
            created_by: row.created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Listing entry. Carries no question content.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct QuizSummary {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub created_by: i64,
    /// `None` once the author's account is gone.
    pub author_name: Option<String>,
    pub question_count: i64,
    pub attempt_count: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Question as sent by an author. Loosely typed on purpose so that a bad
/// entry is reported by position instead of failing deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionInput {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(alias = "correctAnswer")]
    pub correct_answer_index: Option<i64>,
}

/// DTO for creating a quiz.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuizRequest {
    #[serde(default)]
    #[validate(length(max = 200, message = "Title must be at most 200 characters."))]
    pub title: String,
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters."))]
    pub description: Option<String>,
    #[serde(default)]
    pub questions: Vec<QuestionInput>,
}

/// DTO for updating a quiz. Fields are optional.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuizRequest {
    #[validate(length(max = 200, message = "Title must be at most 200 characters."))]
    pub title: Option<String>,
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters."))]
    pub description: Option<String>,
    pub questions: Option<Vec<QuestionInput>>,
}

/// Validated insert payload for the store.
#[derive(Debug, Clone)]
pub struct NewQuiz {
    pub title: String,
    pub description: String,
    pub questions: Vec<Question>,
    pub created_by: i64,
}

/// Validated partial update for the store.
#[derive(Debug, Clone, Default)]
pub struct QuizPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub questions: Option<Vec<Question>>,
}

/// Filter for quiz listings.
#[derive(Debug, Clone, Default)]
pub struct QuizFilter {
    pub author: Option<i64>,
    pub search: Option<String>,
    pub offset: i64,
    pub limit: i64,
}

/// Query parameters for quiz listings.
#[derive(Debug, Default, Deserialize)]
pub struct QuizListParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
}

/// Query parameters for reading a single quiz.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizViewParams {
    #[serde(default)]
    pub include_answers: bool,
}

/// Role-dependent read model of a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    pub text: String,
    pub options: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_answer_index: Option<usize>,
}

/// Role-dependent read model of a quiz.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizView {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub created_by: i64,
    pub questions: Vec<QuestionView>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
