// src/store/mod.rs

//! Persistence boundary.
//!
//! Uniqueness (user email, one result per user and quiz) and the cascade
//! rules live here, so every implementation enforces them the same way.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    error::AppError,
    models::{
        quiz::{NewQuiz, Quiz, QuizFilter, QuizPatch, QuizSummary},
        result::{NewResult, QuizResultEntry, UpsertOutcome, UserResultEntry},
        stats::{AuthorStats, SystemStats},
        user::{NewUser, User, UserPatch},
    },
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait Store: Send + Sync {
    /// Fails with `Conflict` when the email is taken.
    async fn insert_user(&self, user: NewUser) -> Result<User, AppError>;
    async fn find_user(&self, id: i64) -> Result<Option<User>, AppError>;
    /// `email` must already be normalized.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    /// Newest first. `search` matches name or email, case-insensitively.
    async fn list_users(
        &self,
        search: Option<&str>,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<User>, i64), AppError>;
    /// `Ok(None)` when the user does not exist; `Conflict` on a taken email.
    async fn update_user(&self, id: i64, patch: UserPatch) -> Result<Option<User>, AppError>;
    /// Removes the user's results, then the user. Authored quizzes stay.
    async fn delete_user(&self, id: i64) -> Result<bool, AppError>;

    async fn insert_quiz(&self, quiz: NewQuiz) -> Result<Quiz, AppError>;
    async fn find_quiz(&self, id: i64) -> Result<Option<Quiz>, AppError>;
    /// Newest first, with author name and question / attempt counts.
    async fn list_quizzes(&self, filter: &QuizFilter) -> Result<(Vec<QuizSummary>, i64), AppError>;
    async fn update_quiz(&self, id: i64, patch: QuizPatch) -> Result<Option<Quiz>, AppError>;
    /// Removes the quiz's results, then the quiz.
    async fn delete_quiz(&self, id: i64) -> Result<bool, AppError>;

    /// Inserts the result, or overwrites the existing one for the same
    /// `(user_id, quiz_id)` in place. Atomic with respect to that pair.
    async fn upsert_result(&self, result: NewResult) -> Result<UpsertOutcome, AppError>;
    async fn results_for_user(&self, user_id: i64) -> Result<Vec<UserResultEntry>, AppError>;
    async fn results_for_quiz(&self, quiz_id: i64) -> Result<Vec<QuizResultEntry>, AppError>;

    async fn system_stats(&self, since: DateTime<Utc>) -> Result<SystemStats, AppError>;
    async fn author_stats(&self, author_id: i64, since: DateTime<Utc>) -> Result<AuthorStats, AppError>;
}
