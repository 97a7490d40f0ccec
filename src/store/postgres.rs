// src/store/postgres.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder, types::Json};

use crate::{
    error::AppError,
    models::{
        quiz::{NewQuiz, Quiz, QuizFilter, QuizPatch, QuizRow, QuizSummary},
        result::{
            NewResult, QuizResultEntry, QuizResultEntryRow, QuizResultRow, UpsertOutcome,
            UserResultEntry, UserResultRow,
        },
        stats::{AuthorStats, RecentCount, SystemStats, UserCounts},
        user::{NewUser, User, UserPatch, UserRow},
    },
    store::Store,
};

const USER_COLUMNS: &str = "id, name, email, password_hash, role, created_at";
const QUIZ_COLUMNS: &str = "id, title, description, questions, created_by, created_at, updated_at";

// Postgres SQLSTATE codes.
const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

// Named in the migration.
const RESULTS_USER_FK: &str = "results_user_fk";

/// Postgres-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn has_code(err: &sqlx::Error, code: &str) -> bool {
    err.as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|c| c == code)
}

/// Names the missing parent when a result write hits a foreign key.
fn map_result_write(err: sqlx::Error) -> AppError {
    if !has_code(&err, FOREIGN_KEY_VIOLATION) {
        tracing::error!("Failed to upsert result: {:?}", err);
        return AppError::from(err);
    }

    let constraint = err.as_database_error().and_then(|db| db.constraint());
    if constraint == Some(RESULTS_USER_FK) {
        AppError::NotFound("User not found".to_string())
    } else {
        AppError::NotFound("Quiz not found".to_string())
    }
}

fn map_email_conflict(err: sqlx::Error) -> AppError {
    if has_code(&err, UNIQUE_VIOLATION) {
        AppError::Conflict("Email already registered".to_string())
    } else {
        tracing::error!("User write failed: {:?}", err);
        AppError::from(err)
    }
}

#[derive(FromRow)]
struct UpsertRow {
    #[sqlx(flatten)]
    result: QuizResultRow,
    inserted: bool,
}

#[derive(FromRow)]
struct SystemStatsRow {
    users_total: i64,
    students: i64,
    teachers: i64,
    admins: i64,
    users_recent: i64,
    quizzes_total: i64,
    quizzes_recent: i64,
    results_total: i64,
    results_recent: i64,
}

#[derive(FromRow)]
struct AuthorStatsRow {
    total_quizzes: i64,
    recent_quizzes: i64,
    total_attempts: i64,
    recent_attempts: i64,
    average_score: i64,
}

#[async_trait]
impl Store for PgStore {
    async fn insert_user(&self, user: NewUser) -> Result<User, AppError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users (name, email, password_hash, role) VALUES ($1, $2, $3, $4) RETURNING {}",
            USER_COLUMNS
        ))
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(map_email_conflict)?;

        User::try_from(row)
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, UserRow>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, UserRow>(&format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn list_users(
        &self,
        search: Option<&str>,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<User>, i64), AppError> {
        let filter = "($1::TEXT IS NULL OR name ILIKE '%' || $1 || '%' OR email ILIKE '%' || $1 || '%')";

        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE {} ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3",
            USER_COLUMNS, filter
        ))
        .bind(search)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list users: {:?}", e);
            AppError::from(e)
        })?;

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM users WHERE {}", filter))
            .bind(search)
            .fetch_one(&self.pool)
            .await?;

        let users = rows.into_iter().map(User::try_from).collect::<Result<Vec<_>, _>>()?;
        Ok((users, total))
    }

    async fn update_user(&self, id: i64, patch: UserPatch) -> Result<Option<User>, AppError> {
        if patch.is_empty() {
            return self.find_user(id).await;
        }

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE users SET ");
        let mut separated = builder.separated(", ");

        if let Some(name) = patch.name {
            separated.push("name = ");
            separated.push_bind_unseparated(name);
        }

        if let Some(email) = patch.email {
            separated.push("email = ");
            separated.push_bind_unseparated(email);
        }

        if let Some(hash) = patch.password_hash {
            separated.push("password_hash = ");
            separated.push_bind_unseparated(hash);
        }

        if let Some(role) = patch.role {
            separated.push("role = ");
            separated.push_bind_unseparated(role.as_str());
        }

        builder.push(" WHERE id = ");
        builder.push_bind(id);
        builder.push(" RETURNING ");
        builder.push(USER_COLUMNS);

        builder
            .build_query_as::<UserRow>()
            .fetch_optional(&self.pool)
            .await
            .map_err(map_email_conflict)?
            .map(User::try_from)
            .transpose()
    }

    async fn delete_user(&self, id: i64) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM results WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete user: {:?}", e);
                AppError::from(e)
            })?
            .rows_affected();

        tx.commit().await?;
        Ok(deleted > 0)
    }

    async fn insert_quiz(&self, quiz: NewQuiz) -> Result<Quiz, AppError> {
        let row = sqlx::query_as::<_, QuizRow>(&format!(
            "INSERT INTO quizzes (title, description, questions, created_by) VALUES ($1, $2, $3, $4) RETURNING {}",
            QUIZ_COLUMNS
        ))
        .bind(&quiz.title)
        .bind(&quiz.description)
        .bind(Json(&quiz.questions))
        .bind(quiz.created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create quiz: {:?}", e);
            AppError::from(e)
        })?;

        Ok(row.into())
    }

    async fn find_quiz(&self, id: i64) -> Result<Option<Quiz>, AppError> {
        let row = sqlx::query_as::<_, QuizRow>(&format!("SELECT {} FROM quizzes WHERE id = $1", QUIZ_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Quiz::from))
    }

    async fn list_quizzes(&self, filter: &QuizFilter) -> Result<(Vec<QuizSummary>, i64), AppError> {
        let condition = "($1::BIGINT IS NULL OR q.created_by = $1) AND ($2::TEXT IS NULL OR q.title ILIKE '%' || $2 || '%')";

        let items = sqlx::query_as::<_, QuizSummary>(&format!(
            r#"
            SELECT
                q.id, q.title, q.description, q.created_by,
                u.name AS author_name,
                jsonb_array_length(q.questions)::BIGINT AS question_count,
                (SELECT COUNT(*) FROM results r WHERE r.quiz_id = q.id) AS attempt_count,
                q.created_at
            FROM quizzes q
            LEFT JOIN users u ON u.id = q.created_by
            WHERE {}
            ORDER BY q.created_at DESC, q.id DESC
            LIMIT $3 OFFSET $4
            "#,
            condition
        ))
        .bind(filter.author)
        .bind(filter.search.as_deref())
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list quizzes: {:?}", e);
            AppError::from(e)
        })?;

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM quizzes q WHERE {}", condition))
            .bind(filter.author)
            .bind(filter.search.as_deref())
            .fetch_one(&self.pool)
            .await?;

        Ok((items, total))
    }

    async fn update_quiz(&self, id: i64, patch: QuizPatch) -> Result<Option<Quiz>, AppError> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE quizzes SET updated_at = NOW()");

        if let Some(title) = patch.title {
            builder.push(", title = ");
            builder.push_bind(title);
        }

        if let Some(description) = patch.description {
            builder.push(", description = ");
            builder.push_bind(description);
        }

        if let Some(questions) = patch.questions {
            builder.push(", questions = ");
            builder.push_bind(Json(questions));
        }

        builder.push(" WHERE id = ");
        builder.push_bind(id);
        builder.push(" RETURNING ");
        builder.push(QUIZ_COLUMNS);

        let row = builder
            .build_query_as::<QuizRow>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update quiz: {:?}", e);
                AppError::from(e)
            })?;

        Ok(row.map(Quiz::from))
    }

    async fn delete_quiz(&self, id: i64) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM results WHERE quiz_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM quizzes WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete quiz: {:?}", e);
                AppError::from(e)
            })?
            .rows_affected();

        tx.commit().await?;
        Ok(deleted > 0)
    }

    async fn upsert_result(&self, result: NewResult) -> Result<UpsertOutcome, AppError> {
        // `xmax = 0` holds only for a freshly inserted row version.
        let row = sqlx::query_as::<_, UpsertRow>(
            r#"
            INSERT INTO results (user_id, quiz_id, responses, score, total)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, quiz_id) DO UPDATE SET
                responses = EXCLUDED.responses,
                score = EXCLUDED.score,
                total = EXCLUDED.total,
                updated_at = NOW()
            RETURNING id, user_id, quiz_id, responses, score, total, created_at, updated_at,
                (xmax = 0) AS inserted
            "#,
        )
        .bind(result.user_id)
        .bind(result.quiz_id)
        .bind(Json(&result.responses))
        .bind(result.score)
        .bind(result.total)
        .fetch_one(&self.pool)
        .await
        .map_err(map_result_write)?;

        Ok(UpsertOutcome {
            result: row.result.into(),
            created: row.inserted,
        })
    }

    async fn results_for_user(&self, user_id: i64) -> Result<Vec<UserResultEntry>, AppError> {
        let rows = sqlx::query_as::<_, UserResultRow>(
            r#"
            SELECT r.id, r.quiz_id, q.title AS quiz_title, r.responses, r.score, r.total,
                   r.created_at, r.updated_at
            FROM results r
            LEFT JOIN quizzes q ON q.id = r.quiz_id
            WHERE r.user_id = $1
            ORDER BY r.updated_at DESC, r.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(UserResultEntry::from).collect())
    }

    async fn results_for_quiz(&self, quiz_id: i64) -> Result<Vec<QuizResultEntry>, AppError> {
        let rows = sqlx::query_as::<_, QuizResultEntryRow>(
            r#"
            SELECT r.id, r.user_id, u.name AS user_name, u.email AS user_email,
                   r.responses, r.score, r.total, r.created_at, r.updated_at
            FROM results r
            LEFT JOIN users u ON u.id = r.user_id
            WHERE r.quiz_id = $1
            ORDER BY r.updated_at DESC, r.id DESC
            "#,
        )
        .bind(quiz_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(QuizResultEntry::from).collect())
    }

    async fn system_stats(&self, since: DateTime<Utc>) -> Result<SystemStats, AppError> {
        let row = sqlx::query_as::<_, SystemStatsRow>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM users) AS users_total,
                (SELECT COUNT(*) FROM users WHERE role = 'student') AS students,
                (SELECT COUNT(*) FROM users WHERE role = 'teacher') AS teachers,
                (SELECT COUNT(*) FROM users WHERE role = 'admin') AS admins,
                (SELECT COUNT(*) FROM users WHERE created_at >= $1) AS users_recent,
                (SELECT COUNT(*) FROM quizzes) AS quizzes_total,
                (SELECT COUNT(*) FROM quizzes WHERE created_at >= $1) AS quizzes_recent,
                (SELECT COUNT(*) FROM results) AS results_total,
                (SELECT COUNT(*) FROM results WHERE created_at >= $1) AS results_recent
            "#,
        )
        .bind(since)
        .fetch_one(&self.pool)
        .await?;

        Ok(SystemStats {
            users: UserCounts {
                total: row.users_total,
                students: row.students,
                teachers: row.teachers,
                admins: row.admins,
                recent: row.users_recent,
            },
            quizzes: RecentCount {
                total: row.quizzes_total,
                recent: row.quizzes_recent,
            },
            results: RecentCount {
                total: row.results_total,
                recent: row.results_recent,
            },
        })
    }

    async fn author_stats(&self, author_id: i64, since: DateTime<Utc>) -> Result<AuthorStats, AppError> {
        let row = sqlx::query_as::<_, AuthorStatsRow>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM quizzes WHERE created_by = $1) AS total_quizzes,
                (SELECT COUNT(*) FROM quizzes WHERE created_by = $1 AND created_at >= $2) AS recent_quizzes,
                COUNT(r.id) AS total_attempts,
                COUNT(r.id) FILTER (WHERE r.created_at >= $2) AS recent_attempts,
                COALESCE(ROUND(AVG(
                    CASE WHEN r.total > 0 THEN r.score::FLOAT8 / r.total * 100 ELSE 0 END
                )), 0)::BIGINT AS average_score
            FROM results r
            JOIN quizzes q ON q.id = r.quiz_id
            WHERE q.created_by = $1
            "#,
        )
        .bind(author_id)
        .bind(since)
        .fetch_one(&self.pool)
        .await?;

        Ok(AuthorStats {
            total_quizzes: row.total_quizzes,
            total_attempts: row.total_attempts,
            recent_quizzes: row.recent_quizzes,
            recent_attempts: row.recent_attempts,
            average_score: row.average_score,
        })
    }
}
