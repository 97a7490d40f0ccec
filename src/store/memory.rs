// src/store/memory.rs

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::{
    error::AppError,
    models::{
        quiz::{NewQuiz, Quiz, QuizFilter, QuizPatch, QuizSummary},
        result::{NewResult, QuizResult, QuizResultEntry, UpsertOutcome, UserResultEntry, percentage},
        stats::{AuthorStats, RecentCount, SystemStats, UserCounts},
        user::{NewUser, Role, User, UserPatch},
    },
    store::Store,
};

/// In-process store. Every mutation runs under one write lock, which is
/// what makes the uniqueness rules and cascades atomic here.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    quizzes: BTreeMap<i64, Quiz>,
    results: BTreeMap<i64, QuizResult>,
    last_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn email_taken(&self, email: &str, except: Option<i64>) -> bool {
        self.users
            .values()
            .any(|u| u.email == email && Some(u.id) != except)
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn page<T: Clone>(items: &[T], offset: i64, limit: i64) -> Vec<T> {
    items
        .iter()
        .skip(offset.max(0) as usize)
        .take(limit.max(0) as usize)
        .cloned()
        .collect()
}

fn email_conflict() -> AppError {
    AppError::Conflict("Email already registered".to_string())
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_user(&self, user: NewUser) -> Result<User, AppError> {
        let mut tables = self.tables.write().await;
        if tables.email_taken(&user.email, None) {
            return Err(email_conflict());
        }

        let id = tables.next_id();
        let user = User {
            id,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            created_at: Utc::now(),
        };
        tables.users.insert(id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>, AppError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn list_users(
        &self,
        search: Option<&str>,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<User>, i64), AppError> {
        let tables = self.tables.read().await;
        let mut users: Vec<User> = tables
            .users
            .values()
            .filter(|u| search.is_none_or(|s| contains_ci(&u.name, s) || contains_ci(&u.email, s)))
            .cloned()
            .collect();
        users.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));

        Ok((page(&users, offset, limit), users.len() as i64))
    }

    async fn update_user(&self, id: i64, patch: UserPatch) -> Result<Option<User>, AppError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&id) {
            return Ok(None);
        }
        if let Some(email) = &patch.email {
            if tables.email_taken(email, Some(id)) {
                return Err(email_conflict());
            }
        }

        let Some(user) = tables.users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = patch.name {
            user.name = name;
        }
        if let Some(email) = patch.email {
            user.email = email;
        }
        if let Some(hash) = patch.password_hash {
            user.password_hash = hash;
        }
        if let Some(role) = patch.role {
            user.role = role;
        }
        Ok(Some(user.clone()))
    }

    async fn delete_user(&self, id: i64) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&id) {
            return Ok(false);
        }
        tables.results.retain(|_, r| r.user_id != id);
        tables.users.remove(&id);
        Ok(true)
    }

    async fn insert_quiz(&self, quiz: NewQuiz) -> Result<Quiz, AppError> {
        let mut tables = self.tables.write().await;
        let id = tables.next_id();
        let now = Utc::now();
        let quiz = Quiz {
            id,
            title: quiz.title,
            description: quiz.description,
            questions: quiz.questions,
            created_by: quiz.created_by,
            created_at: now,
            updated_at: now,
        };
        tables.quizzes.insert(id, quiz.clone());
        Ok(quiz)
    }

    async fn find_quiz(&self, id: i64) -> Result<Option<Quiz>, AppError> {
        Ok(self.tables.read().await.quizzes.get(&id).cloned())
    }

    async fn list_quizzes(&self, filter: &QuizFilter) -> Result<(Vec<QuizSummary>, i64), AppError> {
        let tables = self.tables.read().await;
        let mut quizzes: Vec<&Quiz> = tables
            .quizzes
            .values()
            .filter(|q| filter.author.is_none_or(|a| q.created_by == a))
            .filter(|q| filter.search.as_deref().is_none_or(|s| contains_ci(&q.title, s)))
            .collect();
        quizzes.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));

        let summaries: Vec<QuizSummary> = quizzes
            .iter()
            .map(|q| QuizSummary {
                id: q.id,
                title: q.title.clone(),
                description: q.description.clone(),
                created_by: q.created_by,
                author_name: tables.users.get(&q.created_by).map(|u| u.name.clone()),
                question_count: q.questions.len() as i64,
                attempt_count: tables.results.values().filter(|r| r.quiz_id == q.id).count() as i64,
                created_at: q.created_at,
            })
            .collect();

        Ok((page(&summaries, filter.offset, filter.limit), summaries.len() as i64))
    }

    async fn update_quiz(&self, id: i64, patch: QuizPatch) -> Result<Option<Quiz>, AppError> {
        let mut tables = self.tables.write().await;
        let Some(quiz) = tables.quizzes.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(title) = patch.title {
            quiz.title = title;
        }
        if let Some(description) = patch.description {
            quiz.description = description;
        }
        if let Some(questions) = patch.questions {
            quiz.questions = questions;
        }
        quiz.updated_at = Utc::now();
        Ok(Some(quiz.clone()))
    }

    async fn delete_quiz(&self, id: i64) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        if !tables.quizzes.contains_key(&id) {
            return Ok(false);
        }
        tables.results.retain(|_, r| r.quiz_id != id);
        tables.quizzes.remove(&id);
        Ok(true)
    }

    async fn upsert_result(&self, result: NewResult) -> Result<UpsertOutcome, AppError> {
        let mut tables = self.tables.write().await;
        if !tables.quizzes.contains_key(&result.quiz_id) {
            return Err(AppError::NotFound("Quiz not found".to_string()));
        }
        if !tables.users.contains_key(&result.user_id) {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        let now = Utc::now();
        let existing = tables
            .results
            .values_mut()
            .find(|r| r.user_id == result.user_id && r.quiz_id == result.quiz_id);

        if let Some(existing) = existing {
            existing.responses = result.responses;
            existing.score = result.score;
            existing.total = result.total;
            existing.updated_at = now;
            return Ok(UpsertOutcome {
                result: existing.clone(),
                created: false,
            });
        }

        let id = tables.next_id();
        let stored = QuizResult {
            id,
            user_id: result.user_id,
            quiz_id: result.quiz_id,
            responses: result.responses,
            score: result.score,
            total: result.total,
            created_at: now,
            updated_at: now,
        };
        tables.results.insert(id, stored.clone());
        Ok(UpsertOutcome {
            result: stored,
            created: true,
        })
    }

    async fn results_for_user(&self, user_id: i64) -> Result<Vec<UserResultEntry>, AppError> {
        let tables = self.tables.read().await;
        let mut entries: Vec<UserResultEntry> = tables
            .results
            .values()
            .filter(|r| r.user_id == user_id)
            .map(|r| UserResultEntry {
                id: r.id,
                quiz_id: r.quiz_id,
                quiz_title: tables.quizzes.get(&r.quiz_id).map(|q| q.title.clone()),
                responses: r.responses.clone(),
                score: r.score,
                total: r.total,
                created_at: r.created_at,
                updated_at: r.updated_at,
            })
            .collect();
        entries.sort_by(|a, b| (b.updated_at, b.id).cmp(&(a.updated_at, a.id)));
        Ok(entries)
    }

    async fn results_for_quiz(&self, quiz_id: i64) -> Result<Vec<QuizResultEntry>, AppError> {
        let tables = self.tables.read().await;
        let mut entries: Vec<QuizResultEntry> = tables
            .results
            .values()
            .filter(|r| r.quiz_id == quiz_id)
            .map(|r| {
                let user = tables.users.get(&r.user_id);
                QuizResultEntry {
                    id: r.id,
                    user_id: r.user_id,
                    user_name: user.map(|u| u.name.clone()),
                    user_email: user.map(|u| u.email.clone()),
                    responses: r.responses.clone(),
                    score: r.score,
                    total: r.total,
                    percentage: percentage(r.score, r.total),
                    created_at: r.created_at,
                    updated_at: r.updated_at,
                }
            })
            .collect();
        entries.sort_by(|a, b| (b.updated_at, b.id).cmp(&(a.updated_at, a.id)));
        Ok(entries)
    }

    async fn system_stats(&self, since: DateTime<Utc>) -> Result<SystemStats, AppError> {
        let tables = self.tables.read().await;
        let with_role = |role: Role| tables.users.values().filter(|u| u.role == role).count() as i64;

        Ok(SystemStats {
            users: UserCounts {
                total: tables.users.len() as i64,
                students: with_role(Role::Student),
                teachers: with_role(Role::Teacher),
                admins: with_role(Role::Admin),
                recent: tables.users.values().filter(|u| u.created_at >= since).count() as i64,
            },
            quizzes: RecentCount {
                total: tables.quizzes.len() as i64,
                recent: tables.quizzes.values().filter(|q| q.created_at >= since).count() as i64,
            },
            results: RecentCount {
                total: tables.results.len() as i64,
                recent: tables.results.values().filter(|r| r.created_at >= since).count() as i64,
            },
        })
    }

    async fn author_stats(&self, author_id: i64, since: DateTime<Utc>) -> Result<AuthorStats, AppError> {
        let tables = self.tables.read().await;
        let owned: Vec<&Quiz> = tables
            .quizzes
            .values()
            .filter(|q| q.created_by == author_id)
            .collect();
        let attempts: Vec<&QuizResult> = tables
            .results
            .values()
            .filter(|r| owned.iter().any(|q| q.id == r.quiz_id))
            .collect();

        let average_score = if attempts.is_empty() {
            0
        } else {
            let sum: f64 = attempts
                .iter()
                .map(|r| if r.total > 0 { r.score as f64 / r.total as f64 * 100.0 } else { 0.0 })
                .sum();
            (sum / attempts.len() as f64).round() as i64
        };

        Ok(AuthorStats {
            total_quizzes: owned.len() as i64,
            total_attempts: attempts.len() as i64,
            recent_quizzes: owned.iter().filter(|q| q.created_at >= since).count() as i64,
            recent_attempts: attempts.iter().filter(|r| r.created_at >= since).count() as i64,
            average_score,
        })
    }
}
