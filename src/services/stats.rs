// src/services/stats.rs

use chrono::{DateTime, Duration, Utc};

use crate::{
    config::RECENT_ACTIVITY_DAYS,
    error::AppError,
    models::stats::{AuthorStats, SystemStats},
    store::Store,
    utils::guard::{Identity, permissions},
};

fn recent_cutoff() -> DateTime<Utc> {
    Utc::now() - Duration::days(RECENT_ACTIVITY_DAYS)
}

/// Aggregate counters over the caller's own quizzes.
pub async fn for_author(store: &dyn Store, caller: &Identity) -> Result<AuthorStats, AppError> {
    caller.require(permissions::TEACHER_DASHBOARD)?;
    store.author_stats(caller.user_id, recent_cutoff()).await
}

/// Platform-wide counters.
pub async fn for_system(store: &dyn Store, caller: &Identity) -> Result<SystemStats, AppError> {
    caller.require(permissions::SYSTEM_STATS)?;
    store.system_stats(recent_cutoff()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{
            quiz::{NewQuiz, Question},
            result::{NewResult, Response},
            user::{NewUser, Role},
        },
        store::MemoryStore,
    };

    #[tokio::test]
    async fn author_average_is_mean_of_percentages() {
        let store = MemoryStore::new();
        let mut takers = Vec::new();
        for (i, role) in [Role::Teacher, Role::Student, Role::Student].into_iter().enumerate() {
            let user = store
                .insert_user(NewUser {
                    name: format!("u{}", i),
                    email: format!("u{}@example.com", i),
                    password_hash: "hash".into(),
                    role,
                })
                .await
                .unwrap();
            takers.push(user);
        }
        let teacher = Identity { user_id: takers[0].id, role: Role::Teacher };

        let quiz = store
            .insert_quiz(NewQuiz {
                title: "Traits".into(),
                description: String::new(),
                questions: vec![
                    Question { text: "a".into(), options: vec!["x".into(), "y".into()], correct_answer_index: 0 },
                    Question { text: "b".into(), options: vec!["x".into(), "y".into()], correct_answer_index: 0 },
                ],
                created_by: teacher.user_id,
            })
            .await
            .unwrap();

        for (user, score) in [(&takers[1], 2), (&takers[2], 1)] {
            let responses = (0..2)
                .map(|i| Response { question_index: i, selected_answer_index: 0, is_correct: (i as i64) < score })
                .collect();
            store
                .upsert_result(NewResult { user_id: user.id, quiz_id: quiz.id, responses, score, total: 2 })
                .await
                .unwrap();
        }

        let stats = for_author(&store, &teacher).await.unwrap();
        assert_eq!(stats.total_quizzes, 1);
        assert_eq!(stats.total_attempts, 2);
        assert_eq!(stats.recent_attempts, 2);
        assert_eq!(stats.average_score, 75);

        let system = for_system(&store, &Identity { user_id: 0, role: Role::Admin }).await.unwrap();
        assert_eq!(system.users.students, 2);
        assert_eq!(system.users.teachers, 1);
        assert_eq!(system.results.total, 2);

        assert!(matches!(
            for_system(&store, &teacher).await,
            Err(AppError::Forbidden(_))
        ));
    }
}
