// src/services/quizzes.rs

use validator::Validate;

use crate::{
    error::AppError,
    models::{
        Page, Pagination, page_window,
        quiz::{
            CreateQuizRequest, NewQuiz, Question, QuestionInput, Quiz, QuizFilter, QuizListParams,
            QuizPatch, QuizSummary, UpdateQuizRequest,
        },
    },
    store::Store,
    utils::guard::{Identity, permissions},
};

/// Shared by create and update. A question is valid when it has text, at
/// least two options, and a correct index inside the option list.
pub fn validate_questions(input: Vec<QuestionInput>) -> Result<Vec<Question>, AppError> {
    if input.is_empty() {
        return Err(AppError::BadRequest(
            "Questions must be a non-empty array".to_string(),
        ));
    }

    input
        .into_iter()
        .enumerate()
        .map(|(index, q)| {
            let correct = q
                .correct_answer_index
                .and_then(|i| usize::try_from(i).ok())
                .filter(|i| *i < q.options.len());

            match correct {
                Some(correct) if !q.text.trim().is_empty() && q.options.len() >= 2 => Ok(Question {
                    text: q.text,
                    options: q.options,
                    correct_answer_index: correct,
                }),
                _ => Err(AppError::InvalidQuestion(index)),
            }
        })
        .collect()
}

pub async fn get(store: &dyn Store, id: i64) -> Result<Quiz, AppError> {
    store
        .find_quiz(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Quiz not found".to_string()))
}

pub async fn create(
    store: &dyn Store,
    caller: &Identity,
    payload: CreateQuizRequest,
) -> Result<Quiz, AppError> {
    caller.require(permissions::AUTHOR_QUIZZES)?;

    let title = payload.title.trim().to_string();
    if title.is_empty() || payload.questions.is_empty() {
        return Err(AppError::BadRequest(
            "Title and questions are required".to_string(),
        ));
    }
    payload.validate()?;
    let questions = validate_questions(payload.questions)?;

    let quiz = store
        .insert_quiz(NewQuiz {
            title,
            description: payload.description.unwrap_or_default(),
            questions,
            created_by: caller.user_id,
        })
        .await?;

    tracing::info!(quiz_id = quiz.id, author = caller.user_id, "Quiz created");
    Ok(quiz)
}

/// Applies a partial update. Only the quiz's author or an admin may edit it.
pub async fn update(
    store: &dyn Store,
    caller: &Identity,
    id: i64,
    payload: UpdateQuizRequest,
) -> Result<Quiz, AppError> {
    caller.require(permissions::AUTHOR_QUIZZES)?;
    let existing = get(store, id).await?;
    caller.require_owner_or(existing.created_by, permissions::MANAGE_ANY_QUIZ)?;

    payload.validate()?;

    let title = match payload.title {
        Some(title) if title.trim().is_empty() => {
            return Err(AppError::BadRequest("Title cannot be empty".to_string()));
        }
        Some(title) => Some(title.trim().to_string()),
        None => None,
    };
    let questions = payload.questions.map(validate_questions).transpose()?;

    let patch = QuizPatch {
        title,
        description: payload.description,
        questions,
    };

    let quiz = store
        .update_quiz(id, patch)
        .await?
        .ok_or_else(|| AppError::NotFound("Quiz not found".to_string()))?;

    tracing::info!(quiz_id = id, editor = caller.user_id, "Quiz updated");
    Ok(quiz)
}

/// Deletes a quiz together with every result that references it.
pub async fn delete(store: &dyn Store, caller: &Identity, id: i64) -> Result<(), AppError> {
    caller.require(permissions::AUTHOR_QUIZZES)?;
    let existing = get(store, id).await?;
    caller.require_owner_or(existing.created_by, permissions::MANAGE_ANY_QUIZ)?;

    if !store.delete_quiz(id).await? {
        return Err(AppError::NotFound("Quiz not found".to_string()));
    }

    tracing::info!(quiz_id = id, by = caller.user_id, "Quiz deleted");
    Ok(())
}

pub async fn list(
    store: &dyn Store,
    author: Option<i64>,
    params: QuizListParams,
) -> Result<Page<QuizSummary>, AppError> {
    let (page, limit, offset) = page_window(params.page, params.limit);
    let filter = QuizFilter {
        author,
        search: params.search.filter(|s| !s.trim().is_empty()),
        offset,
        limit,
    };

    let (items, total) = store.list_quizzes(&filter).await?;
    Ok(Page {
        items,
        pagination: Pagination::new(page, limit, total),
    })
}
