// src/services/scoring.rs

use crate::{
    error::AppError,
    models::{
        quiz::Question,
        result::{NewResult, Response, UpsertOutcome},
    },
    services::quizzes,
    store::Store,
    utils::guard::{Identity, permissions},
};

/// Scores one answer per question, position by position.
///
/// Partial submissions are rejected, never partially scored. Returns the
/// per-question responses and the number answered correctly.
pub fn score(questions: &[Question], answers: &[i64]) -> Result<(Vec<Response>, i64), AppError> {
    if answers.len() != questions.len() {
        return Err(AppError::IncompleteSubmission {
            expected: questions.len(),
            received: answers.len(),
        });
    }

    let responses: Vec<Response> = questions
        .iter()
        .zip(answers)
        .enumerate()
        .map(|(index, (question, &selected))| Response {
            question_index: index,
            selected_answer_index: selected,
            is_correct: i64::try_from(question.correct_answer_index) == Ok(selected),
        })
        .collect();

    let correct = responses.iter().filter(|r| r.is_correct).count() as i64;
    Ok((responses, correct))
}

/// Scores a submission and stores it as the caller's only result for the
/// quiz. A resubmission overwrites the previous result in place.
pub async fn submit(
    store: &dyn Store,
    caller: &Identity,
    quiz_id: i64,
    answers: &[i64],
) -> Result<UpsertOutcome, AppError> {
    caller.require(permissions::SUBMIT_ANSWERS)?;

    let quiz = quizzes::get(store, quiz_id).await?;
    let (responses, correct) = score(&quiz.questions, answers)?;

    let outcome = store
        .upsert_result(NewResult {
            user_id: caller.user_id,
            quiz_id,
            responses,
            score: correct,
            total: quiz.questions.len() as i64,
        })
        .await?;

    tracing::info!(
        user_id = caller.user_id,
        quiz_id,
        score = outcome.result.score,
        total = outcome.result.total,
        created = outcome.created,
        "Submission scored"
    );
    Ok(outcome)
}
