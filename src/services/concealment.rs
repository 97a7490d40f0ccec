// src/services/concealment.rs

use crate::{
    models::{
        quiz::{QuestionView, Quiz, QuizView},
        user::Role,
    },
    utils::guard::{authorize, permissions},
};

/// Builds the role-appropriate view of a quiz.
///
/// Correct answers are included only when the caller asked for them AND
/// holds a role allowed to see them. A student never gets them.
pub fn view(quiz: &Quiz, role: Role, include_answers: bool) -> QuizView {
    let reveal = include_answers && authorize(role, permissions::VIEW_ANSWERS);

    QuizView {
        id: quiz.id,
        title: quiz.title.clone(),
        description: quiz.description.clone(),
        created_by: quiz.created_by,
        questions: quiz
            .questions
            .iter()
            .map(|q| QuestionView {
                text: q.text.clone(),
                options: q.options.clone(),
                correct_answer_index: reveal.then_some(q.correct_answer_index),
            })
            .collect(),
        created_at: quiz.created_at,
    }
}
