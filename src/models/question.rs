// src/models/question.rs

use std::collections::HashSet;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use validator::Validate;

/// Represents the 'qcms' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Qcm {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,

    /// Author id. `None` once the author account has been deleted.
    pub created_by: Option<i64>,

    /// Inactive quizzes are hidden from users and refuse submissions.
    pub is_active: bool,

    pub created_at: NaiveDateTime,
}

/// Admin listing row: a quiz and how many questions it has.
#[derive(Debug, Serialize, FromRow)]
pub struct QcmOverview {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub created_by: Option<i64>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub question_count: i64,
}

/// Represents the 'questions' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Question {
    pub id: i64,
    pub qcm_id: i64,
    pub question_text: String,

    /// Authoring order inside the quiz.
    pub position: i64,

    pub created_at: NaiveDateTime,
}

/// Represents the 'answers' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Answer {
    pub id: i64,
    pub question_id: i64,
    pub answer_text: String,
    pub is_correct: bool,
    pub position: i64,
}

/// A question together with its answers, in authoring order.
#[derive(Debug, Clone)]
pub struct QuestionWithAnswers {
    pub question: Question,
    pub answers: Vec<Answer>,
}

impl QuestionWithAnswers {
    /// Splits the answer ids into (correct, incorrect).
    pub fn answer_key(&self) -> (HashSet<i64>, HashSet<i64>) {
        let (correct, incorrect): (Vec<&Answer>, Vec<&Answer>) =
            self.answers.iter().partition(|a| a.is_correct);
        (
            correct.into_iter().map(|a| a.id).collect(),
            incorrect.into_iter().map(|a| a.id).collect(),
        )
    }

    /// Keeps only the selected ids that belong to this question.
    pub fn own_answer_ids(&self, selected: &[i64]) -> HashSet<i64> {
        selected
            .iter()
            .copied()
            .filter(|id| self.answers.iter().any(|a| a.id == *id))
            .collect()
    }
}

/// DTO for sending a quiz to a user (hides which answers are correct).
#[derive(Debug, Serialize)]
pub struct PublicQcm {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub questions: Vec<PublicQuestion>,
}

#[derive(Debug, Serialize)]
pub struct PublicQuestion {
    pub id: i64,
    pub question_text: String,
    pub answers: Vec<PublicAnswer>,
}

#[derive(Debug, Serialize)]
pub struct PublicAnswer {
    pub id: i64,
    pub answer_text: String,
}

impl From<QuestionWithAnswers> for PublicQuestion {
    fn from(q: QuestionWithAnswers) -> Self {
        Self {
            id: q.question.id,
            question_text: q.question.question_text,
            answers: q
                .answers
                .into_iter()
                .map(|a| PublicAnswer {
                    id: a.id,
                    answer_text: a.answer_text,
                })
                .collect(),
        }
    }
}

/// DTO for authoring a quiz in one request.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQcmRequest {
    #[validate(length(min = 1, max = 200, message = "Quiz title is required."))]
    pub title: String,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub questions: Vec<CreateQuestionRequest>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuestionRequest {
    #[validate(length(min = 1, max = 2000))]
    pub text: String,
    #[serde(default)]
    #[validate(nested)]
    pub answers: Vec<CreateAnswerRequest>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateAnswerRequest {
    #[validate(length(min = 1, max = 1000))]
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
}
