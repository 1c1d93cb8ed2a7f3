// src/models/attempt.rs

use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use sqlx::FromRow;

/// Represents the 'user_attempts' table in the database.
/// Written once, with its final score, and never updated.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserAttempt {
    pub id: i64,
    pub user_id: i64,
    pub qcm_id: i64,

    /// Percentage in `[0, 100]`.
    pub score: f64,

    pub completed_at: NaiveDateTime,
}

/// Represents the 'user_answers' table: one row per checked answer.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserAnswer {
    pub id: i64,
    pub attempt_id: i64,
    pub question_id: i64,
    pub answer_id: i64,
}

/// DTO for submitting a quiz attempt.
#[derive(Debug, Deserialize)]
pub struct SubmitAttemptRequest {
    /// Key: Question ID.
    /// Value: ids of the answers checked for that question.
    /// Questions missing from the map count as left blank.
    #[serde(default, deserialize_with = "lenient_selections")]
    pub answers: HashMap<i64, Vec<i64>>,
}

/// Reads the selection map without ever rejecting the submission.
///
/// A key that is not a question id is dropped, and a value that is not a
/// list of answer ids becomes an empty selection.
fn lenient_selections<'de, D>(deserializer: D) -> Result<HashMap<i64, Vec<i64>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Object(entries) = Value::deserialize(deserializer)? else {
        return Ok(HashMap::new());
    };

    Ok(entries
        .into_iter()
        .filter_map(|(key, ids)| {
            let question_id = key.trim().parse::<i64>().ok()?;
            Some((question_id, selected_ids(&ids)))
        })
        .collect())
}

fn selected_ids(value: &Value) -> Vec<i64> {
    let Value::Array(items) = value else {
        return Vec::new();
    };

    items
        .iter()
        .map(|item| match item {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
        .collect::<Option<Vec<i64>>>()
        .unwrap_or_default()
}

#[derive(Debug, Serialize)]
pub struct SubmitAttemptResponse {
    pub attempt_id: i64,
    pub score: f64,
    pub total_questions: usize,
}

/// Latest attempt of the current user on a quiz, shown in the quiz list.
#[derive(Debug, Serialize, FromRow)]
pub struct LastAttempt {
    pub score: f64,
    pub completed_at: NaiveDateTime,
}

/// A quiz as listed to users.
#[derive(Debug, Serialize)]
pub struct QcmListEntry {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
    pub last_attempt: Option<LastAttempt>,
}

/// Per-question breakdown of a finished attempt.
#[derive(Debug, Serialize)]
pub struct QuestionReview {
    pub question_id: i64,
    pub question_text: String,
    pub selected_answer_ids: Vec<i64>,
    pub correct_answer_ids: Vec<i64>,
    pub score: f64,
}

#[derive(Debug, Serialize)]
pub struct AttemptResult {
    #[serde(flatten)]
    pub attempt: UserAttempt,
    pub qcm_title: String,
    pub questions: Vec<QuestionReview>,
}
