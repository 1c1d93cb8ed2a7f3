// src/handlers/quiz.rs

use std::collections::{BTreeSet, HashMap};

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    handlers::auth::find_user,
    models::{
        attempt::{
            AttemptResult, LastAttempt, QcmListEntry, QuestionReview, SubmitAttemptRequest,
            SubmitAttemptResponse, UserAnswer, UserAttempt,
        },
        question::{Answer, PublicQcm, PublicQuestion, Qcm, Question, QuestionWithAnswers},
    },
    scoring::{self, Tally},
    utils::jwt::Claims,
};

/// Score of one question of a submission, with the selection that earned it.
#[derive(Debug, Clone, PartialEq)]
struct GradedQuestion {
    question_id: i64,
    /// Selected ids belonging to the question, sorted.
    selected: Vec<i64>,
    score: f64,
}

/// Scores every question of a quiz against a submission.
///
/// Questions absent from `answers` are graded as left blank. Selected ids
/// that are not answers of the question are dropped.
fn grade(
    questions: &[QuestionWithAnswers],
    answers: &HashMap<i64, Vec<i64>>,
) -> Vec<GradedQuestion> {
    questions
        .iter()
        .map(|q| {
            let raw = answers.get(&q.question.id).map(Vec::as_slice).unwrap_or(&[]);
            let selected = q.own_answer_ids(raw);
            let (correct, incorrect) = q.answer_key();
            let score = scoring::score(&correct, &incorrect, &selected);

            let mut selected: Vec<i64> = selected.into_iter().collect();
            selected.sort_unstable();

            GradedQuestion {
                question_id: q.question.id,
                selected,
                score,
            }
        })
        .collect()
}

pub(crate) async fn fetch_qcm(pool: &SqlitePool, id: i64) -> Result<Qcm, AppError> {
    sqlx::query_as::<_, Qcm>(
        "SELECT id, title, description, created_by, is_active, created_at FROM qcms WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound("Quiz not found".to_string()))
}

async fn fetch_active_qcm(pool: &SqlitePool, id: i64) -> Result<Qcm, AppError> {
    let qcm = fetch_qcm(pool, id).await?;
    if !qcm.is_active {
        return Err(AppError::NotFound("Quiz is no longer available".to_string()));
    }
    Ok(qcm)
}

/// Loads a quiz's questions and their answers, both in authoring order.
pub(crate) async fn load_questions(
    pool: &SqlitePool,
    qcm_id: i64,
) -> Result<Vec<QuestionWithAnswers>, AppError> {
    let questions = sqlx::query_as::<_, Question>(
        r#"
        SELECT id, qcm_id, question_text, position, created_at
        FROM questions
        WHERE qcm_id = ?
        ORDER BY position, id
        "#,
    )
    .bind(qcm_id)
    .fetch_all(pool)
    .await?;

    let answers = sqlx::query_as::<_, Answer>(
        r#"
        SELECT a.id, a.question_id, a.answer_text, a.is_correct, a.position
        FROM answers a
        JOIN questions q ON q.id = a.question_id
        WHERE q.qcm_id = ?
        ORDER BY a.position, a.id
        "#,
    )
    .bind(qcm_id)
    .fetch_all(pool)
    .await?;

    let mut by_question: HashMap<i64, Vec<Answer>> = HashMap::new();
    for answer in answers {
        by_question.entry(answer.question_id).or_default().push(answer);
    }

    Ok(questions
        .into_iter()
        .map(|question| {
            let answers = by_question.remove(&question.id).unwrap_or_default();
            QuestionWithAnswers { question, answers }
        })
        .collect())
}

/// Lists active quizzes, newest first, with the caller's latest attempt on each.
pub async fn list_qcms(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    let qcms = sqlx::query_as::<_, Qcm>(
        r#"
        SELECT id, title, description, created_by, is_active, created_at
        FROM qcms
        WHERE is_active = TRUE
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .fetch_all(&pool)
    .await?;

    let mut entries = Vec::with_capacity(qcms.len());
    for qcm in qcms {
        let last_attempt = sqlx::query_as::<_, LastAttempt>(
            r#"
            SELECT score, completed_at
            FROM user_attempts
            WHERE user_id = ? AND qcm_id = ?
            ORDER BY completed_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(qcm.id)
        .fetch_optional(&pool)
        .await?;

        entries.push(QcmListEntry {
            id: qcm.id,
            title: qcm.title,
            description: qcm.description,
            created_at: qcm.created_at,
            last_attempt,
        });
    }

    Ok(Json(entries))
}

/// Returns a quiz ready to be taken: correct answers are not disclosed.
pub async fn get_qcm(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let qcm = fetch_active_qcm(&pool, id).await?;
    let questions = load_questions(&pool, id).await?;

    Ok(Json(PublicQcm {
        id: qcm.id,
        title: qcm.title,
        description: qcm.description,
        questions: questions.into_iter().map(PublicQuestion::from).collect(),
    }))
}

/// Submits a user's answers to a quiz.
///
/// * Scores each question with the partial-credit table.
/// * Averages the question scores into a percentage.
/// * Stores the attempt and every checked answer in one transaction.
pub async fn submit_attempt(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(qcm_id): Path<i64>,
    Json(req): Json<SubmitAttemptRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    if find_user(&pool, user_id).await?.is_none() {
        return Err(AppError::AuthError("User no longer exists".to_string()));
    }
    fetch_active_qcm(&pool, qcm_id).await?;

    let questions = load_questions(&pool, qcm_id).await?;
    let graded = grade(&questions, &req.answers);
    let scores: Vec<f64> = graded.iter().map(|g| g.score).collect();
    let score = scoring::overall_percentage(&scores);

    let mut tx = pool.begin().await?;

    let (attempt_id,): (i64,) = sqlx::query_as(
        "INSERT INTO user_attempts (user_id, qcm_id, score) VALUES (?, ?, ?) RETURNING id",
    )
    .bind(user_id)
    .bind(qcm_id)
    .bind(score)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!("Failed to insert attempt: {:?}", e);
        AppError::from(e)
    })?;

    for g in &graded {
        for answer_id in &g.selected {
            sqlx::query(
                "INSERT INTO user_answers (attempt_id, question_id, answer_id) VALUES (?, ?, ?)",
            )
            .bind(attempt_id)
            .bind(g.question_id)
            .bind(answer_id)
            .execute(&mut *tx)
            .await?;
        }
    }

    tx.commit().await?;

    tracing::info!(
        "User {} scored {:.2}% on quiz {} (attempt {})",
        user_id,
        score,
        qcm_id,
        attempt_id
    );

    Ok((
        StatusCode::CREATED,
        Json(SubmitAttemptResponse {
            attempt_id,
            score,
            total_questions: graded.len(),
        }),
    ))
}

/// Shows the result of one of the caller's attempts, question by question.
pub async fn get_attempt(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(attempt_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let attempt = sqlx::query_as::<_, UserAttempt>(
        "SELECT id, user_id, qcm_id, score, completed_at FROM user_attempts WHERE id = ?",
    )
    .bind(attempt_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Attempt not found".to_string()))?;

    if attempt.user_id != claims.user_id()? {
        return Err(AppError::Forbidden("This attempt belongs to another user".to_string()));
    }

    let qcm = fetch_qcm(&pool, attempt.qcm_id).await?;
    let questions = load_questions(&pool, attempt.qcm_id).await?;

    let selections = sqlx::query_as::<_, UserAnswer>(
        "SELECT id, attempt_id, question_id, answer_id FROM user_answers WHERE attempt_id = ?",
    )
    .bind(attempt.id)
    .fetch_all(&pool)
    .await?;

    let mut selected_by_question: HashMap<i64, BTreeSet<i64>> = HashMap::new();
    for s in selections {
        selected_by_question
            .entry(s.question_id)
            .or_default()
            .insert(s.answer_id);
    }

    let reviews = questions
        .iter()
        .map(|q| {
            let selected = selected_by_question.remove(&q.question.id).unwrap_or_default();
            let (correct, incorrect) = q.answer_key();
            let picked = selected.iter().copied().collect();
            let score = Tally::new(&correct, &incorrect, &picked).score();

            let mut correct_answer_ids: Vec<i64> = correct.into_iter().collect();
            correct_answer_ids.sort_unstable();

            QuestionReview {
                question_id: q.question.id,
                question_text: q.question.question_text.clone(),
                selected_answer_ids: selected.into_iter().collect(),
                correct_answer_ids,
                score,
            }
        })
        .collect();

    Ok(Json(AttemptResult {
        attempt,
        qcm_title: qcm.title,
        questions: reviews,
    }))
}
