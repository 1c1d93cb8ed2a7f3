// src/handlers/admin.rs

use axum::{
    Json,
    extract::{Extension, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::AppError,
    handlers::quiz::fetch_qcm,
    models::{
        question::{CreateQcmRequest, QcmOverview},
        user::{Role, USER_COLUMNS, User, UserDirectory},
    },
    utils::{
        html::{clean_optional, clean_required},
        jwt::Claims,
    },
};

/// Lists all users and roles.
/// Admin only.
pub async fn list_users(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let sql = format!(
        "SELECT {USER_COLUMNS} FROM users u JOIN roles r ON r.id = u.role_id ORDER BY u.id DESC"
    );
    let users = sqlx::query_as::<_, User>(&sql)
        .fetch_all(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list users: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    let roles = sqlx::query_as::<_, Role>(
        "SELECT id, name, description, created_at FROM roles ORDER BY id",
    )
    .fetch_all(&pool)
    .await?;

    Ok(Json(UserDirectory { users, roles }))
}

/// Rejects admin actions aimed at the caller's own account.
fn ensure_not_self(claims: &Claims, target: i64, action: &str) -> Result<(), AppError> {
    if claims.user_id()? == target {
        return Err(AppError::BadRequest(format!(
            "You cannot {} your own account",
            action
        )));
    }
    Ok(())
}

/// Activates or deactivates a user.
/// Admin only. Prevents deactivating self.
pub async fn toggle_user_status(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    ensure_not_self(&claims, id, "deactivate")?;

    let (is_active,): (bool,) = sqlx::query_as(
        "UPDATE users SET is_active = NOT is_active WHERE id = ? RETURNING is_active",
    )
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("User not found".to_string()))?;

    let status = if is_active { "activated" } else { "deactivated" };
    tracing::info!("User {} {}", id, status);

    Ok(Json(json!({
        "message": format!("User {}", status),
        "is_active": is_active,
    })))
}

/// Deletes a user by ID.
/// Admin only. Prevents deleting self.
pub async fn delete_user(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    ensure_not_self(&claims, id, "delete")?;

    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete user: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Lists every quiz, active or not, newest first.
/// Admin only.
pub async fn list_all_qcms(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let qcms = sqlx::query_as::<_, QcmOverview>(
        r#"
        SELECT
            c.id, c.title, c.description, c.created_by, c.is_active, c.created_at,
            (SELECT COUNT(*) FROM questions q WHERE q.qcm_id = c.id) AS question_count
        FROM qcms c
        ORDER BY c.created_at DESC, c.id DESC
        "#,
    )
    .fetch_all(&pool)
    .await?;

    Ok(Json(qcms))
}

/// Creates a quiz with all its questions and answers.
/// Admin only. Everything is inserted in a single transaction.
pub async fn create_qcm(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateQcmRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let author = claims.user_id()?;

    let title = clean_required(&payload.title)
        .ok_or_else(|| AppError::BadRequest("Quiz title is required.".to_string()))?;

    let mut questions = Vec::with_capacity(payload.questions.len());
    for question in &payload.questions {
        let text = clean_required(&question.text)
            .ok_or_else(|| AppError::BadRequest("Question text is required.".to_string()))?;
        let answers = question
            .answers
            .iter()
            .map(|answer| {
                clean_required(&answer.text)
                    .map(|text| (text, answer.is_correct))
                    .ok_or_else(|| AppError::BadRequest("Answer text is required.".to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        questions.push((text, answers));
    }

    let mut tx = pool.begin().await?;

    let (qcm_id,): (i64,) = sqlx::query_as(
        "INSERT INTO qcms (title, description, created_by) VALUES (?, ?, ?) RETURNING id",
    )
    .bind(&title)
    .bind(clean_optional(payload.description.as_deref()))
    .bind(author)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create quiz: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    for (position, (text, answers)) in questions.iter().enumerate() {
        let (question_id,): (i64,) = sqlx::query_as(
            "INSERT INTO questions (qcm_id, question_text, position) VALUES (?, ?, ?) RETURNING id",
        )
        .bind(qcm_id)
        .bind(text)
        .bind(position as i64)
        .fetch_one(&mut *tx)
        .await?;

        for (answer_position, (answer_text, is_correct)) in answers.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO answers (question_id, answer_text, is_correct, position)
                VALUES (?, ?, ?, ?)
                "#,
            )
            .bind(question_id)
            .bind(answer_text)
            .bind(*is_correct)
            .bind(answer_position as i64)
            .execute(&mut *tx)
            .await?;
        }
    }

    tx.commit().await?;

    tracing::info!(
        "Quiz {} created by user {} with {} questions",
        qcm_id,
        author,
        questions.len()
    );

    Ok((StatusCode::CREATED, Json(json!({ "id": qcm_id }))))
}

/// Shows or hides a quiz.
/// Admin only.
pub async fn toggle_qcm_status(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    fetch_qcm(&pool, id).await?;

    let (is_active,): (bool,) = sqlx::query_as(
        "UPDATE qcms SET is_active = NOT is_active WHERE id = ? RETURNING is_active",
    )
    .bind(id)
    .fetch_one(&pool)
    .await?;

    let status = if is_active { "activated" } else { "deactivated" };
    tracing::info!("Quiz {} {}", id, status);

    Ok(Json(json!({
        "message": format!("Quiz {}", status),
        "is_active": is_active,
    })))
}

/// Deletes a quiz together with its questions, answers and attempts.
/// Admin only.
pub async fn delete_qcm(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM qcms WHERE id = ?")
        .bind(id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete quiz: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Quiz not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
