// src/seed.rs

use sqlx::SqlitePool;

use crate::{
    config::AdminSeed,
    error::AppError,
    models::user::{ADMIN_ROLE, PEOPLE_ROLE},
    utils::hash::hash_password,
};

const DEFAULT_ROLES: [(&str, &str); 2] = [
    (ADMIN_ROLE, "System administrator"),
    (PEOPLE_ROLE, "Standard user"),
];

/// Creates the default roles and, when configured, the default admin account.
/// Safe to run on every startup: existing rows are left untouched.
pub async fn seed(pool: &SqlitePool, admin: Option<&AdminSeed>) -> Result<(), AppError> {
    seed_roles(pool).await?;
    if let Some(admin) = admin {
        seed_admin_user(pool, admin).await?;
    }
    Ok(())
}

async fn seed_roles(pool: &SqlitePool) -> Result<(), AppError> {
    for (name, description) in DEFAULT_ROLES {
        let inserted = sqlx::query("INSERT OR IGNORE INTO roles (name, description) VALUES (?, ?)")
            .bind(name)
            .bind(description)
            .execute(pool)
            .await?
            .rows_affected();

        if inserted > 0 {
            tracing::info!("Created role '{}'", name);
        }
    }
    Ok(())
}

async fn seed_admin_user(pool: &SqlitePool, admin: &AdminSeed) -> Result<(), AppError> {
    let exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE email = ?")
        .bind(&admin.email)
        .fetch_optional(pool)
        .await?;

    if exists.is_some() {
        tracing::debug!("Admin account {} already exists", admin.email);
        return Ok(());
    }

    tracing::info!("Seeding admin user: {}", admin.email);
    let hashed_password = hash_password(&admin.password)?;

    sqlx::query(
        r#"
        INSERT INTO users (email, password_hash, first_name, last_name, role_id)
        SELECT ?, ?, ?, ?, id FROM roles WHERE name = ?
        "#,
    )
    .bind(&admin.email)
    .bind(hashed_password)
    .bind(&admin.first_name)
    .bind(&admin.last_name)
    .bind(ADMIN_ROLE)
    .execute(pool)
    .await?;

    tracing::info!("Admin user created successfully.");
    Ok(())
}
