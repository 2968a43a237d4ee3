use crate::error::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

/// Role of a user account. A closed set, not a hierarchy.
/// Corresponds to the `user_role` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

/// A user account as stored in the database.
///
/// The password digest is carried for verification but never serialized, so
/// no response payload can contain it.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub user_id: i32,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Column values for inserting a user. `username` and `email` are expected
/// to be lowercased by the caller, `password` already hashed.
#[derive(Debug)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// Partial set of user columns to change. Absent fields are left untouched.
#[derive(Debug, Default)]
pub struct UserChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    /// Already hashed.
    pub password: Option<String>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.username.is_none()
            && self.email.is_none()
            && self.password.is_none()
    }
}

const USER_COLUMNS: &str =
    "user_id, first_name, last_name, username, email, password, role, created_at, updated_at";

impl User {
    pub async fn create(pool: &PgPool, new_user: &NewUser) -> Result<i32, AppError> {
        let user_id: i32 = sqlx::query_scalar(
            "INSERT INTO users (first_name, last_name, username, email, password, role)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING user_id",
        )
        .bind(&new_user.first_name)
        .bind(&new_user.last_name)
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.password)
        .bind(new_user.role)
        .fetch_one(pool)
        .await?;

        Ok(user_id)
    }

    pub async fn find_all(pool: &PgPool) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users ORDER BY user_id",
            USER_COLUMNS
        ))
        .fetch_all(pool)
        .await?;

        Ok(users)
    }

    pub async fn find_by_id(pool: &PgPool, user_id: i32) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE user_id = $1",
            USER_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE username = $1",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Applies a partial update. Only columns present in `changes` appear in
    /// the statement. Returns false when no row matched.
    pub async fn update(
        pool: &PgPool,
        user_id: i32,
        changes: &UserChanges,
    ) -> Result<bool, AppError> {
        if changes.is_empty() {
            return Ok(false);
        }

        let mut assignments: Vec<String> = Vec::new();
        let mut param_count = 1;

        if changes.first_name.is_some() {
            assignments.push(format!("first_name = ${}", param_count));
            param_count += 1;
        }
        if changes.last_name.is_some() {
            assignments.push(format!("last_name = ${}", param_count));
            param_count += 1;
        }
        if changes.username.is_some() {
            assignments.push(format!("username = ${}", param_count));
            param_count += 1;
        }
        if changes.email.is_some() {
            assignments.push(format!("email = ${}", param_count));
            param_count += 1;
        }
        if changes.password.is_some() {
            assignments.push(format!("password = ${}", param_count));
            param_count += 1;
        }
        assignments.push("updated_at = now()".to_string());

        let sql = format!(
            "UPDATE users SET {} WHERE user_id = ${}",
            assignments.join(", "),
            param_count
        );

        let mut query = sqlx::query(&sql);
        if let Some(first_name) = &changes.first_name {
            query = query.bind(first_name);
        }
        if let Some(last_name) = &changes.last_name {
            query = query.bind(last_name);
        }
        if let Some(username) = &changes.username {
            query = query.bind(username);
        }
        if let Some(email) = &changes.email {
            query = query.bind(email);
        }
        if let Some(password) = &changes.password {
            query = query.bind(password);
        }

        let result = query.bind(user_id).execute(pool).await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes a user. The schema cascades to the user's lists and,
    /// transitively, their tasks.
    pub async fn delete(pool: &PgPool, user_id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM users WHERE user_id = $1")
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
