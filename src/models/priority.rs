use crate::error::AppError;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

/// A fixed severity label referenced by tasks. Reference data, seeded at
/// startup (Low=1, Medium=2, High=3, Urgent=4), mutable only by admins.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Priority {
    pub priority_id: i32,
    pub name: String,
    pub level: i32,
}

/// Partial set of priority columns to change.
#[derive(Debug, Default)]
pub struct PriorityChanges {
    pub name: Option<String>,
    pub level: Option<i32>,
}

impl PriorityChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.level.is_none()
    }
}

impl Priority {
    pub async fn find_all(pool: &PgPool) -> Result<Vec<Priority>, AppError> {
        let priorities = sqlx::query_as::<_, Priority>(
            "SELECT priority_id, name, level FROM priorities ORDER BY level ASC",
        )
        .fetch_all(pool)
        .await?;

        Ok(priorities)
    }

    pub async fn find_by_id(
        pool: &PgPool,
        priority_id: i32,
    ) -> Result<Option<Priority>, AppError> {
        let priority = sqlx::query_as::<_, Priority>(
            "SELECT priority_id, name, level FROM priorities WHERE priority_id = $1",
        )
        .bind(priority_id)
        .fetch_optional(pool)
        .await?;

        Ok(priority)
    }

    pub async fn find_by_level(pool: &PgPool, level: i32) -> Result<Option<Priority>, AppError> {
        let priority = sqlx::query_as::<_, Priority>(
            "SELECT priority_id, name, level FROM priorities WHERE level = $1",
        )
        .bind(level)
        .fetch_optional(pool)
        .await?;

        Ok(priority)
    }

    /// The least severe priority; tasks created without an explicit priority
    /// default to it.
    pub async fn lowest(pool: &PgPool) -> Result<Option<Priority>, AppError> {
        let priority = sqlx::query_as::<_, Priority>(
            "SELECT priority_id, name, level FROM priorities ORDER BY level ASC LIMIT 1",
        )
        .fetch_optional(pool)
        .await?;

        Ok(priority)
    }

    pub async fn create(pool: &PgPool, name: &str, level: i32) -> Result<i32, AppError> {
        let priority_id: i32 = sqlx::query_scalar(
            "INSERT INTO priorities (name, level) VALUES ($1, $2) RETURNING priority_id",
        )
        .bind(name)
        .bind(level)
        .fetch_one(pool)
        .await?;

        Ok(priority_id)
    }

    pub async fn update(
        pool: &PgPool,
        priority_id: i32,
        changes: &PriorityChanges,
    ) -> Result<bool, AppError> {
        if changes.is_empty() {
            return Ok(false);
        }

        let mut assignments: Vec<String> = Vec::new();
        let mut param_count = 1;

        if changes.name.is_some() {
            assignments.push(format!("name = ${}", param_count));
            param_count += 1;
        }
        if changes.level.is_some() {
            assignments.push(format!("level = ${}", param_count));
            param_count += 1;
        }

        let sql = format!(
            "UPDATE priorities SET {} WHERE priority_id = ${}",
            assignments.join(", "),
            param_count
        );

        let mut query = sqlx::query(&sql);
        if let Some(name) = &changes.name {
            query = query.bind(name);
        }
        if let Some(level) = changes.level {
            query = query.bind(level);
        }

        let result = query.bind(priority_id).execute(pool).await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes a priority. Dependent tasks fall back to a null reference via
    /// the foreign key, the delete is never blocked.
    pub async fn delete(pool: &PgPool, priority_id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM priorities WHERE priority_id = $1")
            .bind(priority_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
