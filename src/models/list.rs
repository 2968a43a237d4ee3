use crate::error::AppError;
use crate::models::Task;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgConnection, PgPool};
use std::collections::HashMap;

/// A named container of tasks owned by exactly one user.
///
/// Every accessor takes the owner's `user_id` and carries it in the SQL
/// predicate itself, so a list is invisible and unmodifiable to any other
/// user and there is no fetch-then-check window.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct List {
    pub list_id: i32,
    #[serde(skip_serializing)]
    pub user_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A list row as returned by the aggregate listing: the list itself plus
/// total and pending task counts computed over its children.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ListSummary {
    pub list_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub total_tasks: i64,
    pub pending_tasks: i64,
}

/// A list summary with its tasks embedded (`?include_tasks=true`).
#[derive(Debug, Serialize)]
pub struct ListWithTasks {
    #[serde(flatten)]
    pub list: ListSummary,
    pub tasks: Vec<Task>,
}

/// Partial set of list columns to change. Absent fields are left untouched.
#[derive(Debug, Default)]
pub struct ListChanges {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl ListChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none()
    }
}

const SUMMARY_QUERY: &str = "
    SELECT
        l.list_id,
        l.title,
        l.description,
        l.created_at,
        l.updated_at,
        COUNT(t.task_id) AS total_tasks,
        COALESCE(SUM(CASE WHEN t.is_completed = false THEN 1 ELSE 0 END), 0) AS pending_tasks
    FROM lists l
    LEFT JOIN tasks t ON l.list_id = t.list_id
    WHERE l.user_id = $1
    GROUP BY l.list_id, l.title, l.description, l.created_at, l.updated_at
    ORDER BY l.created_at DESC";

impl List {
    pub async fn create(
        pool: &PgPool,
        owner_id: i32,
        title: &str,
        description: Option<&str>,
    ) -> Result<i32, AppError> {
        let list_id: i32 = sqlx::query_scalar(
            "INSERT INTO lists (user_id, title, description) VALUES ($1, $2, $3) RETURNING list_id",
        )
        .bind(owner_id)
        .bind(title)
        .bind(description)
        .fetch_one(pool)
        .await?;

        Ok(list_id)
    }

    /// All of a user's lists with task counts, newest-created first.
    pub async fn find_for_user(
        pool: &PgPool,
        owner_id: i32,
    ) -> Result<Vec<ListSummary>, AppError> {
        let lists = sqlx::query_as::<_, ListSummary>(SUMMARY_QUERY)
            .bind(owner_id)
            .fetch_all(pool)
            .await?;

        Ok(lists)
    }

    /// Same as [`find_for_user`](List::find_for_user) with each list's tasks
    /// embedded.
    pub async fn find_for_user_with_tasks(
        pool: &PgPool,
        owner_id: i32,
    ) -> Result<Vec<ListWithTasks>, AppError> {
        let summaries = Self::find_for_user(pool, owner_id).await?;
        let tasks = Task::find_for_user(pool, owner_id).await?;

        let mut by_list: HashMap<i32, Vec<Task>> = HashMap::new();
        for task in tasks {
            by_list.entry(task.list_id).or_default().push(task);
        }

        Ok(summaries
            .into_iter()
            .map(|list| {
                let tasks = by_list.remove(&list.list_id).unwrap_or_default();
                ListWithTasks { list, tasks }
            })
            .collect())
    }

    pub async fn find_by_id(
        pool: &PgPool,
        list_id: i32,
        owner_id: i32,
    ) -> Result<Option<List>, AppError> {
        let list = sqlx::query_as::<_, List>(
            "SELECT list_id, user_id, title, description, created_at, updated_at
             FROM lists
             WHERE list_id = $1 AND user_id = $2",
        )
        .bind(list_id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await?;

        Ok(list)
    }

    pub async fn find_by_id_with_tasks(
        pool: &PgPool,
        list_id: i32,
        owner_id: i32,
    ) -> Result<Option<ListWithTasks>, AppError> {
        let summary = sqlx::query_as::<_, ListSummary>(
            "SELECT
                l.list_id,
                l.title,
                l.description,
                l.created_at,
                l.updated_at,
                COUNT(t.task_id) AS total_tasks,
                COALESCE(SUM(CASE WHEN t.is_completed = false THEN 1 ELSE 0 END), 0) AS pending_tasks
             FROM lists l
             LEFT JOIN tasks t ON l.list_id = t.list_id
             WHERE l.list_id = $1 AND l.user_id = $2
             GROUP BY l.list_id, l.title, l.description, l.created_at, l.updated_at",
        )
        .bind(list_id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await?;

        match summary {
            Some(list) => {
                let tasks = Task::find_by_list(pool, list_id, owner_id).await?;
                Ok(Some(ListWithTasks { list, tasks }))
            }
            None => Ok(None),
        }
    }

    /// Applies a partial update, scoped to the owner. Returns false when no
    /// row matched, which covers both "absent" and "not owned".
    pub async fn update(
        pool: &PgPool,
        list_id: i32,
        owner_id: i32,
        changes: &ListChanges,
    ) -> Result<bool, AppError> {
        if changes.is_empty() {
            return Ok(false);
        }

        let mut assignments: Vec<String> = Vec::new();
        let mut param_count = 1;

        if changes.title.is_some() {
            assignments.push(format!("title = ${}", param_count));
            param_count += 1;
        }
        if changes.description.is_some() {
            assignments.push(format!("description = ${}", param_count));
            param_count += 1;
        }
        assignments.push("updated_at = now()".to_string());

        let sql = format!(
            "UPDATE lists SET {} WHERE list_id = ${} AND user_id = ${}",
            assignments.join(", "),
            param_count,
            param_count + 1
        );

        let mut query = sqlx::query(&sql);
        if let Some(title) = &changes.title {
            query = query.bind(title);
        }
        if let Some(description) = &changes.description {
            query = query.bind(description);
        }

        let result = query.bind(list_id).bind(owner_id).execute(pool).await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes a list and, via the schema cascade, its tasks.
    pub async fn delete(pool: &PgPool, list_id: i32, owner_id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM lists WHERE list_id = $1 AND user_id = $2")
            .bind(list_id)
            .bind(owner_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_all(pool: &PgPool, owner_id: i32) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM lists WHERE user_id = $1")
            .bind(owner_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Removes all tasks of a list but keeps the list row. Clearing an
    /// already-empty list succeeds with zero rows.
    pub async fn clear(pool: &PgPool, list_id: i32, owner_id: i32) -> Result<u64, AppError> {
        let result = sqlx::query(
            "DELETE FROM tasks
             WHERE list_id = $1
               AND list_id IN (SELECT list_id FROM lists WHERE user_id = $2)",
        )
        .bind(list_id)
        .bind(owner_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Removes all tasks from all of a user's lists, keeping the lists.
    pub async fn clear_all(pool: &PgPool, owner_id: i32) -> Result<u64, AppError> {
        let result = sqlx::query(
            "DELETE FROM tasks
             WHERE list_id IN (SELECT list_id FROM lists WHERE user_id = $1)",
        )
        .bind(owner_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Advances a list's `updated_at`. Runs on the caller's connection so
    /// task repositories can include it in their transaction.
    pub async fn touch(
        conn: &mut PgConnection,
        list_id: i32,
        owner_id: i32,
    ) -> Result<bool, AppError> {
        let result =
            sqlx::query("UPDATE lists SET updated_at = now() WHERE list_id = $1 AND user_id = $2")
                .bind(list_id)
                .bind(owner_id)
                .execute(conn)
                .await?;

        Ok(result.rows_affected() > 0)
    }
}
