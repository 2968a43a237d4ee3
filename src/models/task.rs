use crate::error::AppError;
use crate::models::list::List;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

/// A unit of work belonging to exactly one list.
///
/// Tasks carry no owner column; ownership resolves through the parent list,
/// and every query here embeds that chain
/// (`list_id IN (SELECT list_id FROM lists WHERE user_id = ...)`) in its
/// predicate.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub task_id: i32,
    pub list_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub priority_id: Option<i32>,
    pub due_date: Option<NaiveDate>,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Column values for inserting a task. The caller has already validated the
/// fields and resolved the default priority.
#[derive(Debug)]
pub struct NewTask {
    pub list_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub priority_id: i32,
    pub due_date: Option<NaiveDate>,
}

/// Partial set of task columns to change. The outer `Option` is presence in
/// the request; for `description` and `due_date` the inner `Option` lets an
/// explicit null clear the column.
#[derive(Debug, Default)]
pub struct TaskChanges {
    pub list_id: Option<i32>,
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub priority_id: Option<i32>,
    pub due_date: Option<Option<NaiveDate>>,
    pub is_completed: Option<bool>,
}

impl TaskChanges {
    pub fn is_empty(&self) -> bool {
        self.list_id.is_none()
            && self.title.is_none()
            && self.description.is_none()
            && self.priority_id.is_none()
            && self.due_date.is_none()
            && self.is_completed.is_none()
    }
}

const TASK_COLUMNS: &str =
    "task_id, list_id, title, description, priority_id, due_date, is_completed, created_at, updated_at";

const OWNED_LISTS: &str = "SELECT list_id FROM lists WHERE user_id =";

impl Task {
    /// Inserts a task and advances the parent list's `updated_at` in the
    /// same transaction. The caller has already verified the list belongs to
    /// `owner_id`.
    pub async fn create(pool: &PgPool, owner_id: i32, new_task: &NewTask) -> Result<i32, AppError> {
        let mut tx = pool.begin().await?;

        let task_id: i32 = sqlx::query_scalar(
            "INSERT INTO tasks (list_id, title, description, priority_id, due_date)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING task_id",
        )
        .bind(new_task.list_id)
        .bind(&new_task.title)
        .bind(&new_task.description)
        .bind(new_task.priority_id)
        .bind(new_task.due_date)
        .fetch_one(&mut *tx)
        .await?;

        if !List::touch(&mut tx, new_task.list_id, owner_id).await? {
            return Err(AppError::InternalServerError(
                "Failed to update list timestamp".into(),
            ));
        }

        tx.commit().await?;
        Ok(task_id)
    }

    /// All tasks across all of a user's lists, newest-created first.
    pub async fn find_for_user(pool: &PgPool, owner_id: i32) -> Result<Vec<Task>, AppError> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT {} FROM tasks WHERE list_id IN ({} $1) ORDER BY created_at DESC",
            TASK_COLUMNS, OWNED_LISTS
        ))
        .bind(owner_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    pub async fn find_by_id(
        pool: &PgPool,
        task_id: i32,
        owner_id: i32,
    ) -> Result<Option<Task>, AppError> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {} FROM tasks WHERE task_id = $1 AND list_id IN ({} $2)",
            TASK_COLUMNS, OWNED_LISTS
        ))
        .bind(task_id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    pub async fn find_by_list(
        pool: &PgPool,
        list_id: i32,
        owner_id: i32,
    ) -> Result<Vec<Task>, AppError> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT {} FROM tasks WHERE list_id = $1 AND list_id IN ({} $2)
             ORDER BY created_at DESC",
            TASK_COLUMNS, OWNED_LISTS
        ))
        .bind(list_id)
        .bind(owner_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Applies a partial update scoped by the ownership chain and advances
    /// the affected list timestamps, all in one transaction. When the task
    /// moves between lists both the old and the new list are touched.
    ///
    /// Returns false when no row matched the scoped predicate.
    pub async fn update(
        pool: &PgPool,
        task_id: i32,
        owner_id: i32,
        changes: &TaskChanges,
        previous_list_id: i32,
    ) -> Result<bool, AppError> {
        if changes.is_empty() {
            return Ok(false);
        }

        let mut assignments: Vec<String> = Vec::new();
        let mut param_count = 1;

        if changes.list_id.is_some() {
            assignments.push(format!("list_id = ${}", param_count));
            param_count += 1;
        }
        if changes.title.is_some() {
            assignments.push(format!("title = ${}", param_count));
            param_count += 1;
        }
        if changes.description.is_some() {
            assignments.push(format!("description = ${}", param_count));
            param_count += 1;
        }
        if changes.priority_id.is_some() {
            assignments.push(format!("priority_id = ${}", param_count));
            param_count += 1;
        }
        if changes.due_date.is_some() {
            assignments.push(format!("due_date = ${}", param_count));
            param_count += 1;
        }
        if changes.is_completed.is_some() {
            assignments.push(format!("is_completed = ${}", param_count));
            param_count += 1;
        }
        assignments.push("updated_at = now()".to_string());

        let sql = format!(
            "UPDATE tasks SET {} WHERE task_id = ${} AND list_id IN ({} ${}) RETURNING list_id",
            assignments.join(", "),
            param_count,
            OWNED_LISTS,
            param_count + 1
        );

        let mut tx = pool.begin().await?;

        let mut query = sqlx::query_scalar::<_, i32>(&sql);
        if let Some(list_id) = changes.list_id {
            query = query.bind(list_id);
        }
        if let Some(title) = &changes.title {
            query = query.bind(title);
        }
        if let Some(description) = &changes.description {
            query = query.bind(description.as_deref());
        }
        if let Some(priority_id) = changes.priority_id {
            query = query.bind(priority_id);
        }
        if let Some(due_date) = &changes.due_date {
            query = query.bind(*due_date);
        }
        if let Some(is_completed) = changes.is_completed {
            query = query.bind(is_completed);
        }

        let new_list_id = query
            .bind(task_id)
            .bind(owner_id)
            .fetch_optional(&mut *tx)
            .await?;

        let new_list_id = match new_list_id {
            Some(id) => id,
            None => return Ok(false),
        };

        if !List::touch(&mut tx, new_list_id, owner_id).await? {
            return Err(AppError::InternalServerError(
                "Failed to update list timestamp".into(),
            ));
        }
        if new_list_id != previous_list_id && !List::touch(&mut tx, previous_list_id, owner_id).await? {
            return Err(AppError::InternalServerError(
                "Failed to update list timestamp".into(),
            ));
        }

        tx.commit().await?;
        Ok(true)
    }

    /// Sets the completion flag and touches the parent list, in one
    /// transaction. Returns false when no row matched.
    pub async fn set_completed(
        pool: &PgPool,
        task_id: i32,
        owner_id: i32,
        is_completed: bool,
    ) -> Result<bool, AppError> {
        let mut tx = pool.begin().await?;

        let list_id: Option<i32> = sqlx::query_scalar(&format!(
            "UPDATE tasks SET is_completed = $1, updated_at = now()
             WHERE task_id = $2 AND list_id IN ({} $3)
             RETURNING list_id",
            OWNED_LISTS
        ))
        .bind(is_completed)
        .bind(task_id)
        .bind(owner_id)
        .fetch_optional(&mut *tx)
        .await?;

        let list_id = match list_id {
            Some(id) => id,
            None => return Ok(false),
        };

        if !List::touch(&mut tx, list_id, owner_id).await? {
            return Err(AppError::InternalServerError(
                "Failed to update list timestamp".into(),
            ));
        }

        tx.commit().await?;
        Ok(true)
    }

    /// Deletes a task and touches its former list, in one transaction.
    /// Returns false when no row matched.
    pub async fn delete(pool: &PgPool, task_id: i32, owner_id: i32) -> Result<bool, AppError> {
        let mut tx = pool.begin().await?;

        let list_id: Option<i32> = sqlx::query_scalar(&format!(
            "DELETE FROM tasks WHERE task_id = $1 AND list_id IN ({} $2) RETURNING list_id",
            OWNED_LISTS
        ))
        .bind(task_id)
        .bind(owner_id)
        .fetch_optional(&mut *tx)
        .await?;

        let list_id = match list_id {
            Some(id) => id,
            None => return Ok(false),
        };

        if !List::touch(&mut tx, list_id, owner_id).await? {
            return Err(AppError::InternalServerError(
                "Failed to update list timestamp".into(),
            ));
        }

        tx.commit().await?;
        Ok(true)
    }

    /// Incomplete tasks across all of a user's lists.
    pub async fn find_pending(pool: &PgPool, owner_id: i32) -> Result<Vec<Task>, AppError> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT {} FROM tasks
             WHERE is_completed = false AND list_id IN ({} $1)
             ORDER BY created_at DESC",
            TASK_COLUMNS, OWNED_LISTS
        ))
        .bind(owner_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Incomplete tasks due today.
    pub async fn find_due_today(pool: &PgPool, owner_id: i32) -> Result<Vec<Task>, AppError> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT {} FROM tasks
             WHERE is_completed = false
               AND due_date = CURRENT_DATE
               AND list_id IN ({} $1)
             ORDER BY created_at DESC",
            TASK_COLUMNS, OWNED_LISTS
        ))
        .bind(owner_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Incomplete tasks whose due date has passed.
    pub async fn find_overdue(pool: &PgPool, owner_id: i32) -> Result<Vec<Task>, AppError> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT {} FROM tasks
             WHERE is_completed = false
               AND due_date < CURRENT_DATE
               AND list_id IN ({} $1)
             ORDER BY due_date ASC",
            TASK_COLUMNS, OWNED_LISTS
        ))
        .bind(owner_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }
}
