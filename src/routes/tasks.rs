use crate::{
    auth::CurrentUser,
    error::AppError,
    models::list::List,
    models::task::{NewTask, Task, TaskChanges},
    models::Priority,
    response,
    validation::{
        parse_is_completed, validate_description, validate_due_date, validate_is_completed,
        validate_optional_title, validate_priority_id, validate_title,
    },
};
use actix_web::{delete, get, post, put, web, Responder};
use serde::{Deserialize, Deserializer};
use sqlx::PgPool;

#[derive(Debug, Deserialize)]
pub struct CreateTaskPayload {
    pub list_id: Option<i32>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority_id: Option<i32>,
    pub due_date: Option<String>,
}

/// Distinguishes a field that is present-but-null from one that is absent,
/// so an explicit null can clear a column while absence leaves it untouched.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize)]
pub struct UpdateTaskPayload {
    pub list_id: Option<i32>,
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub priority_id: Option<i32>,
    #[serde(default, deserialize_with = "double_option")]
    pub due_date: Option<Option<String>>,
    pub is_completed: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct StatusPayload {
    pub is_completed: Option<serde_json::Value>,
}

/// Creates a task in one of the caller's lists.
///
/// An omitted `priority_id` resolves to the least severe priority; an
/// omitted `due_date` stays null.
#[post("")]
pub async fn create_task(
    pool: web::Data<PgPool>,
    user: CurrentUser,
    body: web::Json<CreateTaskPayload>,
) -> Result<impl Responder, AppError> {
    let list_id = body
        .list_id
        .ok_or_else(|| AppError::BadRequest("list_id is required".into()))?;

    let title = validate_title(body.title.as_deref())?;
    let description = validate_description(body.description.as_deref())?;
    validate_priority_id(&pool, body.priority_id).await?;
    let due_date = validate_due_date(body.due_date.as_deref())?;

    List::find_by_id(&pool, list_id, user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("List not found".into()))?;

    let priority_id = match body.priority_id {
        Some(id) => id,
        None => {
            Priority::lowest(&pool)
                .await?
                .ok_or_else(|| {
                    AppError::InternalServerError("Priority levels are not initialized".into())
                })?
                .priority_id
        }
    };

    let task_id = Task::create(
        &pool,
        user.user_id,
        &NewTask {
            list_id,
            title,
            description,
            priority_id,
            due_date,
        },
    )
    .await?;

    let task = Task::find_by_id(&pool, task_id, user.user_id)
        .await?
        .ok_or_else(|| AppError::InternalServerError("Failed to load created task".into()))?;

    Ok(response::created(task))
}

/// All tasks across the caller's lists, newest first.
#[get("")]
pub async fn get_tasks(
    pool: web::Data<PgPool>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let tasks = Task::find_for_user(&pool, user.user_id).await?;

    Ok(response::ok(tasks))
}

/// Fetches one task through the ownership chain. Absent and not-owned answer
/// the same 404.
#[get("/{task_id}")]
pub async fn get_task(
    pool: web::Data<PgPool>,
    user: CurrentUser,
    task_id: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let task = Task::find_by_id(&pool, task_id.into_inner(), user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".into()))?;

    Ok(response::ok(task))
}

/// Partially updates a task. Only fields present in the request change;
/// the parent list's `updated_at` advances in the same transaction.
#[put("/{task_id}")]
pub async fn update_task(
    pool: web::Data<PgPool>,
    user: CurrentUser,
    task_id: web::Path<i32>,
    body: web::Json<UpdateTaskPayload>,
) -> Result<impl Responder, AppError> {
    let task_id = task_id.into_inner();

    let title = validate_optional_title(body.title.as_deref())?;
    let description = match &body.description {
        Some(value) => Some(validate_description(value.as_deref())?),
        None => None,
    };
    validate_priority_id(&pool, body.priority_id).await?;
    let due_date = match &body.due_date {
        Some(value) => Some(validate_due_date(value.as_deref())?),
        None => None,
    };
    let is_completed = match &body.is_completed {
        Some(value) => {
            validate_is_completed(value)?;
            Some(parse_is_completed(value))
        }
        None => None,
    };

    let changes = TaskChanges {
        list_id: body.list_id,
        title,
        description,
        priority_id: body.priority_id,
        due_date,
        is_completed,
    };

    if changes.is_empty() {
        return Err(AppError::BadRequest(
            "At least one field to update must be provided".into(),
        ));
    }

    let existing = Task::find_by_id(&pool, task_id, user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".into()))?;

    // Moving a task requires the target list to be the caller's too.
    if let Some(target_list) = body.list_id {
        List::find_by_id(&pool, target_list, user.user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("List not found".into()))?;
    }

    if !Task::update(&pool, task_id, user.user_id, &changes, existing.list_id).await? {
        return Err(AppError::NotFound("Task not found".into()));
    }

    let task = Task::find_by_id(&pool, task_id, user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".into()))?;

    Ok(response::ok(task))
}

/// Sets the completion flag. Accepts the boolean coercion set
/// {true,false,"true","false",1,0,"1","0"}.
#[put("/{task_id}/status")]
pub async fn update_task_status(
    pool: web::Data<PgPool>,
    user: CurrentUser,
    task_id: web::Path<i32>,
    body: web::Json<StatusPayload>,
) -> Result<impl Responder, AppError> {
    let task_id = task_id.into_inner();

    let value = body
        .is_completed
        .as_ref()
        .ok_or_else(|| AppError::BadRequest("is_completed field is required".into()))?;
    validate_is_completed(value)?;
    let is_completed = parse_is_completed(value);

    if !Task::set_completed(&pool, task_id, user.user_id, is_completed).await? {
        return Err(AppError::NotFound("Task not found".into()));
    }

    let task = Task::find_by_id(&pool, task_id, user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".into()))?;

    Ok(response::ok(task))
}

/// Deletes a task.
#[delete("/{task_id}")]
pub async fn delete_task(
    pool: web::Data<PgPool>,
    user: CurrentUser,
    task_id: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    if !Task::delete(&pool, task_id.into_inner(), user.user_id).await? {
        return Err(AppError::NotFound("Task not found".into()));
    }

    Ok(response::ok("Task deleted successfully"))
}

/// Incomplete tasks across all of the caller's lists.
#[get("/status/pending")]
pub async fn get_pending_tasks(
    pool: web::Data<PgPool>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let tasks = Task::find_pending(&pool, user.user_id).await?;

    Ok(response::ok(tasks))
}

/// Incomplete tasks due today.
#[get("/due/today")]
pub async fn get_tasks_due_today(
    pool: web::Data<PgPool>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let tasks = Task::find_due_today(&pool, user.user_id).await?;

    Ok(response::ok(tasks))
}

/// Incomplete tasks whose due date has passed.
#[get("/due/overdue")]
pub async fn get_overdue_tasks(
    pool: web::Data<PgPool>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let tasks = Task::find_overdue(&pool, user.user_id).await?;

    Ok(response::ok(tasks))
}
