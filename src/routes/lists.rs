use crate::{
    auth::CurrentUser,
    error::AppError,
    models::list::{List, ListChanges},
    response,
    validation::{validate_description, validate_optional_title, validate_title},
};
use actix_web::{delete, get, post, put, web, Responder};
use serde::Deserialize;
use sqlx::PgPool;

#[derive(Debug, Deserialize)]
pub struct ListPayload {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub include_tasks: Option<String>,
}

impl ListQuery {
    fn include_tasks(&self) -> bool {
        self.include_tasks.as_deref() == Some("true")
    }
}

/// Creates a list for the authenticated user and answers with the canonical
/// stored row.
#[post("")]
pub async fn create_list(
    pool: web::Data<PgPool>,
    user: CurrentUser,
    body: web::Json<ListPayload>,
) -> Result<impl Responder, AppError> {
    let title = validate_title(body.title.as_deref())?;
    let description = validate_description(body.description.as_deref())?;

    let list_id = List::create(&pool, user.user_id, &title, description.as_deref()).await?;

    let list = List::find_by_id(&pool, list_id, user.user_id)
        .await?
        .ok_or_else(|| AppError::InternalServerError("Failed to load created list".into()))?;

    Ok(response::created(list))
}

/// All of the caller's lists with task counts, newest first. With
/// `?include_tasks=true` each list embeds its tasks.
#[get("")]
pub async fn get_lists(
    pool: web::Data<PgPool>,
    user: CurrentUser,
    query: web::Query<ListQuery>,
) -> Result<impl Responder, AppError> {
    if query.include_tasks() {
        let lists = List::find_for_user_with_tasks(&pool, user.user_id).await?;
        Ok(response::ok(lists))
    } else {
        let lists = List::find_for_user(&pool, user.user_id).await?;
        Ok(response::ok(lists))
    }
}

/// Fetches one list. Absent and not-owned answer the same 404.
#[get("/{list_id}")]
pub async fn get_list(
    pool: web::Data<PgPool>,
    user: CurrentUser,
    list_id: web::Path<i32>,
    query: web::Query<ListQuery>,
) -> Result<impl Responder, AppError> {
    let list_id = list_id.into_inner();

    if query.include_tasks() {
        let list = List::find_by_id_with_tasks(&pool, list_id, user.user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("List not found!".into()))?;
        Ok(response::ok(list))
    } else {
        let list = List::find_by_id(&pool, list_id, user.user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("List not found!".into()))?;
        Ok(response::ok(list))
    }
}

/// Partially updates a list; absent fields stay untouched.
#[put("/{list_id}")]
pub async fn update_list(
    pool: web::Data<PgPool>,
    user: CurrentUser,
    list_id: web::Path<i32>,
    body: web::Json<ListPayload>,
) -> Result<impl Responder, AppError> {
    let list_id = list_id.into_inner();

    let changes = ListChanges {
        title: validate_optional_title(body.title.as_deref())?,
        description: validate_description(body.description.as_deref())?,
    };

    if changes.is_empty() {
        return Err(AppError::BadRequest(
            "At least one field (title or description) is required for update".into(),
        ));
    }

    if !List::update(&pool, list_id, user.user_id, &changes).await? {
        return Err(AppError::NotFound("List not found!".into()));
    }

    let list = List::find_by_id(&pool, list_id, user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("List not found!".into()))?;

    Ok(response::ok(list))
}

/// Deletes a list together with its tasks.
#[delete("/{list_id}")]
pub async fn delete_list(
    pool: web::Data<PgPool>,
    user: CurrentUser,
    list_id: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    if !List::delete(&pool, list_id.into_inner(), user.user_id).await? {
        return Err(AppError::NotFound("List not found!".into()));
    }

    Ok(response::ok(serde_json::Value::Null))
}

/// Deletes all of the caller's lists.
#[delete("")]
pub async fn delete_all_lists(
    pool: web::Data<PgPool>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    List::delete_all(&pool, user.user_id).await?;

    Ok(response::ok(serde_json::Value::Null))
}

/// Removes all tasks from one list but keeps the list itself. Clearing an
/// already-empty list succeeds.
#[delete("/{list_id}/clear")]
pub async fn clear_list(
    pool: web::Data<PgPool>,
    user: CurrentUser,
    list_id: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let list_id = list_id.into_inner();

    List::find_by_id(&pool, list_id, user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("List not found!".into()))?;

    List::clear(&pool, list_id, user.user_id).await?;

    Ok(response::ok(serde_json::Value::Null))
}

/// Removes all tasks from all of the caller's lists.
#[delete("/clear")]
pub async fn clear_all_lists(
    pool: web::Data<PgPool>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    List::clear_all(&pool, user.user_id).await?;

    Ok(response::ok(serde_json::Value::Null))
}
