use crate::{
    auth::AdminUser,
    error::AppError,
    models::priority::{Priority, PriorityChanges},
    response,
};
use actix_web::{delete, get, post, put, web, Responder};
use serde::Deserialize;
use sqlx::PgPool;

const NAME_MAX_LENGTH: usize = 20;

#[derive(Debug, Deserialize)]
pub struct PriorityPayload {
    pub name: Option<String>,
    pub level: Option<i32>,
}

fn validate_name(name: Option<&str>) -> Result<Option<String>, AppError> {
    let trimmed = match name.map(str::trim) {
        Some(n) if !n.is_empty() => n,
        _ => return Ok(None),
    };

    if trimmed.chars().count() > NAME_MAX_LENGTH {
        return Err(AppError::BadRequest(format!(
            "Priority name must be less than {} characters",
            NAME_MAX_LENGTH
        )));
    }

    Ok(Some(trimmed.to_string()))
}

/// All priority levels, least severe first.
#[get("")]
pub async fn get_priorities(pool: web::Data<PgPool>) -> Result<impl Responder, AppError> {
    let priorities = Priority::find_all(&pool).await?;

    Ok(response::ok(priorities))
}

#[get("/id/{priority_id}")]
pub async fn get_priority_by_id(
    pool: web::Data<PgPool>,
    priority_id: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let priority = Priority::find_by_id(&pool, priority_id.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Priority not found".into()))?;

    Ok(response::ok(priority))
}

#[get("/level/{level}")]
pub async fn get_priority_by_level(
    pool: web::Data<PgPool>,
    level: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let priority = Priority::find_by_level(&pool, level.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Priority level not found".into()))?;

    Ok(response::ok(priority))
}

/// Adds a priority level. Admin only.
#[post("")]
pub async fn create_priority(
    pool: web::Data<PgPool>,
    _admin: AdminUser,
    body: web::Json<PriorityPayload>,
) -> Result<impl Responder, AppError> {
    let name = validate_name(body.name.as_deref())?
        .ok_or_else(|| AppError::BadRequest("Priority name is required".into()))?;
    let level = body
        .level
        .ok_or_else(|| AppError::BadRequest("Priority level is required".into()))?;

    if Priority::find_by_level(&pool, level).await?.is_some() {
        return Err(AppError::Conflict("Priority level already exists".into()));
    }

    let priority_id = Priority::create(&pool, &name, level).await?;

    let priority = Priority::find_by_id(&pool, priority_id)
        .await?
        .ok_or_else(|| AppError::InternalServerError("Failed to load created priority".into()))?;

    Ok(response::created(priority))
}

/// Renames or re-levels a priority. Admin only.
#[put("/{priority_id}")]
pub async fn update_priority(
    pool: web::Data<PgPool>,
    _admin: AdminUser,
    priority_id: web::Path<i32>,
    body: web::Json<PriorityPayload>,
) -> Result<impl Responder, AppError> {
    let priority_id = priority_id.into_inner();

    let changes = PriorityChanges {
        name: validate_name(body.name.as_deref())?,
        level: body.level,
    };

    if changes.is_empty() {
        return Err(AppError::BadRequest(
            "At least one field (name or level) is required for update".into(),
        ));
    }

    if let Some(level) = changes.level {
        if let Some(existing) = Priority::find_by_level(&pool, level).await? {
            if existing.priority_id != priority_id {
                return Err(AppError::Conflict("Priority level already exists".into()));
            }
        }
    }

    if !Priority::update(&pool, priority_id, &changes).await? {
        return Err(AppError::NotFound("Priority not found".into()));
    }

    let priority = Priority::find_by_id(&pool, priority_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Priority not found".into()))?;

    Ok(response::ok(priority))
}

/// Removes a priority level. Admin only. Dependent tasks keep existing with
/// a null priority via the foreign key, the delete never blocks.
#[delete("/{priority_id}")]
pub async fn delete_priority(
    pool: web::Data<PgPool>,
    _admin: AdminUser,
    priority_id: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    if !Priority::delete(&pool, priority_id.into_inner()).await? {
        return Err(AppError::NotFound("Priority not found".into()));
    }

    Ok(response::ok(serde_json::Value::Null))
}
