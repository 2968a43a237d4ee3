use crate::{
    auth::{hash_password, AdminUser, CurrentUser, RegisterRequest},
    config::Config,
    error::AppError,
    models::user::{NewUser, User, UserChanges},
    models::Role,
    response,
};
use actix_web::{delete, get, post, put, web, Responder};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

/// Partial user update, shared by the admin endpoint and the self-service
/// profile endpoint. Absent fields are left untouched.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserPayload {
    #[validate(length(min = 1, max = 50))]
    pub first_name: Option<String>,
    #[validate(length(max = 50))]
    pub last_name: Option<String>,
    #[validate(
        length(min = 3, max = 50),
        regex(
            path = "crate::auth::USERNAME_REGEX",
            message = "Username must be alphanumeric, underscores, or hyphens"
        )
    )]
    pub username: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 8, message = "Password must be at least 8 characters long"))]
    pub password: Option<String>,
}

/// Validates a payload against the target user, checks username/email
/// uniqueness, applies the partial update and returns the canonical row.
async fn apply_user_update(
    pool: &PgPool,
    config: &Config,
    target_user_id: i32,
    payload: &UpdateUserPayload,
) -> Result<User, AppError> {
    payload.validate()?;

    let existing = User::find_by_id(pool, target_user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    let username = payload.username.as_ref().map(|u| u.to_lowercase());
    if let Some(username) = &username {
        if *username != existing.username
            && User::find_by_username(pool, username).await?.is_some()
        {
            return Err(AppError::Conflict("Username is already taken".into()));
        }
    }

    let email = payload.email.as_ref().map(|e| e.to_lowercase());
    if let Some(email) = &email {
        if *email != existing.email && User::find_by_email(pool, email).await?.is_some() {
            return Err(AppError::Conflict("Email is already registered".into()));
        }
    }

    let password = match &payload.password {
        Some(password) => Some(hash_password(password, config.bcrypt_cost)?),
        None => None,
    };

    let changes = UserChanges {
        first_name: payload.first_name.clone(),
        last_name: payload.last_name.clone(),
        username,
        email,
        password,
    };

    if changes.is_empty() {
        return Err(AppError::BadRequest(
            "At least one field to update must be provided".into(),
        ));
    }

    if !User::update(pool, target_user_id, &changes).await? {
        return Err(AppError::NotFound("User not found".into()));
    }

    User::find_by_id(pool, target_user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}

/// All user accounts. Admin only; password digests are never serialized.
#[get("")]
pub async fn get_users(
    pool: web::Data<PgPool>,
    _admin: AdminUser,
) -> Result<impl Responder, AppError> {
    let users = User::find_all(&pool).await?;

    Ok(response::ok(users))
}

#[get("/{id}")]
pub async fn get_user(
    pool: web::Data<PgPool>,
    _admin: AdminUser,
    user_id: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let user = User::find_by_id(&pool, user_id.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    Ok(response::ok(user))
}

/// Creates a user account without issuing a session. Admin only.
#[post("")]
pub async fn create_user(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    _admin: AdminUser,
    body: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    body.validate()?;

    let username = body.username.to_lowercase();
    let email = body.email.to_lowercase();

    if User::find_by_username(&pool, &username).await?.is_some() {
        return Err(AppError::Conflict("Username is already taken".into()));
    }
    if User::find_by_email(&pool, &email).await?.is_some() {
        return Err(AppError::Conflict("Email is already registered".into()));
    }

    let password = hash_password(&body.password, config.bcrypt_cost)?;
    let user_id = User::create(
        &pool,
        &NewUser {
            first_name: body.first_name.clone(),
            last_name: body.last_name.clone(),
            username,
            email,
            password,
            role: Role::User,
        },
    )
    .await?;

    let user = User::find_by_id(&pool, user_id)
        .await?
        .ok_or_else(|| AppError::InternalServerError("Failed to load created user".into()))?;

    Ok(response::created(user))
}

/// Updates any user account. Admin only.
#[put("/{id}")]
pub async fn update_user(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    _admin: AdminUser,
    user_id: web::Path<i32>,
    body: web::Json<UpdateUserPayload>,
) -> Result<impl Responder, AppError> {
    let user = apply_user_update(&pool, &config, user_id.into_inner(), &body).await?;

    Ok(response::ok(user))
}

/// Deletes a user account; their lists and tasks cascade away. Admin only.
#[delete("/{id}")]
pub async fn delete_user(
    pool: web::Data<PgPool>,
    _admin: AdminUser,
    user_id: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    if !User::delete(&pool, user_id.into_inner()).await? {
        return Err(AppError::NotFound("User not found".into()));
    }

    Ok(response::ok(json!({ "message": "User deleted successfully" })))
}

/// Lets an authenticated user update their own profile.
#[put("/update-profile")]
pub async fn update_profile(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    user: CurrentUser,
    body: web::Json<UpdateUserPayload>,
) -> Result<impl Responder, AppError> {
    let user = apply_user_update(&pool, &config, user.user_id, &body).await?;

    Ok(response::ok(user))
}
