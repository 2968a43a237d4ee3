use crate::{
    auth::{generate_token, hash_password, verify_password, CurrentUser, LoginRequest, RegisterRequest},
    config::{Config, TOKEN_COOKIE},
    error::AppError,
    models::user::{NewUser, User},
    models::Role,
    response,
};
use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use actix_web::{get, post, web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

/// Builds the HTTP-only session cookie carrying a freshly issued token.
fn session_cookie(token: String, ttl_hours: i64) -> Cookie<'static> {
    Cookie::build(TOKEN_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::hours(ttl_hours))
        .finish()
}

/// Builds the removal cookie that clears the session on logout.
fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build(TOKEN_COOKIE, "")
        .path("/")
        .http_only(true)
        .finish();
    cookie.make_removal();
    cookie
}

/// Register a new user
///
/// Creates the account, issues a session token and sets the session cookie,
/// so registration doubles as login. Duplicate username or email answers 409.
#[post("/register")]
pub async fn register(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;

    let username = register_data.username.to_lowercase();
    let email = register_data.email.to_lowercase();

    if User::find_by_username(&pool, &username).await?.is_some() {
        return Err(AppError::Conflict("Username is already taken".into()));
    }
    if User::find_by_email(&pool, &email).await?.is_some() {
        return Err(AppError::Conflict("Email is already registered".into()));
    }

    let password = hash_password(&register_data.password, config.bcrypt_cost)?;
    let user_id = User::create(
        &pool,
        &NewUser {
            first_name: register_data.first_name.clone(),
            last_name: register_data.last_name.clone(),
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

    let token = generate_token(user.user_id, user.role, &config.jwt_secret, config.jwt_ttl_hours)?;

    Ok(HttpResponse::Created()
        .cookie(session_cookie(token, config.jwt_ttl_hours))
        .json(json!({
            "success": true,
            "data": {
                "message": "Registration successful",
                "user": user
            }
        })))
}

/// Login user
///
/// An unknown email and a wrong password answer with the same status and
/// message, so login cannot be used to probe which emails exist.
#[post("/login")]
pub async fn login(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    login_data.validate()?;

    let user = User::find_by_email(&pool, &login_data.email.to_lowercase())
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid credentials".into()))?;

    if !verify_password(&login_data.password, &user.password)? {
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    }

    let token = generate_token(user.user_id, user.role, &config.jwt_secret, config.jwt_ttl_hours)?;

    Ok(HttpResponse::Ok()
        .cookie(session_cookie(token, config.jwt_ttl_hours))
        .json(json!({
            "success": true,
            "data": {
                "message": "Login successful",
                "user": user
            }
        })))
}

/// Get the authenticated user's own record.
#[get("/current-user")]
pub async fn current_user(
    pool: web::Data<PgPool>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let user = User::find_by_id(&pool, user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    Ok(response::ok(user))
}

/// Logout user
#[post("/logout")]
pub async fn logout(_user: CurrentUser) -> Result<impl Responder, AppError> {
    Ok(HttpResponse::Ok().cookie(removal_cookie()).json(json!({
        "success": true,
        "data": { "message": "Logout successful" }
    })))
}
