pub mod auth;
pub mod health;
pub mod lists;
pub mod priorities;
pub mod tasks;
pub mod users;

use crate::auth::AuthMiddleware;
use crate::config::Config;
use crate::error::AppError;
use actix_web::error::ResponseError;
use actix_web::{web, HttpResponse};

/// Wires the `/api` surface. Everything except register/login sits behind
/// `AuthMiddleware`; admin-only handlers additionally take the `AdminUser`
/// extractor, which can only ever run after the identity is attached.
pub fn config(cfg: &mut web::ServiceConfig, config: &Config) {
    cfg.service(
        web::scope("/auth")
            .service(auth::register)
            .service(auth::login)
            .service(
                web::scope("")
                    .wrap(AuthMiddleware::new(config))
                    .service(auth::current_user)
                    .service(auth::logout),
            ),
    )
    .service(
        web::scope("/lists")
            .wrap(AuthMiddleware::new(config))
            .service(lists::create_list)
            .service(lists::get_lists)
            .service(lists::delete_all_lists)
            .service(lists::clear_all_lists)
            .service(lists::get_list)
            .service(lists::update_list)
            .service(lists::delete_list)
            .service(lists::clear_list),
    )
    .service(
        web::scope("/tasks")
            .wrap(AuthMiddleware::new(config))
            .service(tasks::create_task)
            .service(tasks::get_tasks)
            .service(tasks::get_pending_tasks)
            .service(tasks::get_tasks_due_today)
            .service(tasks::get_overdue_tasks)
            .service(tasks::get_task)
            .service(tasks::update_task)
            .service(tasks::update_task_status)
            .service(tasks::delete_task),
    )
    .service(
        web::scope("/priorities")
            .wrap(AuthMiddleware::new(config))
            .service(priorities::get_priorities)
            .service(priorities::get_priority_by_id)
            .service(priorities::get_priority_by_level)
            .service(priorities::create_priority)
            .service(priorities::update_priority)
            .service(priorities::delete_priority),
    )
    .service(
        web::scope("/users")
            .wrap(AuthMiddleware::new(config))
            .service(users::update_profile)
            .service(users::get_users)
            .service(users::create_user)
            .service(users::get_user)
            .service(users::update_user)
            .service(users::delete_user),
    );
}

/// Rewrites body deserialization failures into the 400 envelope.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        AppError::BadRequest(format!("Invalid request body: {}", err)).into()
    })
}

/// Rewrites path parameter parse failures into the 400 envelope.
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|_err, _req| AppError::BadRequest("Invalid path parameter".into()).into())
}

/// Envelope 404 for routes nothing matched.
pub async fn not_found() -> HttpResponse {
    AppError::NotFound("Not Found - The requested resource does not exist".into()).error_response()
}
