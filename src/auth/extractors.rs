use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::error::AppError;
use crate::models::Role;

/// Identity of the authenticated caller, attached to request extensions by
/// `AuthMiddleware` and handed to handlers as a typed argument.
///
/// Repository calls take the `user_id` carried here as a required argument;
/// there is no way to issue a list or task query without one.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser {
    pub user_id: i32,
    pub role: Role,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl FromRequest for CurrentUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<CurrentUser>().copied() {
            Some(user) => ready(Ok(user)),
            // Only reachable if a route forgot its AuthMiddleware wrap;
            // answer as if unauthenticated.
            None => ready(Err(AppError::Unauthorized("Unauthenticated".to_string()).into())),
        }
    }
}

/// Admin gate: like [`CurrentUser`] but additionally requires the admin
/// role, answering 403 for any other identity.
///
/// Because it reads the identity `AuthMiddleware` attached, the role check
/// can only ever run after authentication.
#[derive(Debug, Clone, Copy)]
pub struct AdminUser(pub CurrentUser);

impl FromRequest for AdminUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<CurrentUser>().copied() {
            Some(user) if user.role == Role::Admin => ready(Ok(AdminUser(user))),
            Some(_) => ready(Err(AppError::Forbidden("Forbidden".to_string()).into())),
            None => ready(Err(AppError::Unauthorized("Unauthenticated".to_string()).into())),
        }
    }
}
