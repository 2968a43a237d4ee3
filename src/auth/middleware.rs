use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::rc::Rc;

use crate::auth::extractors::CurrentUser;
use crate::auth::token::verify_token;
use crate::config::{Config, TOKEN_COOKIE};
use crate::error::AppError;

/// Authorization gate: turns the `token` cookie into a [`CurrentUser`] in the
/// request extensions.
///
/// A missing cookie and a failed verification both answer the same generic
/// 401. The middleware is constructed with the signing secret so business
/// code never reads the environment.
pub struct AuthMiddleware {
    secret: Rc<String>,
}

impl AuthMiddleware {
    pub fn new(config: &Config) -> Self {
        Self {
            secret: Rc::new(config.jwt_secret.clone()),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            secret: Rc::clone(&self.secret),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    secret: Rc<String>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let token = req.cookie(TOKEN_COOKIE).map(|c| c.value().to_string());

        match token {
            Some(token) => match verify_token(&token, &self.secret) {
                Ok(claims) => {
                    req.extensions_mut().insert(CurrentUser {
                        user_id: claims.sub,
                        role: claims.role,
                    });
                    let fut = self.service.call(req);
                    Box::pin(fut)
                }
                Err(app_err) => Box::pin(async move { Err(app_err.into()) }),
            },
            None => {
                let app_err = AppError::Unauthorized("Unauthenticated".into());
                Box::pin(async move { Err(app_err.into()) })
            }
        }
    }
}

