//! Success half of the uniform response envelope.
//!
//! Every successful endpoint answers `{ "success": true, "data": ... }`;
//! the failure half lives in [`crate::error`].

use actix_web::HttpResponse;
use serde::Serialize;
use serde_json::json;

/// `200 OK` with the success envelope.
pub fn ok<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Ok().json(json!({ "success": true, "data": data }))
}

/// `201 Created` with the success envelope.
pub fn created<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Created().json(json!({ "success": true, "data": data }))
}
