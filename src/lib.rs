#![doc = "The `listkeeper` library crate."]
#![doc = ""]
#![doc = "Core business logic for the ListKeeper to-do API: the data model and"]
#![doc = "owner-scoped repositories, authentication and session handling, the"]
#![doc = "field validation layer, routing configuration and error handling."]
#![doc = "The binary (`main.rs`) uses it to construct and run the application."]

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod response;
pub mod routes;
pub mod validation;

pub use crate::config::Config;
pub use crate::error::AppError;
