//! Management API access
//!
//! The `ManagementApi` trait is the seam between resource logic and the
//! remote identity platform. Resource operations take a typed handle to an
//! implementation explicitly; `ManagementClient` is the HTTP implementation.
//!
//! # Endpoints
//!
//! - `POST   /users`
//! - `GET    /users/{id}`
//! - `PATCH  /users/{id}`
//! - `DELETE /users/{id}`
//! - `GET    /clients/{client_id}`

mod client;
mod models;

pub use client::{ManagementApi, ManagementClient};
pub use models::{Client, User};
