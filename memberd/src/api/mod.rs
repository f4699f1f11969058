//! HTTP API layer.
//!
//! Routes are wired up in [`crate::build_router`]:
//!
//! - **Authentication** (`/auth/*`): registration, login, logout
//! - **Profile** (`/users/me`): the caller's own record
//! - **Images** (`/images/*`): five-slot upload, listing, fetch, delete
//! - **Admin** (`/admin/*`): aggregate views, gated by the admin allow-list

pub mod handlers;
pub mod models;
