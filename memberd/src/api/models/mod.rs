//! API request and response data models.
//!
//! These structures define the public API contract and are distinct from the
//! database models in [`crate::db::models`], allowing independent evolution of
//! API and storage representations. All models are annotated with `utoipa`
//! for automatic API docs.
//!
//! The conversion boundary is also the privacy boundary: database rows carry
//! the password hash, response models never do.

pub mod admin;
pub mod auth;
pub mod images;
pub mod users;
