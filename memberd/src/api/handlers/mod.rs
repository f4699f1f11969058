//! API request handlers.
//!
//! Handlers are thin: they resolve identity through the extractors in
//! [`crate::auth::current_user`], validate input, call into the repositories,
//! and convert rows into the response models. Every failure is converted to a
//! structured response by [`crate::errors::Error`]; nothing propagates past
//! the request boundary.

pub mod admin;
pub mod auth;
pub mod images;
pub mod users;
