//! Database record structures matching table schemas.
//!
//! These are internal row types. They are converted into the API models in
//! [`crate::api::models`] before anything is serialized to a client; in
//! particular [`users::User`] carries the password hash and is therefore not
//! serializable.

pub mod images;
pub mod sessions;
pub mod users;
