//! Repository implementations for database access.
//!
//! Each repository wraps a SQLx connection or transaction, provides
//! strongly-typed CRUD operations, and returns domain models from
//! [`crate::db::models`].
//!
//! # Available Repositories
//!
//! - [`Users`]: account rows; implements the base [`Repository`] trait
//! - [`Images`]: slot-keyed image metadata (slot-oriented inherent methods)
//! - [`Sessions`]: issued-token records backing server-side revocation
//! - [`object_store`]: binary object storage behind the [`ObjectStore`] trait
//!
//! # Common Pattern
//!
//! ```ignore
//! use memberd::db::handlers::{Repository, Users};
//!
//! async fn example(pool: &sqlx::PgPool) -> Result<(), Box<dyn std::error::Error>> {
//!     let mut tx = pool.begin().await?;
//!     let mut repo = Users::new(&mut tx);
//!     let user = repo.get_by_email("user@example.com").await?;
//!     tx.commit().await?;
//!     Ok(())
//! }
//! ```
//!
//! Write paths that touch more than one table (registration: user row plus
//! session row) run inside a transaction; single-statement reads may use a
//! plain pool connection.

pub mod images;
pub mod object_store;
pub mod repository;
pub mod sessions;
pub mod users;

pub use images::Images;
pub use object_store::{LocalObjectStore, ObjectStore};
pub use repository::Repository;
pub use sessions::Sessions;
pub use users::Users;
