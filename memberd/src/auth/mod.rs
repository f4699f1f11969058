//! Authentication and authorization system.
//!
//! Browser-based authentication using a secure HTTP-only cookie:
//! - Users register or log in with email/password
//! - A signed, time-limited JWT is set as the session cookie and also
//!   recorded in the `sessions` table so logout can revoke it server-side
//! - Every authenticated request resolves the cookie through
//!   [`current_user::CurrentUser`], which checks signature, embedded expiry,
//!   and the session row
//!
//! # Authorization
//!
//! A two-tier model: regular users operate on their own resources, and
//! identities whose email appears in the configured admin allow-list carry
//! the `is_admin` capability. Admin routes use the
//! [`current_user::AdminUser`] extractor; nothing else consults the
//! allow-list.
//!
//! # Modules
//!
//! - [`current_user`]: Extractors for getting the authenticated user in handlers
//! - [`password`]: Password hashing and verification using Argon2
//! - [`session`]: JWT session token creation and verification
//!
//! # Usage in Handlers
//!
//! ```ignore
//! use memberd::auth::current_user::AdminUser;
//! use memberd::api::models::users::CurrentUser;
//!
//! async fn protected_handler(current_user: CurrentUser) -> String {
//!     format!("Hello, {}!", current_user.email)
//! }
//!
//! async fn admin_handler(AdminUser(user): AdminUser) -> String {
//!     format!("Admin access for {}", user.email)
//! }
//! ```

pub mod current_user;
pub mod password;
pub mod session;
