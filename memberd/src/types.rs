//! Common type definitions.
//!
//! Entity IDs are server-assigned `BIGSERIAL` values, aliased for readability:
//!
//! - [`UserId`]: user account identifier
//! - [`ImageId`]: image metadata row identifier
//! - [`SessionId`]: session row identifier
//!
//! The [`Operation`] enum describes what a caller was attempting when an
//! authorization check failed; it only exists to make 403 errors legible.

use std::fmt;

// Type aliases for IDs
pub type UserId = i64;
pub type ImageId = i64;
pub type SessionId = i64;

// Operations that can be performed on resources.
// *-All means unrestricted access, *-Own means restricted to own resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ReadAll,
    ReadOwn,
    UpdateOwn,
    CreateOwn,
    DeleteOwn,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::ReadAll | Operation::ReadOwn => write!(f, "Read"),
            Operation::UpdateOwn => write!(f, "Update"),
            Operation::CreateOwn => write!(f, "Create"),
            Operation::DeleteOwn => write!(f, "Delete"),
        }
    }
}
