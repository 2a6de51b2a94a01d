//! Role resolution and permission checks.
//!
//! A request's caller is resolved once into an immutable [`Principal`]
//! carrying exactly one [`Role`]. Handlers then call explicit `require_*`
//! guards before touching state.

mod error;
mod permission;
mod role;

#[cfg(test)]
mod tests;

pub use error::PermissionError;
pub use permission::*;
pub use role::{
    BoardMemberProfile, Principal, ProfileSet, Role, RoleKind, StudentProfile, TeacherProfile,
    UnknownRole, resolve_role,
};
