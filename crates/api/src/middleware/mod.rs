//! Request middleware and extractors.

pub mod auth;

pub use auth::{CurrentPrincipal, auth_middleware};
