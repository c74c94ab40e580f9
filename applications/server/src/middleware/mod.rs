/// Request middleware and extractors
pub mod auth;

pub use auth::{AuthenticatedUser, USER_ID_HEADER};
