pub mod auth;

pub use auth::{identity_middleware, require_capability, Capability, RequestUser, Role};
