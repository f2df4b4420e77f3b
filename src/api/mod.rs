//! HTTP surface: `/analise`, `/health`, `/` and `/static`.

pub mod error;
pub mod form;
pub mod routes;

pub use error::ApiError;
pub use routes::{AppState, build_router};
