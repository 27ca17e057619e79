//! Application layer: the exposed repository interface and its wiring.

#[allow(clippy::module_inception)]
mod app;
mod response;

pub use app::{App, AppContext, AppError, AppParts, Result};
pub use response::ResourceResponse;
