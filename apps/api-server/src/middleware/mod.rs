//! Middleware modules.

pub mod error;
pub mod throttle;

pub use error::{AppError, AppResult, TracedResult, WithTrace};
pub use throttle::ThrottleMiddleware;
