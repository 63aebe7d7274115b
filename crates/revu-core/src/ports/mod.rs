//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod clock;
mod rate_limit;
mod repository;
mod review_text;
mod throttle;

pub use clock::{Clock, SystemClock};
pub use rate_limit::RateLimitStore;
pub use repository::{IncentiveStore, ReviewSessionStore};
pub use review_text::{GenerationError, ReviewTextGenerator};
pub use throttle::{RequestThrottle, ThrottleError, ThrottleResult};
