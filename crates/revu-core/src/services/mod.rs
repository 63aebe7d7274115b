//! Services - business rules layered over the ports.

mod rate_limit;
mod review_session;
mod review_writer;

pub use rate_limit::RateLimitService;
pub use review_session::{ReviewSessionService, ReviewUpdate, SessionOutcome};
pub use review_writer::ReviewWriter;
