//! In-memory port implementations - used when no database is configured
//! and as test doubles.

mod clock;
mod incentive;
mod rate_limit;
mod review_session;

pub use clock::ManualClock;
pub use incentive::InMemoryIncentiveStore;
pub use rate_limit::InMemoryRateLimitStore;
pub use review_session::InMemoryReviewSessionStore;
