//! Domain entities - the core business objects.

mod incentive;
mod rate_limit;
pub mod redemption;
mod review_prompt;
mod review_session;

pub use incentive::{Incentive, IssuedIncentive};
pub use rate_limit::{ActionType, RateLimitDecision, RateLimitEntry, RateLimitKey, RateLimitPolicy};
pub use review_prompt::{MAX_HIGHLIGHTS, ReviewPrompt};
pub use review_session::{
    IncentiveClaim, NewReviewSession, ReviewPatch, ReviewSession, SessionState,
};
