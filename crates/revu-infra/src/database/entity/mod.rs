//! SeaORM entities.

pub mod incentive;
pub mod rate_limit;
pub mod review_session;
