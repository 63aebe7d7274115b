//! PostgreSQL persistence via SeaORM.

mod connections;
pub mod entity;
mod postgres_repo;

pub use connections::{DatabaseConfig, connect};
pub use postgres_repo::{
    PostgresIncentiveStore, PostgresRateLimitStore, PostgresRepository, PostgresReviewSessionStore,
};
