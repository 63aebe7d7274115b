//! PostgreSQL port implementations.

use std::marker::PhantomData;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DbConn, DbErr, EntityTrait, QueryFilter, QueryOrder,
};
use uuid::Uuid;

use revu_core::RepoError;
use revu_core::domain::{
    Incentive, IncentiveClaim, RateLimitEntry, RateLimitKey, ReviewPatch, ReviewSession,
};
use revu_core::ports::{IncentiveStore, RateLimitStore, ReviewSessionStore};

use super::entity::incentive::{self, Entity as IncentiveEntity};
use super::entity::rate_limit::{self, Entity as RateLimitEntity, count_to_db};
use super::entity::review_session::{self, Entity as ReviewSessionEntity};

/// Generic PostgreSQL repository over one SeaORM entity.
pub struct PostgresRepository<E>
where
    E: EntityTrait,
{
    pub(crate) db: DbConn,
    _entity: PhantomData<E>,
}

impl<E> PostgresRepository<E>
where
    E: EntityTrait,
{
    pub fn new(db: DbConn) -> Self {
        Self {
            db,
            _entity: PhantomData,
        }
    }
}

/// PostgreSQL rate-limit ledger.
pub type PostgresRateLimitStore = PostgresRepository<RateLimitEntity>;

/// PostgreSQL review session store.
pub type PostgresReviewSessionStore = PostgresRepository<ReviewSessionEntity>;

/// PostgreSQL incentive store.
pub type PostgresIncentiveStore = PostgresRepository<IncentiveEntity>;

fn query_err(e: DbErr) -> RepoError {
    match e {
        DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => RepoError::Connection(e.to_string()),
        other => RepoError::Query(other.to_string()),
    }
}

fn write_err(e: DbErr) -> RepoError {
    let err_str = e.to_string();
    if err_str.contains("duplicate") || err_str.contains("unique") {
        RepoError::Constraint("Entity already exists".to_string())
    } else {
        query_err(e)
    }
}

/// Matches the exact key tuple, treating a missing QR code as SQL NULL.
fn key_condition(key: &RateLimitKey) -> Condition {
    let qr_code = match &key.qr_code_id {
        Some(qr) => rate_limit::Column::QrCodeId.eq(qr.as_str()),
        None => rate_limit::Column::QrCodeId.is_null(),
    };

    Condition::all()
        .add(rate_limit::Column::DeviceFingerprint.eq(key.device_fingerprint.as_str()))
        .add(rate_limit::Column::OutletId.eq(key.outlet_id.as_str()))
        .add(rate_limit::Column::ActionType.eq(key.action_type.as_str()))
        .add(qr_code)
}

#[async_trait]
impl RateLimitStore for PostgresRateLimitStore {
    async fn get_by_key(&self, key: &RateLimitKey) -> Result<Option<RateLimitEntry>, RepoError> {
        let model = RateLimitEntity::find()
            .filter(key_condition(key))
            .one(&self.db)
            .await
            .map_err(query_err)?;

        model.map(RateLimitEntry::try_from).transpose()
    }

    async fn insert_if_absent(&self, entry: &RateLimitEntry) -> Result<bool, RepoError> {
        let model: rate_limit::ActiveModel = entry.into();

        let inserted = RateLimitEntity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    rate_limit::Column::DeviceFingerprint,
                    rate_limit::Column::OutletId,
                    rate_limit::Column::QrCodeId,
                    rate_limit::Column::ActionType,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(query_err)?;

        Ok(inserted == 1)
    }

    async fn upsert_count(
        &self,
        expected: &RateLimitEntry,
        action_count: u32,
        last_action_at: DateTime<Utc>,
    ) -> Result<bool, RepoError> {
        let expected_at: DateTimeWithTimeZone = expected.last_action_at.into();
        let new_at: DateTimeWithTimeZone = last_action_at.into();

        let result = RateLimitEntity::update_many()
            .col_expr(
                rate_limit::Column::ActionCount,
                Expr::value(count_to_db(action_count)),
            )
            .col_expr(rate_limit::Column::LastActionAt, Expr::value(new_at))
            .filter(key_condition(&expected.key))
            .filter(rate_limit::Column::ActionCount.eq(count_to_db(expected.action_count)))
            .filter(rate_limit::Column::LastActionAt.eq(expected_at))
            .exec(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.rows_affected == 1)
    }
}

/// Builds the column updates for a review patch.
fn review_update(
    patch: &ReviewPatch,
    now: DateTime<Utc>,
) -> sea_orm::UpdateMany<ReviewSessionEntity> {
    let now: DateTimeWithTimeZone = now.into();
    let mut update = ReviewSessionEntity::update_many()
        .col_expr(review_session::Column::UpdatedAt, Expr::value(now));

    if let Some(text) = &patch.review_text {
        let text = Some(text.clone()).filter(|t| !t.trim().is_empty());
        update = update.col_expr(review_session::Column::ReviewText, Expr::value(text));
    }
    if let Some(posted) = patch.review_posted {
        update = update.col_expr(review_session::Column::ReviewPosted, Expr::value(posted));
    }

    update
}

#[async_trait]
impl ReviewSessionStore for PostgresReviewSessionStore {
    async fn insert(&self, session: ReviewSession) -> Result<ReviewSession, RepoError> {
        let model: review_session::ActiveModel = session.into();
        let saved = model.insert(&self.db).await.map_err(write_err)?;
        Ok(saved.into())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ReviewSession>, RepoError> {
        let result = ReviewSessionEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }

    async fn apply_review(
        &self,
        id: Uuid,
        patch: &ReviewPatch,
        now: DateTime<Utc>,
    ) -> Result<Option<ReviewSession>, RepoError> {
        let updated = review_update(patch, now)
            .filter(review_session::Column::Id.eq(id))
            .filter(review_session::Column::IncentiveClaimed.eq(false))
            .exec_with_returning(&self.db)
            .await
            .map_err(query_err)?;

        Ok(updated.into_iter().next().map(Into::into))
    }

    async fn compare_and_set_claimed(
        &self,
        id: Uuid,
        patch: &ReviewPatch,
        claim: &IncentiveClaim,
        now: DateTime<Utc>,
    ) -> Result<Option<ReviewSession>, RepoError> {
        let updated = review_update(patch, now)
            .col_expr(
                review_session::Column::IncentiveId,
                Expr::value(claim.incentive_id),
            )
            .col_expr(
                review_session::Column::IncentiveCode,
                Expr::value(claim.code.clone()),
            )
            .col_expr(review_session::Column::IncentiveClaimed, Expr::value(true))
            .filter(review_session::Column::Id.eq(id))
            .filter(review_session::Column::IncentiveClaimed.eq(false))
            .exec_with_returning(&self.db)
            .await
            .map_err(query_err)?;

        Ok(updated.into_iter().next().map(Into::into))
    }
}

#[async_trait]
impl IncentiveStore for PostgresIncentiveStore {
    async fn find_active_for_merchant(
        &self,
        merchant_id: &str,
    ) -> Result<Option<Incentive>, RepoError> {
        tracing::debug!(merchant_id, "Finding active incentive");

        let result = IncentiveEntity::find()
            .filter(incentive::Column::MerchantId.eq(merchant_id))
            .filter(incentive::Column::IsActive.eq(true))
            .order_by_desc(incentive::Column::CreatedAt)
            .one(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }
}
