//! Rate-limit ledger entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use revu_core::domain::{ActionType, RateLimitEntry, RateLimitKey};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "rate_limits")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub device_fingerprint: String,
    pub outlet_id: String,
    pub qr_code_id: Option<String>,
    pub action_type: String,
    pub action_count: i32,
    pub last_action_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for RateLimitEntry {
    type Error = revu_core::RepoError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let action_type: ActionType = model
            .action_type
            .parse()
            .map_err(|e: revu_core::DomainError| revu_core::RepoError::Query(e.to_string()))?;

        let action_count = u32::try_from(model.action_count).map_err(|_| {
            revu_core::RepoError::Query(format!(
                "negative action_count {} in rate_limits row {}",
                model.action_count, model.id
            ))
        })?;

        Ok(Self {
            key: RateLimitKey {
                device_fingerprint: model.device_fingerprint,
                outlet_id: model.outlet_id,
                qr_code_id: model.qr_code_id,
                action_type,
            },
            action_count,
            last_action_at: model.last_action_at.into(),
        })
    }
}

/// Conversion from a domain entry to a fresh ActiveModel row.
impl From<&RateLimitEntry> for ActiveModel {
    fn from(entry: &RateLimitEntry) -> Self {
        Self {
            id: Set(Uuid::new_v4()),
            device_fingerprint: Set(entry.key.device_fingerprint.clone()),
            outlet_id: Set(entry.key.outlet_id.clone()),
            qr_code_id: Set(entry.key.qr_code_id.clone()),
            action_type: Set(entry.key.action_type.as_str().to_string()),
            action_count: Set(count_to_db(entry.action_count)),
            last_action_at: Set(entry.last_action_at.into()),
        }
    }
}

pub(crate) fn count_to_db(count: u32) -> i32 {
    i32::try_from(count).unwrap_or(i32::MAX)
}
