//! Review session entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "review_sessions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub qr_code_id: String,
    pub outlet_id: String,
    pub merchant_id: String,
    pub device_fingerprint: String,
    pub session_language: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub review_text: Option<String>,
    pub review_posted: bool,
    pub incentive_id: Option<Uuid>,
    pub incentive_claimed: bool,
    pub incentive_code: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::incentive::Entity",
        from = "Column::IncentiveId",
        to = "super::incentive::Column::Id",
        on_update = "Cascade",
        on_delete = "SetNull"
    )]
    Incentive,
}

impl Related<super::incentive::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Incentive.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to domain ReviewSession.
impl From<Model> for revu_core::domain::ReviewSession {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            qr_code_id: model.qr_code_id,
            outlet_id: model.outlet_id,
            merchant_id: model.merchant_id,
            device_fingerprint: model.device_fingerprint,
            session_language: model.session_language,
            review_text: model.review_text,
            review_posted: model.review_posted,
            incentive_id: model.incentive_id,
            incentive_claimed: model.incentive_claimed,
            incentive_code: model.incentive_code,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

/// Conversion from domain ReviewSession to SeaORM ActiveModel.
impl From<revu_core::domain::ReviewSession> for ActiveModel {
    fn from(session: revu_core::domain::ReviewSession) -> Self {
        Self {
            id: Set(session.id),
            qr_code_id: Set(session.qr_code_id),
            outlet_id: Set(session.outlet_id),
            merchant_id: Set(session.merchant_id),
            device_fingerprint: Set(session.device_fingerprint),
            session_language: Set(session.session_language),
            review_text: Set(session.review_text),
            review_posted: Set(session.review_posted),
            incentive_id: Set(session.incentive_id),
            incentive_claimed: Set(session.incentive_claimed),
            incentive_code: Set(session.incentive_code),
            created_at: Set(session.created_at.into()),
            updated_at: Set(session.updated_at.into()),
        }
    }
}
