//! Incentive entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "incentives")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub merchant_id: String,
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub code_prefix: Option<String>,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for revu_core::domain::Incentive {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            merchant_id: model.merchant_id,
            title: model.title,
            description: model.description,
            code_prefix: model.code_prefix,
            is_active: model.is_active,
            created_at: model.created_at.into(),
        }
    }
}

impl From<revu_core::domain::Incentive> for ActiveModel {
    fn from(incentive: revu_core::domain::Incentive) -> Self {
        Self {
            id: Set(incentive.id),
            merchant_id: Set(incentive.merchant_id),
            title: Set(incentive.title),
            description: Set(incentive.description),
            code_prefix: Set(incentive.code_prefix),
            is_active: Set(incentive.is_active),
            created_at: Set(incentive.created_at.into()),
        }
    }
}
