use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Merchant-scoped reward definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Incentive {
    pub id: Uuid,
    pub merchant_id: String,
    pub title: String,
    pub description: Option<String>,
    pub code_prefix: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Incentive {
    pub fn new(merchant_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            merchant_id: merchant_id.into(),
            title: title.into(),
            description: None,
            code_prefix: None,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    pub fn with_code_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.code_prefix = Some(prefix.into());
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }
}

/// Incentive handed to a customer together with their redemption code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedIncentive {
    #[serde(flatten)]
    pub incentive: Incentive,
    pub code: String,
}
