use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use revu_core::RepoError;
use revu_core::domain::Incentive;
use revu_core::ports::IncentiveStore;

/// Incentive definitions held in memory.
#[derive(Default)]
pub struct InMemoryIncentiveStore {
    incentives: RwLock<HashMap<Uuid, Incentive>>,
}

impl InMemoryIncentiveStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an incentive definition (merchant dashboards own this in production).
    pub async fn insert(&self, incentive: Incentive) {
        self.incentives.write().await.insert(incentive.id, incentive);
    }
}

#[async_trait]
impl IncentiveStore for InMemoryIncentiveStore {
    async fn find_active_for_merchant(
        &self,
        merchant_id: &str,
    ) -> Result<Option<Incentive>, RepoError> {
        let incentives = self.incentives.read().await;
        Ok(incentives
            .values()
            .filter(|i| i.is_active && i.merchant_id == merchant_id)
            .max_by_key(|i| i.created_at)
            .cloned())
    }
}
