use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::value_objects::enums::resource_kinds::ResourceKind;

#[async_trait]
#[automock]
pub trait UsageRepository {
    /// Live row count for the school. Never served from a cache.
    async fn count_resources(&self, school_id: Uuid, kind: ResourceKind) -> Result<u64>;
}
