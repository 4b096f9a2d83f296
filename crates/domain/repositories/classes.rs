use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::value_objects::classes::ClassModel;

#[async_trait]
#[automock]
pub trait ClassRepository {
    async fn create_class(&self, school_id: Uuid, name: &str) -> Result<ClassModel>;
}
