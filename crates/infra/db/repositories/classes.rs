use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{RunQueryDsl, insert_into, prelude::*};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{
    entities::classes::{ClassEntity, InsertClassEntity},
    repositories::classes::ClassRepository,
    value_objects::classes::ClassModel,
};
use crate::infra::db::postgres::{postgres_connection::PgPoolSquad, schema::classes};

pub struct ClassPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl ClassPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl ClassRepository for ClassPostgres {
    async fn create_class(&self, school_id: Uuid, name: &str) -> Result<ClassModel> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let insert_entity = InsertClassEntity {
            school_id,
            name: name.to_string(),
            created_at: Utc::now(),
        };

        let class = insert_into(classes::table)
            .values(&insert_entity)
            .returning(ClassEntity::as_returning())
            .get_result::<ClassEntity>(&mut conn)?;

        Ok(ClassModel::from(class))
    }
}
