use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, prelude::*};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain;
use crate::infra::db::postgres::{
    postgres_connection::PgPoolSquad,
    schema::{classes, students, teachers},
};
use domain::{
    repositories::usage::UsageRepository,
    value_objects::enums::resource_kinds::ResourceKind,
};

pub struct UsagePostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl UsagePostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl UsageRepository for UsagePostgres {
    async fn count_resources(&self, school_id: Uuid, kind: ResourceKind) -> Result<u64> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let count: i64 = match kind {
            ResourceKind::Classes => classes::table
                .filter(classes::school_id.eq(school_id))
                .count()
                .get_result(&mut conn)?,
            ResourceKind::Students => students::table
                .filter(students::school_id.eq(school_id))
                .count()
                .get_result(&mut conn)?,
            ResourceKind::Teachers => teachers::table
                .filter(teachers::school_id.eq(school_id))
                .count()
                .get_result(&mut conn)?,
        };

        Ok(u64::try_from(count)?)
    }
}
