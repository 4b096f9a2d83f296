use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::classes;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = classes)]
pub struct ClassEntity {
    pub id: Uuid,
    pub school_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = classes)]
pub struct InsertClassEntity {
    pub school_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}
