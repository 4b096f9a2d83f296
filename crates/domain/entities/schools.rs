use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::schools;

/// Tenant row. The subscription lives on it as `plan_id` + `plan_expires_at`.
#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = schools)]
pub struct SchoolEntity {
    pub id: Uuid,
    pub name: String,
    pub plan_id: String,
    pub plan_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = schools)]
#[diesel(treat_none_as_null = true)]
pub struct UpdateSchoolPlanEntity {
    pub plan_id: String,
    pub plan_expires_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schools)]
pub struct InsertSchoolEntity {
    pub name: String,
    pub plan_id: String,
    pub plan_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
