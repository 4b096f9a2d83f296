use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::payments;

/// Ledger row keyed by the billing provider's reference; one row per applied payment.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = payments)]
pub struct InsertPaymentEntity {
    pub reference: String,
    pub school_id: Uuid,
    pub plan_id: String,
    pub applied_at: DateTime<Utc>,
}
