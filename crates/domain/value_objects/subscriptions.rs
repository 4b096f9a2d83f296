use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::schools::SchoolEntity;
use crate::domain::value_objects::enums::plan_ids::PlanId;
use crate::domain::value_objects::plans::{Plan, PlanLimits, resolve_plan};

/// A school's subscription as read from its row. `expiry_date == None` never expires.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubscriptionModel {
    pub school_id: Uuid,
    pub plan_id: PlanId,
    pub expiry_date: Option<DateTime<Utc>>,
}

impl From<SchoolEntity> for SubscriptionModel {
    fn from(value: SchoolEntity) -> Self {
        let plan = resolve_plan(Some(value.plan_id.as_str()));

        Self {
            school_id: value.id,
            plan_id: plan.id,
            expiry_date: value.plan_expires_at,
        }
    }
}

/// New expiry after a paid period of `duration_days`. Counting starts from the
/// later of `now` and the current expiry, so early renewals keep remaining days.
/// A never-expiring subscription stays never-expiring.
pub fn renewed_expiry(
    current_expiry: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    duration_days: i32,
) -> Option<DateTime<Utc>> {
    current_expiry.map(|current| current.max(now) + Duration::days(i64::from(duration_days)))
}

/// Result of recording a payment. `applied == false` means the reference was
/// already recorded and the subscription was left untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaymentOutcome {
    pub subscription: SubscriptionModel,
    pub applied: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegisterSchoolModel {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdatePlanModel {
    pub plan_id: PlanId,
    #[serde(default)]
    pub expiry_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConfirmPaymentModel {
    pub plan_id: PlanId,
    pub payment_reference: String,
}

#[derive(Debug, Serialize)]
pub struct PlanDto {
    pub id: PlanId,
    pub name: &'static str,
    pub price_minor: i32,
    pub duration_days: i32,
    pub limits: PlanLimits,
    pub features: Vec<&'static str>,
}

impl From<&'static Plan> for PlanDto {
    fn from(value: &'static Plan) -> Self {
        Self {
            id: value.id,
            name: value.name,
            price_minor: value.price_minor,
            duration_days: value.duration_days,
            limits: value.limits,
            features: value.features.to_vec(),
        }
    }
}
