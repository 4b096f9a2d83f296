use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::value_objects::enums::plan_ids::PlanId;
use crate::domain::value_objects::subscriptions::{PaymentOutcome, SubscriptionModel};

#[async_trait]
#[automock]
pub trait SubscriptionRepository {
    async fn find_by_school_id(&self, school_id: Uuid) -> Result<Option<SubscriptionModel>>;

    /// Inserts a new school on the trial plan. The expiry is mandatory.
    async fn create_school(
        &self,
        name: &str,
        trial_expires_at: DateTime<Utc>,
    ) -> Result<SubscriptionModel>;

    /// Overwrites plan and expiry. Returns `None` when the school does not exist.
    async fn update_plan(
        &self,
        school_id: Uuid,
        plan_id: PlanId,
        expiry_date: Option<DateTime<Utc>>,
    ) -> Result<Option<SubscriptionModel>>;

    /// Records `payment_reference` and extends the subscription by the plan's
    /// duration as one atomic step. A reference seen before leaves the row as is.
    /// Returns `None` when the school does not exist.
    async fn apply_payment(
        &self,
        school_id: Uuid,
        plan_id: PlanId,
        payment_reference: &str,
        paid_at: DateTime<Utc>,
    ) -> Result<Option<PaymentOutcome>>;
}
