use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{RunQueryDsl, insert_into, prelude::*};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain;
use crate::infra::db::postgres::{
    postgres_connection::PgPoolSquad,
    schema::{payments, schools},
};
use domain::{
    entities::{
        payments::InsertPaymentEntity,
        schools::{InsertSchoolEntity, SchoolEntity, UpdateSchoolPlanEntity},
    },
    repositories::subscriptions::SubscriptionRepository,
    value_objects::{
        enums::plan_ids::PlanId,
        plans::get_plan,
        subscriptions::{PaymentOutcome, SubscriptionModel, renewed_expiry},
    },
};

pub struct SubscriptionPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl SubscriptionPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl SubscriptionRepository for SubscriptionPostgres {
    async fn find_by_school_id(&self, school_id: Uuid) -> Result<Option<SubscriptionModel>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let school = schools::table
            .filter(schools::id.eq(school_id))
            .select(SchoolEntity::as_select())
            .first::<SchoolEntity>(&mut conn)
            .optional()?;

        Ok(school.map(SubscriptionModel::from))
    }

    async fn create_school(
        &self,
        name: &str,
        trial_expires_at: DateTime<Utc>,
    ) -> Result<SubscriptionModel> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let now = Utc::now();

        let insert_entity = InsertSchoolEntity {
            name: name.to_string(),
            plan_id: PlanId::Trial.to_string(),
            plan_expires_at: Some(trial_expires_at),
            created_at: now,
            updated_at: now,
        };

        let school = insert_into(schools::table)
            .values(&insert_entity)
            .returning(SchoolEntity::as_returning())
            .get_result::<SchoolEntity>(&mut conn)?;

        Ok(SubscriptionModel::from(school))
    }

    async fn update_plan(
        &self,
        school_id: Uuid,
        plan_id: PlanId,
        expiry_date: Option<DateTime<Utc>>,
    ) -> Result<Option<SubscriptionModel>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let changes = UpdateSchoolPlanEntity {
            plan_id: plan_id.to_string(),
            plan_expires_at: expiry_date,
            updated_at: Utc::now(),
        };

        let school = diesel::update(schools::table.filter(schools::id.eq(school_id)))
            .set(&changes)
            .returning(SchoolEntity::as_returning())
            .get_result::<SchoolEntity>(&mut conn)
            .optional()?;

        Ok(school.map(SubscriptionModel::from))
    }

    async fn apply_payment(
        &self,
        school_id: Uuid,
        plan_id: PlanId,
        payment_reference: &str,
        paid_at: DateTime<Utc>,
    ) -> Result<Option<PaymentOutcome>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let duration_days = get_plan(plan_id).duration_days;

        let outcome = conn.transaction::<Option<PaymentOutcome>, diesel::result::Error, _>(|tx| {
            // The row lock serialises renewals of the same school.
            let Some(school) = schools::table
                .filter(schools::id.eq(school_id))
                .select(SchoolEntity::as_select())
                .for_update()
                .first::<SchoolEntity>(tx)
                .optional()?
            else {
                return Ok(None);
            };

            let recorded = insert_into(payments::table)
                .values(&InsertPaymentEntity {
                    reference: payment_reference.to_string(),
                    school_id,
                    plan_id: plan_id.to_string(),
                    applied_at: paid_at,
                })
                .on_conflict(payments::reference)
                .do_nothing()
                .execute(tx)?;

            if recorded == 0 {
                return Ok(Some(PaymentOutcome {
                    subscription: SubscriptionModel::from(school),
                    applied: false,
                }));
            }

            let changes = UpdateSchoolPlanEntity {
                plan_id: plan_id.to_string(),
                plan_expires_at: renewed_expiry(school.plan_expires_at, paid_at, duration_days),
                updated_at: paid_at,
            };

            let updated = diesel::update(schools::table.find(school_id))
                .set(&changes)
                .returning(SchoolEntity::as_returning())
                .get_result::<SchoolEntity>(tx)?;

            Ok(Some(PaymentOutcome {
                subscription: SubscriptionModel::from(updated),
                applied: true,
            }))
        })?;

        Ok(outcome)
    }
}
