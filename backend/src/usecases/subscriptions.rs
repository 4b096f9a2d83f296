use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use schoolhub::domain::{
    repositories::{subscriptions::SubscriptionRepository, usage::UsageRepository},
    value_objects::{
        entitlements::{EntitlementsDto, ResourceUsageDto},
        enums::{plan_ids::PlanId, resource_kinds::ResourceKind},
        plans::all_plans,
        subscriptions::{PaymentOutcome, PlanDto, SubscriptionModel},
    },
};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::usecases::entitlement_evaluator::EntitlementEvaluator;

#[derive(Debug, Error)]
pub enum SubscriptionError {
    #[error("school not found")]
    SchoolNotFound,
    #[error("{0}")]
    InvalidRequest(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl SubscriptionError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            SubscriptionError::SchoolNotFound => StatusCode::NOT_FOUND,
            SubscriptionError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            SubscriptionError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, SubscriptionError>;

/// Plan lifecycle of a school: registration on a trial, admin changes, renewals,
/// and the read model clients use to gate their UI.
pub struct SubscriptionUseCase<S, U>
where
    S: SubscriptionRepository + Send + Sync + 'static,
    U: UsageRepository + Send + Sync + 'static,
{
    subscription_repo: Arc<S>,
    usage_repo: Arc<U>,
    trial_days: i64,
}

impl<S, U> SubscriptionUseCase<S, U>
where
    S: SubscriptionRepository + Send + Sync + 'static,
    U: UsageRepository + Send + Sync + 'static,
{
    pub fn new(subscription_repo: Arc<S>, usage_repo: Arc<U>, trial_days: i64) -> Self {
        Self {
            subscription_repo,
            usage_repo,
            trial_days,
        }
    }

    pub fn list_plans(&self) -> Vec<PlanDto> {
        all_plans().iter().map(PlanDto::from).collect()
    }

    /// The only provisioning path: every new school starts on a trial that ends.
    pub async fn register_school(&self, name: &str) -> UseCaseResult<SubscriptionModel> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SubscriptionError::InvalidRequest(
                "school name is required".to_string(),
            ));
        }

        let trial_expires_at = Utc::now() + Duration::days(self.trial_days);
        let subscription = self
            .subscription_repo
            .create_school(name, trial_expires_at)
            .await
            .map_err(|err| {
                error!(db_error = ?err, "subscriptions: failed to create school");
                SubscriptionError::Internal(err)
            })?;

        info!(
            school_id = %subscription.school_id,
            trial_days = self.trial_days,
            %trial_expires_at,
            "subscriptions: school registered on trial"
        );
        Ok(subscription)
    }

    /// Super-admin override. `expiry_date == None` grants a never-expiring plan,
    /// which is refused for the trial plan.
    pub async fn update_plan(
        &self,
        school_id: Uuid,
        plan_id: PlanId,
        expiry_date: Option<DateTime<Utc>>,
    ) -> UseCaseResult<SubscriptionModel> {
        if plan_id == PlanId::Trial && expiry_date.is_none() {
            warn!(%school_id, "subscriptions: refused never-expiring trial");
            return Err(SubscriptionError::InvalidRequest(
                "a trial plan needs an expiry date".to_string(),
            ));
        }

        info!(
            %school_id,
            %plan_id,
            expiry_date = ?expiry_date,
            "subscriptions: admin plan update"
        );
        self.subscription_repo
            .update_plan(school_id, plan_id, expiry_date)
            .await
            .map_err(|err| {
                error!(
                    %school_id,
                    %plan_id,
                    db_error = ?err,
                    "subscriptions: failed to write plan"
                );
                SubscriptionError::Internal(err)
            })?
            .ok_or_else(|| {
                warn!(%school_id, "subscriptions: school not found while writing plan");
                SubscriptionError::SchoolNotFound
            })
    }

    /// Applies one paid period. The repository records `payment_reference` and
    /// extends the expiry in a single locked step, so concurrent confirmations
    /// both count and a redelivered reference is a no-op.
    pub async fn confirm_payment(
        &self,
        school_id: Uuid,
        plan_id: PlanId,
        payment_reference: &str,
    ) -> UseCaseResult<PaymentOutcome> {
        let payment_reference = payment_reference.trim();
        if payment_reference.is_empty() {
            return Err(SubscriptionError::InvalidRequest(
                "payment_reference is required".to_string(),
            ));
        }

        let outcome = self
            .subscription_repo
            .apply_payment(school_id, plan_id, payment_reference, Utc::now())
            .await
            .map_err(|err| {
                error!(
                    %school_id,
                    %plan_id,
                    payment_reference,
                    db_error = ?err,
                    "subscriptions: failed to apply payment"
                );
                SubscriptionError::Internal(err)
            })?
            .ok_or_else(|| {
                warn!(%school_id, payment_reference, "subscriptions: payment for unknown school");
                SubscriptionError::SchoolNotFound
            })?;

        if outcome.applied {
            info!(
                %school_id,
                %plan_id,
                payment_reference,
                expiry_date = ?outcome.subscription.expiry_date,
                "subscriptions: payment confirmed"
            );
        } else {
            warn!(
                %school_id,
                payment_reference,
                "subscriptions: payment already applied, ignoring"
            );
        }
        Ok(outcome)
    }

    /// An expired school gets no features, matching what the guard enforces.
    pub async fn get_entitlements(&self, school_id: Uuid) -> UseCaseResult<EntitlementsDto> {
        let subscription = self.load_subscription(school_id).await?;
        let evaluator = EntitlementEvaluator::new(&subscription, Utc::now());
        let plan = evaluator.plan();
        let expired = evaluator.is_expired();

        let mut usage = Vec::with_capacity(ResourceKind::ALL.len());
        for kind in ResourceKind::ALL {
            let used = self
                .usage_repo
                .count_resources(school_id, kind)
                .await
                .map_err(|err| {
                    error!(
                        %school_id,
                        resource = %kind,
                        db_error = ?err,
                        "subscriptions: failed to count resources"
                    );
                    SubscriptionError::Internal(err)
                })?;

            usage.push(ResourceUsageDto {
                resource: kind,
                limit: plan.limit(kind),
                used,
                reached: evaluator.is_limit_reached(kind, used),
            });
        }

        let features = if expired {
            Vec::new()
        } else {
            plan.features.to_vec()
        };

        Ok(EntitlementsDto {
            plan_id: plan.id,
            plan_name: plan.name,
            expiry_date: subscription.expiry_date,
            expired,
            features,
            usage,
        })
    }

    async fn load_subscription(&self, school_id: Uuid) -> UseCaseResult<SubscriptionModel> {
        self.subscription_repo
            .find_by_school_id(school_id)
            .await
            .map_err(|err| {
                error!(
                    %school_id,
                    db_error = ?err,
                    "subscriptions: failed to load subscription"
                );
                SubscriptionError::Internal(err)
            })?
            .ok_or_else(|| {
                warn!(%school_id, "subscriptions: school not found");
                SubscriptionError::SchoolNotFound
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::{always, eq};
    use schoolhub::domain::{
        repositories::{subscriptions::MockSubscriptionRepository, usage::MockUsageRepository},
        value_objects::{
            plans::{ResourceLimit, features, get_plan},
            subscriptions::renewed_expiry,
        },
    };
    use std::{collections::HashSet, sync::Mutex};

    const TRIAL_DAYS: i64 = 14;

    fn subscription(
        school_id: Uuid,
        plan_id: PlanId,
        expiry_date: Option<DateTime<Utc>>,
    ) -> SubscriptionModel {
        SubscriptionModel {
            school_id,
            plan_id,
            expiry_date,
        }
    }

    fn expect_find(repo: &mut MockSubscriptionRepository, sub: SubscriptionModel) {
        repo.expect_find_by_school_id()
            .with(eq(sub.school_id))
            .returning(move |_| {
                let sub = sub.clone();
                Box::pin(async move { Ok(Some(sub)) })
            });
    }

    fn usecase(
        subscription_repo: MockSubscriptionRepository,
    ) -> SubscriptionUseCase<MockSubscriptionRepository, MockUsageRepository> {
        SubscriptionUseCase::new(
            Arc::new(subscription_repo),
            Arc::new(MockUsageRepository::new()),
            TRIAL_DAYS,
        )
    }

    /// Stored row plus the payment references already applied to it. The mock
    /// applies each payment under the mutex, the way the row lock does in Postgres.
    struct StoredSchool {
        subscription: SubscriptionModel,
        applied_references: HashSet<String>,
    }

    fn payment_repo(stored: Arc<Mutex<StoredSchool>>) -> MockSubscriptionRepository {
        let mut repo = MockSubscriptionRepository::new();
        repo.expect_apply_payment()
            .returning(move |_, plan_id, payment_reference, paid_at| {
                let outcome = {
                    let mut school = stored.lock().unwrap();
                    let applied = school
                        .applied_references
                        .insert(payment_reference.to_string());
                    if applied {
                        school.subscription.plan_id = plan_id;
                        school.subscription.expiry_date = renewed_expiry(
                            school.subscription.expiry_date,
                            paid_at,
                            get_plan(plan_id).duration_days,
                        );
                    }
                    PaymentOutcome {
                        subscription: school.subscription.clone(),
                        applied,
                    }
                };
                Box::pin(async move {
                    tokio::task::yield_now().await;
                    Ok(Some(outcome))
                })
            });
        repo
    }

    #[tokio::test]
    async fn register_school_starts_a_trial_that_ends() {
        let school_id = Uuid::new_v4();
        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_create_school()
            .times(1)
            .returning(move |name, trial_expires_at| {
                assert_eq!(name, "Greenfield High");
                Box::pin(async move {
                    Ok(SubscriptionModel {
                        school_id,
                        plan_id: PlanId::Trial,
                        expiry_date: Some(trial_expires_at),
                    })
                })
            });

        let before = Utc::now();
        let sub = usecase(subscription_repo)
            .register_school("  Greenfield High ")
            .await
            .unwrap();

        assert_eq!(sub.plan_id, PlanId::Trial);
        let expiry = sub.expiry_date.unwrap();
        assert!(expiry >= before + Duration::days(TRIAL_DAYS));
        assert!(expiry <= Utc::now() + Duration::days(TRIAL_DAYS));
    }

    #[tokio::test]
    async fn register_school_rejects_blank_name() {
        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo.expect_create_school().times(0);

        let err = usecase(subscription_repo)
            .register_school("   ")
            .await
            .unwrap_err();

        assert!(matches!(err, SubscriptionError::InvalidRequest(_)));
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn update_plan_for_missing_school_is_not_found() {
        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_update_plan()
            .returning(|_, _, _| Box::pin(async { Ok(None) }));

        let err = usecase(subscription_repo)
            .update_plan(Uuid::new_v4(), PlanId::Premium, None)
            .await
            .unwrap_err();

        assert!(matches!(err, SubscriptionError::SchoolNotFound));
        assert_eq!(err.status_code(), axum::http::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn update_plan_can_grant_never_expiring_plan() {
        let school_id = Uuid::new_v4();
        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_update_plan()
            .with(eq(school_id), eq(PlanId::Premium), eq(None::<DateTime<Utc>>))
            .times(1)
            .returning(|school_id, plan_id, expiry_date| {
                Box::pin(async move {
                    Ok(Some(SubscriptionModel {
                        school_id,
                        plan_id,
                        expiry_date,
                    }))
                })
            });

        let sub = usecase(subscription_repo)
            .update_plan(school_id, PlanId::Premium, None)
            .await
            .unwrap();

        assert_eq!(sub.expiry_date, None);
    }

    #[tokio::test]
    async fn update_plan_refuses_never_expiring_trial() {
        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo.expect_update_plan().times(0);

        let err = usecase(subscription_repo)
            .update_plan(Uuid::new_v4(), PlanId::Trial, None)
            .await
            .unwrap_err();

        assert!(matches!(err, SubscriptionError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn payment_extends_from_future_expiry() {
        let school_id = Uuid::new_v4();
        let current_expiry = Utc::now() + Duration::days(5);
        let stored = Arc::new(Mutex::new(StoredSchool {
            subscription: subscription(school_id, PlanId::Basic, Some(current_expiry)),
            applied_references: HashSet::new(),
        }));

        let outcome = usecase(payment_repo(Arc::clone(&stored)))
            .confirm_payment(school_id, PlanId::Standard, "pay_001")
            .await
            .unwrap();

        assert!(outcome.applied);
        assert_eq!(outcome.subscription.plan_id, PlanId::Standard);
        assert_eq!(
            outcome.subscription.expiry_date,
            Some(current_expiry + Duration::days(30))
        );
    }

    #[tokio::test]
    async fn concurrent_payments_each_add_a_period() {
        let school_id = Uuid::new_v4();
        let start = Utc::now() + Duration::days(5);
        let stored = Arc::new(Mutex::new(StoredSchool {
            subscription: subscription(school_id, PlanId::Basic, Some(start)),
            applied_references: HashSet::new(),
        }));
        let usecase = usecase(payment_repo(Arc::clone(&stored)));

        let (first, second) = tokio::join!(
            usecase.confirm_payment(school_id, PlanId::Basic, "pay_001"),
            usecase.confirm_payment(school_id, PlanId::Basic, "pay_002"),
        );

        assert!(first.unwrap().applied);
        assert!(second.unwrap().applied);
        assert_eq!(
            stored.lock().unwrap().subscription.expiry_date,
            Some(start + Duration::days(60))
        );
    }

    #[tokio::test]
    async fn redelivered_payment_is_applied_once() {
        let school_id = Uuid::new_v4();
        let start = Utc::now() + Duration::days(5);
        let stored = Arc::new(Mutex::new(StoredSchool {
            subscription: subscription(school_id, PlanId::Basic, Some(start)),
            applied_references: HashSet::new(),
        }));
        let usecase = usecase(payment_repo(Arc::clone(&stored)));

        let first = usecase
            .confirm_payment(school_id, PlanId::Basic, "pay_001")
            .await
            .unwrap();
        let replay = usecase
            .confirm_payment(school_id, PlanId::Basic, "pay_001")
            .await
            .unwrap();

        assert!(first.applied);
        assert!(!replay.applied);
        assert_eq!(replay.subscription.expiry_date, Some(start + Duration::days(30)));
    }

    #[tokio::test]
    async fn payment_after_lapse_extends_from_now() {
        let school_id = Uuid::new_v4();
        let stored = Arc::new(Mutex::new(StoredSchool {
            subscription: subscription(
                school_id,
                PlanId::Trial,
                Some(Utc::now() - Duration::days(40)),
            ),
            applied_references: HashSet::new(),
        }));

        let before = Utc::now();
        let outcome = usecase(payment_repo(stored))
            .confirm_payment(school_id, PlanId::Basic, "pay_001")
            .await
            .unwrap();

        let expiry = outcome.subscription.expiry_date.unwrap();
        assert!(expiry >= before + Duration::days(30));
        assert!(expiry <= Utc::now() + Duration::days(30));
    }

    #[tokio::test]
    async fn payment_keeps_never_expiring_subscription() {
        let school_id = Uuid::new_v4();
        let stored = Arc::new(Mutex::new(StoredSchool {
            subscription: subscription(school_id, PlanId::Standard, None),
            applied_references: HashSet::new(),
        }));

        let outcome = usecase(payment_repo(stored))
            .confirm_payment(school_id, PlanId::Premium, "pay_001")
            .await
            .unwrap();

        assert_eq!(outcome.subscription.plan_id, PlanId::Premium);
        assert_eq!(outcome.subscription.expiry_date, None);
    }

    #[tokio::test]
    async fn payment_needs_a_reference() {
        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo.expect_apply_payment().times(0);

        let err = usecase(subscription_repo)
            .confirm_payment(Uuid::new_v4(), PlanId::Basic, " ")
            .await
            .unwrap_err();

        assert!(matches!(err, SubscriptionError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn payment_for_missing_school_is_not_found() {
        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_apply_payment()
            .returning(|_, _, _, _| Box::pin(async { Ok(None) }));

        let err = usecase(subscription_repo)
            .confirm_payment(Uuid::new_v4(), PlanId::Basic, "pay_001")
            .await
            .unwrap_err();

        assert!(matches!(err, SubscriptionError::SchoolNotFound));
    }

    #[tokio::test]
    async fn entitlements_report_live_usage() {
        let school_id = Uuid::new_v4();
        let mut subscription_repo = MockSubscriptionRepository::new();
        expect_find(
            &mut subscription_repo,
            subscription(school_id, PlanId::Trial, Some(Utc::now() + Duration::days(3))),
        );

        let mut usage_repo = MockUsageRepository::new();
        usage_repo
            .expect_count_resources()
            .with(eq(school_id), always())
            .returning(|_, kind| {
                let count: u64 = match kind {
                    ResourceKind::Classes => 2,
                    ResourceKind::Students => 50,
                    ResourceKind::Teachers => 1,
                };
                Box::pin(async move { Ok(count) })
            });

        let usecase =
            SubscriptionUseCase::new(Arc::new(subscription_repo), Arc::new(usage_repo), TRIAL_DAYS);

        let entitlements = usecase.get_entitlements(school_id).await.unwrap();

        assert_eq!(entitlements.plan_id, PlanId::Trial);
        assert!(!entitlements.expired);
        assert!(entitlements.features.contains(&features::HOMEWORK));
        let students = entitlements
            .usage
            .iter()
            .find(|usage| usage.resource == ResourceKind::Students)
            .unwrap();
        assert_eq!(students.limit, ResourceLimit::Limited(50));
        assert_eq!(students.used, 50);
        assert!(students.reached);
        let classes = entitlements
            .usage
            .iter()
            .find(|usage| usage.resource == ResourceKind::Classes)
            .unwrap();
        assert!(!classes.reached);
    }

    #[tokio::test]
    async fn expired_school_reports_no_features() {
        let school_id = Uuid::new_v4();
        let mut subscription_repo = MockSubscriptionRepository::new();
        expect_find(
            &mut subscription_repo,
            subscription(school_id, PlanId::Premium, Some(Utc::now() - Duration::days(1))),
        );

        let mut usage_repo = MockUsageRepository::new();
        usage_repo
            .expect_count_resources()
            .returning(|_, _| Box::pin(async { Ok(0u64) }));

        let usecase =
            SubscriptionUseCase::new(Arc::new(subscription_repo), Arc::new(usage_repo), TRIAL_DAYS);

        let entitlements = usecase.get_entitlements(school_id).await.unwrap();

        assert!(entitlements.expired);
        assert!(entitlements.features.is_empty());
        assert!(entitlements.usage.iter().all(|usage| usage.reached));
    }

    #[test]
    fn lists_every_plan_in_tier_order() {
        let ids: Vec<PlanId> = usecase(MockSubscriptionRepository::new())
            .list_plans()
            .into_iter()
            .map(|plan| plan.id)
            .collect();
        assert_eq!(ids, PlanId::ALL.to_vec());
    }
}
