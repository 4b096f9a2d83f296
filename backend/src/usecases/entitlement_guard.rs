use std::sync::Arc;

use chrono::Utc;
use schoolhub::domain::{
    repositories::{subscriptions::SubscriptionRepository, usage::UsageRepository},
    value_objects::{
        entitlements::EntitlementDecision,
        enums::{
            decision_reasons::{DecisionReason, DenialCategory},
            resource_kinds::ResourceKind,
        },
        subscriptions::SubscriptionModel,
    },
};
use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::usecases::entitlement_evaluator::EntitlementEvaluator;

#[derive(Debug, Error)]
pub enum EntitlementError {
    #[error("{detail}")]
    Denied {
        reason: DecisionReason,
        category: DenialCategory,
        detail: String,
    },
    #[error("school not found")]
    SchoolNotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl EntitlementError {
    fn denied(decision: EntitlementDecision, detail: String) -> Self {
        EntitlementError::Denied {
            reason: decision.reason,
            category: decision.category().unwrap_or(DenialCategory::Limit),
            detail,
        }
    }

    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            EntitlementError::Denied {
                category: DenialCategory::Expired,
                ..
            } => StatusCode::PAYMENT_REQUIRED,
            EntitlementError::Denied { .. } => StatusCode::FORBIDDEN,
            EntitlementError::SchoolNotFound => StatusCode::NOT_FOUND,
            EntitlementError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type GuardResult<T> = std::result::Result<T, EntitlementError>;

/// Runs before every tenant write that is subject to plan entitlements.
///
/// The usage count is read fresh on each call, without a per-school lock, so two
/// creations racing at `limit - 1` can both pass.
pub struct EntitlementGuard<S, U>
where
    S: SubscriptionRepository + Send + Sync + 'static,
    U: UsageRepository + Send + Sync + 'static,
{
    subscription_repo: Arc<S>,
    usage_repo: Arc<U>,
}

impl<S, U> EntitlementGuard<S, U>
where
    S: SubscriptionRepository + Send + Sync + 'static,
    U: UsageRepository + Send + Sync + 'static,
{
    pub fn new(subscription_repo: Arc<S>, usage_repo: Arc<U>) -> Self {
        Self {
            subscription_repo,
            usage_repo,
        }
    }

    pub async fn ensure_feature(&self, school_id: Uuid, feature: &str) -> GuardResult<()> {
        let subscription = self.load_subscription(school_id).await?;
        let decision =
            EntitlementEvaluator::new(&subscription, Utc::now()).evaluate_feature(feature);

        if !decision.allowed {
            let err = EntitlementError::denied(
                decision,
                format!("feature `{feature}` is not available: {}", decision.reason),
            );
            warn!(
                %school_id,
                plan_id = %subscription.plan_id,
                feature,
                reason = %decision.reason,
                status = err.status_code().as_u16(),
                "entitlements: feature denied"
            );
            return Err(err);
        }

        debug!(%school_id, feature, "entitlements: feature allowed");
        Ok(())
    }

    /// Checks that one more `kind` may be created, plus `required_feature` if given.
    pub async fn ensure_can_create(
        &self,
        school_id: Uuid,
        kind: ResourceKind,
        required_feature: Option<&str>,
    ) -> GuardResult<()> {
        let subscription = self.load_subscription(school_id).await?;
        let evaluator = EntitlementEvaluator::new(&subscription, Utc::now());

        // Expired tenants are denied outright; skip the count query.
        if evaluator.is_expired() {
            let decision = EntitlementDecision::deny(DecisionReason::ExpiredPlan);
            warn!(
                %school_id,
                plan_id = %subscription.plan_id,
                resource = %kind,
                status = axum::http::StatusCode::PAYMENT_REQUIRED.as_u16(),
                "entitlements: plan expired, creation denied"
            );
            return Err(EntitlementError::denied(
                decision,
                "plan expired: renew to continue".to_string(),
            ));
        }

        let current = self.count(school_id, kind).await?;

        let decision = evaluator.evaluate_creation(kind, current, required_feature);
        if !decision.allowed {
            let limit = evaluator.plan().limit(kind).as_finite();
            warn!(
                %school_id,
                plan_id = %subscription.plan_id,
                resource = %kind,
                current,
                ?limit,
                required_feature,
                reason = %decision.reason,
                "entitlements: creation denied"
            );
            let detail = match decision.reason {
                DecisionReason::FeatureNotInPlan => format!(
                    "feature `{}` is not available on the {} plan",
                    required_feature.unwrap_or_default(),
                    subscription.plan_id
                ),
                _ => format!(
                    "{kind} limit reached: current={current} max={}",
                    limit
                        .map(|max| max.to_string())
                        .unwrap_or_else(|| "unbounded".to_string())
                ),
            };
            return Err(EntitlementError::denied(decision, detail));
        }

        info!(
            %school_id,
            plan_id = %subscription.plan_id,
            resource = %kind,
            current,
            "entitlements: creation allowed"
        );
        Ok(())
    }

    /// Read-only decision for UI gating; nothing is rejected. `raw_resource` is
    /// client input, so unknown kinds take the fail-closed path.
    pub async fn check(
        &self,
        school_id: Uuid,
        feature: Option<&str>,
        raw_resource: Option<&str>,
    ) -> GuardResult<EntitlementDecision> {
        let subscription = self.load_subscription(school_id).await?;
        let evaluator = EntitlementEvaluator::new(&subscription, Utc::now());

        if evaluator.is_expired() {
            return Ok(EntitlementDecision::deny(DecisionReason::ExpiredPlan));
        }

        if let Some(feature) = feature {
            let decision = evaluator.evaluate_feature(feature);
            if !decision.allowed {
                return Ok(decision);
            }
        }

        if let Some(raw_kind) = raw_resource {
            let current = match ResourceKind::from_str(raw_kind) {
                Some(kind) => self.count(school_id, kind).await?,
                None => 0,
            };
            if evaluator.is_limit_reached_by_name(raw_kind, current) {
                return Ok(EntitlementDecision::deny(
                    DecisionReason::ResourceLimitReached,
                ));
            }
        }

        Ok(EntitlementDecision::allow())
    }

    async fn count(&self, school_id: Uuid, kind: ResourceKind) -> GuardResult<u64> {
        self.usage_repo
            .count_resources(school_id, kind)
            .await
            .map_err(|err| {
                error!(
                    %school_id,
                    resource = %kind,
                    db_error = ?err,
                    "entitlements: failed to count resources"
                );
                EntitlementError::Internal(err)
            })
    }

    async fn load_subscription(&self, school_id: Uuid) -> GuardResult<SubscriptionModel> {
        self.subscription_repo
            .find_by_school_id(school_id)
            .await
            .map_err(|err| {
                error!(
                    %school_id,
                    db_error = ?err,
                    "entitlements: failed to load subscription"
                );
                EntitlementError::Internal(err)
            })?
            .ok_or_else(|| {
                warn!(%school_id, "entitlements: school not found");
                EntitlementError::SchoolNotFound
            })
    }
}
