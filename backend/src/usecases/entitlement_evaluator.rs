use chrono::{DateTime, Utc};
use schoolhub::domain::value_objects::{
    entitlements::EntitlementDecision,
    enums::{decision_reasons::DecisionReason, resource_kinds::ResourceKind},
    plans::{Plan, get_plan},
    subscriptions::SubscriptionModel,
};
use tracing::error;

/// Decides what a school may do at a given instant.
///
/// Holds no state beyond the borrowed subscription and the clock reading, and
/// never fails: every question gets an answer. Expiry outranks the plan, so an
/// expired premium school is denied exactly like an expired trial.
pub struct EntitlementEvaluator<'a> {
    subscription: &'a SubscriptionModel,
    plan: &'static Plan,
    now: DateTime<Utc>,
}

impl<'a> EntitlementEvaluator<'a> {
    pub fn new(subscription: &'a SubscriptionModel, now: DateTime<Utc>) -> Self {
        Self {
            subscription,
            plan: get_plan(subscription.plan_id),
            now,
        }
    }

    pub fn plan(&self) -> &'static Plan {
        self.plan
    }

    /// Strictly-before: a subscription expiring exactly now is still valid.
    pub fn is_expired(&self) -> bool {
        self.subscription
            .expiry_date
            .is_some_and(|expiry_date| expiry_date < self.now)
    }

    pub fn check_access(&self, feature: &str) -> bool {
        self.evaluate_feature(feature).allowed
    }

    pub fn is_limit_reached(&self, kind: ResourceKind, current_count: u64) -> bool {
        !self.evaluate_resource(kind, current_count).allowed
    }

    /// String-keyed variant for callers holding raw input. An unrecognised kind is
    /// a caller defect and is reported as reached so it can never bypass a ceiling.
    pub fn is_limit_reached_by_name(&self, raw_kind: &str, current_count: u64) -> bool {
        match ResourceKind::from_str(raw_kind) {
            Some(kind) => self.is_limit_reached(kind, current_count),
            None => {
                error!(
                    school_id = %self.subscription.school_id,
                    raw_kind,
                    "entitlements: unknown resource kind, denying"
                );
                true
            }
        }
    }

    pub fn evaluate_feature(&self, feature: &str) -> EntitlementDecision {
        if self.is_expired() {
            return EntitlementDecision::deny(DecisionReason::ExpiredPlan);
        }

        if self.plan.has_feature(feature) {
            EntitlementDecision::allow()
        } else {
            EntitlementDecision::deny(DecisionReason::FeatureNotInPlan)
        }
    }

    pub fn evaluate_resource(&self, kind: ResourceKind, current_count: u64) -> EntitlementDecision {
        if self.is_expired() {
            return EntitlementDecision::deny(DecisionReason::ExpiredPlan);
        }

        if self.plan.limit(kind).is_reached(current_count) {
            EntitlementDecision::deny(DecisionReason::ResourceLimitReached)
        } else {
            EntitlementDecision::allow()
        }
    }

    /// Guard for an operation that adds one `kind` and may also need a feature.
    /// Both checks must pass.
    pub fn evaluate_creation(
        &self,
        kind: ResourceKind,
        current_count: u64,
        required_feature: Option<&str>,
    ) -> EntitlementDecision {
        if self.is_expired() {
            return EntitlementDecision::deny(DecisionReason::ExpiredPlan);
        }

        if let Some(feature) = required_feature {
            let decision = self.evaluate_feature(feature);
            if !decision.allowed {
                return decision;
            }
        }

        self.evaluate_resource(kind, current_count)
    }
}
