use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Why an entitlement decision came out the way it did.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DecisionReason {
    Ok,
    ExpiredPlan,
    FeatureNotInPlan,
    ResourceLimitReached,
}

/// User-facing bucket a denial is shown under. Both buckets lead to an upgrade path.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DenialCategory {
    Limit,
    Expired,
}

impl DecisionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionReason::Ok => "ok",
            DecisionReason::ExpiredPlan => "expired_plan",
            DecisionReason::FeatureNotInPlan => "feature_not_in_plan",
            DecisionReason::ResourceLimitReached => "resource_limit_reached",
        }
    }

    /// `None` for [`DecisionReason::Ok`]; every denial maps to a category.
    pub fn category(&self) -> Option<DenialCategory> {
        match self {
            DecisionReason::Ok => None,
            DecisionReason::ExpiredPlan => Some(DenialCategory::Expired),
            DecisionReason::FeatureNotInPlan | DecisionReason::ResourceLimitReached => {
                Some(DenialCategory::Limit)
            }
        }
    }
}

impl DenialCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            DenialCategory::Limit => "limit",
            DenialCategory::Expired => "expired",
        }
    }
}

impl Display for DecisionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Display for DenialCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
