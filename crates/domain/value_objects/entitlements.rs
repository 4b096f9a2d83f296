use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::enums::{
    decision_reasons::{DecisionReason, DenialCategory},
    plan_ids::PlanId,
    resource_kinds::ResourceKind,
};
use crate::domain::value_objects::plans::ResourceLimit;

/// Outcome of a single entitlement check. Produced per request, never stored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct EntitlementDecision {
    pub allowed: bool,
    pub reason: DecisionReason,
}

impl EntitlementDecision {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            reason: DecisionReason::Ok,
        }
    }

    pub fn deny(reason: DecisionReason) -> Self {
        Self {
            allowed: false,
            reason,
        }
    }

    pub fn category(&self) -> Option<DenialCategory> {
        self.reason.category()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ResourceUsageDto {
    pub resource: ResourceKind,
    pub limit: ResourceLimit,
    pub used: u64,
    pub reached: bool,
}

/// Everything a client needs to mirror gating locally. The server copy stays authoritative.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EntitlementsDto {
    pub plan_id: PlanId,
    pub plan_name: &'static str,
    pub expiry_date: Option<DateTime<Utc>>,
    pub expired: bool,
    pub features: Vec<&'static str>,
    pub usage: Vec<ResourceUsageDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EntitlementCheckRequest {
    #[serde(default)]
    pub feature: Option<String>,
    #[serde(default)]
    pub resource: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EntitlementCheckResponse {
    pub allowed: bool,
    pub reason: DecisionReason,
    pub category: Option<DenialCategory>,
}

impl From<EntitlementDecision> for EntitlementCheckResponse {
    fn from(value: EntitlementDecision) -> Self {
        Self {
            allowed: value.allowed,
            reason: value.reason,
            category: value.category(),
        }
    }
}
