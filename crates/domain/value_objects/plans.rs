use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::value_objects::enums::{plan_ids::PlanId, resource_kinds::ResourceKind};

/// Plan a tenant is downgraded to whenever its stored plan cannot be resolved.
pub const FALLBACK_PLAN_ID: PlanId = PlanId::Trial;

/// Ceiling for one resource kind. Serialized as `{"kind":"limited","value":n}` or
/// `{"kind":"unbounded"}` so clients never see a numeric stand-in for infinity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ResourceLimit {
    Limited(u32),
    Unbounded,
}

impl ResourceLimit {
    /// `count == limit` already counts as reached: no further additions are allowed.
    pub fn is_reached(&self, current_count: u64) -> bool {
        match self {
            ResourceLimit::Limited(max) => current_count >= u64::from(*max),
            ResourceLimit::Unbounded => false,
        }
    }

    pub fn as_finite(&self) -> Option<u32> {
        match self {
            ResourceLimit::Limited(max) => Some(*max),
            ResourceLimit::Unbounded => None,
        }
    }
}

/// One field per resource kind, so a plan cannot leave a kind undefined.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlanLimits {
    pub classes: ResourceLimit,
    pub students: ResourceLimit,
    pub teachers: ResourceLimit,
}

impl PlanLimits {
    pub const fn limited(classes: u32, students: u32, teachers: u32) -> Self {
        Self {
            classes: ResourceLimit::Limited(classes),
            students: ResourceLimit::Limited(students),
            teachers: ResourceLimit::Limited(teachers),
        }
    }

    pub const fn unbounded() -> Self {
        Self {
            classes: ResourceLimit::Unbounded,
            students: ResourceLimit::Unbounded,
            teachers: ResourceLimit::Unbounded,
        }
    }

    pub fn get(&self, kind: ResourceKind) -> ResourceLimit {
        match kind {
            ResourceKind::Classes => self.classes,
            ResourceKind::Students => self.students,
            ResourceKind::Teachers => self.teachers,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Plan {
    pub id: PlanId,
    pub name: &'static str,
    pub price_minor: i32,
    pub duration_days: i32,
    pub limits: PlanLimits,
    pub features: &'static [&'static str],
}

impl Plan {
    pub fn has_feature(&self, feature: &str) -> bool {
        self.features.iter().any(|enabled| *enabled == feature)
    }

    pub fn limit(&self, kind: ResourceKind) -> ResourceLimit {
        self.limits.get(kind)
    }
}

pub mod features {
    pub const HOMEWORK: &str = "homework";
    pub const NOTICES: &str = "notices";
    pub const ATTENDANCE: &str = "attendance";
    pub const TIMETABLE: &str = "timetable";
    pub const FEE_GATEWAY: &str = "fee_gateway";
    pub const MARKS: &str = "marks";
    pub const REPORT_CARDS: &str = "report_cards";
    pub const ANALYTICS: &str = "analytics";
    pub const BRANDING: &str = "branding";
    pub const BACKUPS: &str = "backups";
    pub const PRIORITY_SUPPORT: &str = "priority_support";
}

use features::*;

static PLANS: [Plan; 4] = [
    Plan {
        id: PlanId::Trial,
        name: "Trial",
        price_minor: 0,
        duration_days: 14,
        limits: PlanLimits::limited(5, 50, 5),
        features: &[HOMEWORK, NOTICES, ATTENDANCE],
    },
    Plan {
        id: PlanId::Basic,
        name: "Basic",
        price_minor: 49_900,
        duration_days: 30,
        limits: PlanLimits::limited(10, 300, 20),
        features: &[HOMEWORK, NOTICES, ATTENDANCE, TIMETABLE, FEE_GATEWAY],
    },
    Plan {
        id: PlanId::Standard,
        name: "Standard",
        price_minor: 99_900,
        duration_days: 30,
        limits: PlanLimits::limited(18, 1000, 60),
        features: &[
            HOMEWORK,
            NOTICES,
            ATTENDANCE,
            TIMETABLE,
            FEE_GATEWAY,
            MARKS,
            REPORT_CARDS,
            ANALYTICS,
        ],
    },
    Plan {
        id: PlanId::Premium,
        name: "Premium",
        price_minor: 199_900,
        duration_days: 30,
        limits: PlanLimits::unbounded(),
        features: &[
            HOMEWORK,
            NOTICES,
            ATTENDANCE,
            TIMETABLE,
            FEE_GATEWAY,
            MARKS,
            REPORT_CARDS,
            ANALYTICS,
            BRANDING,
            BACKUPS,
            PRIORITY_SUPPORT,
        ],
    },
];

pub fn get_plan(plan_id: PlanId) -> &'static Plan {
    match plan_id {
        PlanId::Trial => &PLANS[0],
        PlanId::Basic => &PLANS[1],
        PlanId::Standard => &PLANS[2],
        PlanId::Premium => &PLANS[3],
    }
}

/// Resolves a raw stored plan identifier. Anything unrecognised lands on the trial plan.
pub fn resolve_plan(raw_plan_id: Option<&str>) -> &'static Plan {
    match raw_plan_id.and_then(PlanId::from_str) {
        Some(plan_id) => get_plan(plan_id),
        None => {
            warn!(
                raw_plan_id = raw_plan_id.unwrap_or("<missing>"),
                fallback = %FALLBACK_PLAN_ID,
                "plans: unknown plan id, falling back"
            );
            get_plan(FALLBACK_PLAN_ID)
        }
    }
}

pub fn all_plans() -> &'static [Plan] {
    &PLANS
}
