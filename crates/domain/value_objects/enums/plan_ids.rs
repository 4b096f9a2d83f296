use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Subscription tier of a school. Ordered from most to least restrictive.
#[derive(
    Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
#[serde(rename_all = "lowercase")]
pub enum PlanId {
    #[default]
    Trial,
    Basic,
    Standard,
    Premium,
}

impl PlanId {
    pub const ALL: [PlanId; 4] = [
        PlanId::Trial,
        PlanId::Basic,
        PlanId::Standard,
        PlanId::Premium,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlanId::Trial => "trial",
            PlanId::Basic => "basic",
            PlanId::Standard => "standard",
            PlanId::Premium => "premium",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "trial" => Some(PlanId::Trial),
            "basic" => Some(PlanId::Basic),
            "standard" => Some(PlanId::Standard),
            "premium" => Some(PlanId::Premium),
            _ => None,
        }
    }
}

impl Display for PlanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
