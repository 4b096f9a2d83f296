use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Countable tenant resources that carry a per-plan ceiling.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Classes,
    Students,
    Teachers,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 3] = [
        ResourceKind::Classes,
        ResourceKind::Students,
        ResourceKind::Teachers,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Classes => "classes",
            ResourceKind::Students => "students",
            ResourceKind::Teachers => "teachers",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "classes" => Some(ResourceKind::Classes),
            "students" => Some(ResourceKind::Students),
            "teachers" => Some(ResourceKind::Teachers),
            _ => None,
        }
    }
}

impl Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
