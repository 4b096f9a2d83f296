use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::classes::ClassEntity;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClassModel {
    pub id: Uuid,
    pub school_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<ClassEntity> for ClassModel {
    fn from(value: ClassEntity) -> Self {
        Self {
            id: value.id,
            school_id: value.school_id,
            name: value.name,
            created_at: value.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateClassModel {
    pub name: String,
}
