use axum::{body::to_bytes, response::Response};
use uuid::Uuid;

use crate::auth::{AuthUser, ROLE_SUPER_ADMIN};

pub(crate) async fn json_body(response: Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub(crate) fn school_staff(school_id: Uuid) -> AuthUser {
    AuthUser {
        user_id: Uuid::new_v4(),
        school_id: Some(school_id),
        role: "school_admin".to_string(),
    }
}

pub(crate) fn super_admin() -> AuthUser {
    AuthUser {
        user_id: Uuid::new_v4(),
        school_id: None,
        role: ROLE_SUPER_ADMIN.to_string(),
    }
}
