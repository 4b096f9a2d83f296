use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::usecases::{
    classes::ClassError, entitlement_guard::EntitlementError, subscriptions::SubscriptionError,
};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
}

/// Denials carry a machine reason plus the display bucket the UI keys its upsell on.
#[derive(Debug, Serialize)]
pub struct EntitlementErrorResponse {
    pub code: u16,
    pub reason: String,
    pub category: String,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Forbidden")]
    Forbidden,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Forbidden => (StatusCode::FORBIDDEN, self.to_string()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal(_) => {
                // Don't leak internal error detail to client
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            code: status.as_u16(),
            message,
        });

        (status, body).into_response()
    }
}

impl From<SubscriptionError> for AppError {
    fn from(err: SubscriptionError) -> Self {
        match err {
            SubscriptionError::SchoolNotFound => AppError::NotFound(err.to_string()),
            SubscriptionError::InvalidRequest(msg) => AppError::BadRequest(msg),
            SubscriptionError::Internal(inner) => AppError::Internal(inner),
        }
    }
}

impl IntoResponse for EntitlementError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            EntitlementError::Denied {
                reason,
                category,
                detail,
            } => {
                let body = Json(EntitlementErrorResponse {
                    code: status.as_u16(),
                    reason: reason.to_string(),
                    category: category.to_string(),
                    message: detail,
                });
                (status, body).into_response()
            }
            EntitlementError::SchoolNotFound => {
                AppError::NotFound("school not found".to_string()).into_response()
            }
            EntitlementError::Internal(inner) => AppError::Internal(inner).into_response(),
        }
    }
}

impl IntoResponse for ClassError {
    fn into_response(self) -> Response {
        match self {
            ClassError::EmptyName => AppError::BadRequest(self.to_string()).into_response(),
            ClassError::Entitlement(err) => err.into_response(),
            ClassError::Internal(inner) => AppError::Internal(inner).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axum_http::test_support::json_body;
    use schoolhub::domain::value_objects::enums::decision_reasons::{
        DecisionReason, DenialCategory,
    };

    #[tokio::test]
    async fn expired_denial_is_payment_required_with_expired_category() {
        let response = EntitlementError::Denied {
            reason: DecisionReason::ExpiredPlan,
            category: DenialCategory::Expired,
            detail: "plan expired".to_string(),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
        let body = json_body(response).await;
        assert_eq!(body["code"], 402);
        assert_eq!(body["reason"], "expired_plan");
        assert_eq!(body["category"], "expired");
        assert_eq!(body["message"], "plan expired");
    }

    #[tokio::test]
    async fn limit_denial_is_forbidden_with_limit_category() {
        let response = EntitlementError::Denied {
            reason: DecisionReason::ResourceLimitReached,
            category: DenialCategory::Limit,
            detail: "students limit reached: current=50 max=50".to_string(),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = json_body(response).await;
        assert_eq!(body["code"], 403);
        assert_eq!(body["reason"], "resource_limit_reached");
        assert_eq!(body["category"], "limit");
        assert_eq!(body["message"], "students limit reached: current=50 max=50");
    }

    #[tokio::test]
    async fn feature_denial_uses_limit_category() {
        let response = EntitlementError::Denied {
            reason: DecisionReason::FeatureNotInPlan,
            category: DenialCategory::Limit,
            detail: "feature `branding` is not available".to_string(),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = json_body(response).await;
        assert_eq!(body["reason"], "feature_not_in_plan");
        assert_eq!(body["category"], "limit");
    }

    #[tokio::test]
    async fn internal_errors_are_opaque() {
        let response = AppError::Internal(anyhow::anyhow!("password=hunter2")).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["message"], "Internal server error");
    }

    #[test]
    fn missing_school_maps_to_not_found() {
        let app_error = AppError::from(SubscriptionError::SchoolNotFound);
        assert_eq!(app_error.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn invalid_subscription_request_maps_to_bad_request() {
        let app_error = AppError::from(SubscriptionError::InvalidRequest("nope".to_string()));
        assert_eq!(app_error.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
