use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{post, put},
};
use schoolhub::{
    domain::{
        repositories::{subscriptions::SubscriptionRepository, usage::UsageRepository},
        value_objects::subscriptions::{
            ConfirmPaymentModel, PaymentOutcome, RegisterSchoolModel, SubscriptionModel,
            UpdatePlanModel,
        },
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{subscriptions::SubscriptionPostgres, usage::UsagePostgres},
    },
};
use tracing::warn;
use uuid::Uuid;

use crate::{
    auth::AuthUser, axum_http::error_responses::AppError, config::config_model::DotEnvyConfig,
    usecases::subscriptions::SubscriptionUseCase,
};

pub fn routes(db_pool: Arc<PgPoolSquad>, config: Arc<DotEnvyConfig>) -> Router {
    let subscription_repository = SubscriptionPostgres::new(Arc::clone(&db_pool));
    let usage_repository = UsagePostgres::new(Arc::clone(&db_pool));
    let usecase = SubscriptionUseCase::new(
        Arc::new(subscription_repository),
        Arc::new(usage_repository),
        config.billing.trial_days,
    );

    Router::new()
        .route(
            "/",
            post(register_school::<SubscriptionPostgres, UsagePostgres>),
        )
        .route(
            "/:school_id/plan",
            put(update_plan::<SubscriptionPostgres, UsagePostgres>),
        )
        .route(
            "/:school_id/payments",
            post(confirm_payment::<SubscriptionPostgres, UsagePostgres>),
        )
        .with_state(Arc::new(usecase))
}

pub async fn register_school<S, U>(
    State(usecase): State<Arc<SubscriptionUseCase<S, U>>>,
    auth: AuthUser,
    Json(register_school_model): Json<RegisterSchoolModel>,
) -> Result<(StatusCode, Json<SubscriptionModel>), AppError>
where
    S: SubscriptionRepository + Send + Sync + 'static,
    U: UsageRepository + Send + Sync + 'static,
{
    require_super_admin(&auth)?;

    let subscription = usecase
        .register_school(&register_school_model.name)
        .await?;
    Ok((StatusCode::CREATED, Json(subscription)))
}

pub async fn update_plan<S, U>(
    State(usecase): State<Arc<SubscriptionUseCase<S, U>>>,
    auth: AuthUser,
    Path(school_id): Path<Uuid>,
    Json(update_plan_model): Json<UpdatePlanModel>,
) -> Result<Json<SubscriptionModel>, AppError>
where
    S: SubscriptionRepository + Send + Sync + 'static,
    U: UsageRepository + Send + Sync + 'static,
{
    require_super_admin(&auth)?;

    let subscription = usecase
        .update_plan(
            school_id,
            update_plan_model.plan_id,
            update_plan_model.expiry_date,
        )
        .await?;
    Ok(Json(subscription))
}

pub async fn confirm_payment<S, U>(
    State(usecase): State<Arc<SubscriptionUseCase<S, U>>>,
    auth: AuthUser,
    Path(school_id): Path<Uuid>,
    Json(confirm_payment_model): Json<ConfirmPaymentModel>,
) -> Result<Json<PaymentOutcome>, AppError>
where
    S: SubscriptionRepository + Send + Sync + 'static,
    U: UsageRepository + Send + Sync + 'static,
{
    require_super_admin(&auth)?;

    let outcome = usecase
        .confirm_payment(
            school_id,
            confirm_payment_model.plan_id,
            &confirm_payment_model.payment_reference,
        )
        .await?;
    Ok(Json(outcome))
}

fn require_super_admin(auth: &AuthUser) -> Result<(), AppError> {
    if auth.is_super_admin() {
        return Ok(());
    }

    warn!(
        user_id = %auth.user_id,
        role = %auth.role,
        status = StatusCode::FORBIDDEN.as_u16(),
        "admin_schools: non super-admin attempted a school change"
    );
    Err(AppError::Forbidden)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axum_http::test_support::{json_body, school_staff, super_admin};
    use axum::response::IntoResponse;
    use chrono::{Duration, Utc};
    use schoolhub::domain::{
        repositories::{subscriptions::MockSubscriptionRepository, usage::MockUsageRepository},
        value_objects::enums::plan_ids::PlanId,
    };

    type TestUseCase = SubscriptionUseCase<MockSubscriptionRepository, MockUsageRepository>;

    fn state(subscription_repo: MockSubscriptionRepository) -> State<Arc<TestUseCase>> {
        State(Arc::new(SubscriptionUseCase::new(
            Arc::new(subscription_repo),
            Arc::new(MockUsageRepository::new()),
            14,
        )))
    }

    #[tokio::test]
    async fn school_staff_cannot_change_plans() {
        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo.expect_update_plan().times(0);
        let school_id = Uuid::new_v4();

        let response = update_plan(
            state(subscription_repo),
            school_staff(school_id),
            Path(school_id),
            Json(UpdatePlanModel {
                plan_id: PlanId::Premium,
                expiry_date: None,
            }),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = json_body(response).await;
        assert_eq!(body["code"], 403);
        assert_eq!(body["message"], "Forbidden");
    }

    #[tokio::test]
    async fn school_staff_cannot_confirm_payments() {
        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo.expect_apply_payment().times(0);
        let school_id = Uuid::new_v4();

        let response = confirm_payment(
            state(subscription_repo),
            school_staff(school_id),
            Path(school_id),
            Json(ConfirmPaymentModel {
                plan_id: PlanId::Basic,
                payment_reference: "pay_001".to_string(),
            }),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn super_admin_registers_school_on_trial() {
        let school_id = Uuid::new_v4();
        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_create_school()
            .times(1)
            .returning(move |_, trial_expires_at| {
                Box::pin(async move {
                    Ok(SubscriptionModel {
                        school_id,
                        plan_id: PlanId::Trial,
                        expiry_date: Some(trial_expires_at),
                    })
                })
            });

        let response = register_school(
            state(subscription_repo),
            super_admin(),
            Json(RegisterSchoolModel {
                name: "Riverside Primary".to_string(),
            }),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await;
        assert_eq!(body["plan_id"], "trial");
        assert!(!body["expiry_date"].is_null());
    }

    #[tokio::test]
    async fn never_expiring_trial_is_bad_request() {
        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo.expect_update_plan().times(0);
        let school_id = Uuid::new_v4();

        let response = update_plan(
            state(subscription_repo),
            super_admin(),
            Path(school_id),
            Json(UpdatePlanModel {
                plan_id: PlanId::Trial,
                expiry_date: None,
            }),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["message"], "a trial plan needs an expiry date");
    }

    #[tokio::test]
    async fn super_admin_payment_returns_outcome() {
        let school_id = Uuid::new_v4();
        let expiry_date = Utc::now() + Duration::days(30);
        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_apply_payment()
            .times(1)
            .returning(move |school_id, plan_id, _, _| {
                Box::pin(async move {
                    Ok(Some(PaymentOutcome {
                        subscription: SubscriptionModel {
                            school_id,
                            plan_id,
                            expiry_date: Some(expiry_date),
                        },
                        applied: true,
                    }))
                })
            });

        let response = confirm_payment(
            state(subscription_repo),
            super_admin(),
            Path(school_id),
            Json(ConfirmPaymentModel {
                plan_id: PlanId::Basic,
                payment_reference: "pay_001".to_string(),
            }),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["applied"], true);
        assert_eq!(body["subscription"]["plan_id"], "basic");
    }
}
