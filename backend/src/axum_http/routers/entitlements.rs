use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use schoolhub::{
    domain::{
        repositories::{subscriptions::SubscriptionRepository, usage::UsageRepository},
        value_objects::entitlements::{
            EntitlementCheckRequest, EntitlementCheckResponse, EntitlementsDto,
        },
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{subscriptions::SubscriptionPostgres, usage::UsagePostgres},
    },
};
use tracing::{info, warn};

use crate::{
    auth::AuthUser,
    axum_http::error_responses::AppError,
    config::config_model::DotEnvyConfig,
    usecases::{entitlement_guard::EntitlementGuard, subscriptions::SubscriptionUseCase},
};

pub struct EntitlementsState<S, U>
where
    S: SubscriptionRepository + Send + Sync + 'static,
    U: UsageRepository + Send + Sync + 'static,
{
    subscriptions: SubscriptionUseCase<S, U>,
    guard: EntitlementGuard<S, U>,
}

pub fn routes(db_pool: Arc<PgPoolSquad>, config: Arc<DotEnvyConfig>) -> Router {
    let subscription_repository = Arc::new(SubscriptionPostgres::new(Arc::clone(&db_pool)));
    let usage_repository = Arc::new(UsagePostgres::new(Arc::clone(&db_pool)));

    let state = EntitlementsState {
        subscriptions: SubscriptionUseCase::new(
            Arc::clone(&subscription_repository),
            Arc::clone(&usage_repository),
            config.billing.trial_days,
        ),
        guard: EntitlementGuard::new(subscription_repository, usage_repository),
    };

    Router::new()
        .route(
            "/",
            get(current_entitlements::<SubscriptionPostgres, UsagePostgres>),
        )
        .route(
            "/check",
            post(check_entitlement::<SubscriptionPostgres, UsagePostgres>),
        )
        .with_state(Arc::new(state))
}

pub async fn current_entitlements<S, U>(
    State(state): State<Arc<EntitlementsState<S, U>>>,
    auth: AuthUser,
) -> Result<Json<EntitlementsDto>, AppError>
where
    S: SubscriptionRepository + Send + Sync + 'static,
    U: UsageRepository + Send + Sync + 'static,
{
    let school_id = require_school(&auth)?;
    info!(%school_id, user_id = %auth.user_id, "entitlements: snapshot requested");

    let entitlements = state.subscriptions.get_entitlements(school_id).await?;
    Ok(Json(entitlements))
}

pub async fn check_entitlement<S, U>(
    State(state): State<Arc<EntitlementsState<S, U>>>,
    auth: AuthUser,
    Json(request): Json<EntitlementCheckRequest>,
) -> Response
where
    S: SubscriptionRepository + Send + Sync + 'static,
    U: UsageRepository + Send + Sync + 'static,
{
    let school_id = match require_school(&auth) {
        Ok(school_id) => school_id,
        Err(err) => return err.into_response(),
    };

    if request.feature.is_none() && request.resource.is_none() {
        return AppError::BadRequest("feature or resource is required".to_string())
            .into_response();
    }

    match state
        .guard
        .check(
            school_id,
            request.feature.as_deref(),
            request.resource.as_deref(),
        )
        .await
    {
        Ok(decision) => Json(EntitlementCheckResponse::from(decision)).into_response(),
        Err(err) => err.into_response(),
    }
}

fn require_school(auth: &AuthUser) -> Result<uuid::Uuid, AppError> {
    auth.school_id.ok_or_else(|| {
        warn!(user_id = %auth.user_id, "entitlements: token is not bound to a school");
        AppError::Forbidden
    })
}
