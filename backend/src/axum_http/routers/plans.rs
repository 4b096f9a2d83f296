use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::get};
use schoolhub::{
    domain::{
        repositories::{subscriptions::SubscriptionRepository, usage::UsageRepository},
        value_objects::subscriptions::PlanDto,
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{subscriptions::SubscriptionPostgres, usage::UsagePostgres},
    },
};
use tracing::info;

use crate::{
    auth::AuthUser, config::config_model::DotEnvyConfig,
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
        .route("/", get(list_plans::<SubscriptionPostgres, UsagePostgres>))
        .with_state(Arc::new(usecase))
}

pub async fn list_plans<S, U>(
    State(usecase): State<Arc<SubscriptionUseCase<S, U>>>,
    AuthUser { user_id, .. }: AuthUser,
) -> Json<Vec<PlanDto>>
where
    S: SubscriptionRepository + Send + Sync + 'static,
    U: UsageRepository + Send + Sync + 'static,
{
    info!(%user_id, "plans: listing catalog");
    Json(usecase.list_plans())
}
