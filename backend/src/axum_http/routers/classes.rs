use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use schoolhub::{
    domain::{
        repositories::{
            classes::ClassRepository, subscriptions::SubscriptionRepository,
            usage::UsageRepository,
        },
        value_objects::classes::CreateClassModel,
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{
            classes::ClassPostgres, subscriptions::SubscriptionPostgres, usage::UsagePostgres,
        },
    },
};
use tracing::warn;

use crate::{
    auth::AuthUser,
    axum_http::error_responses::AppError,
    usecases::{classes::ClassUseCase, entitlement_guard::EntitlementGuard},
};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let guard = EntitlementGuard::new(
        Arc::new(SubscriptionPostgres::new(Arc::clone(&db_pool))),
        Arc::new(UsagePostgres::new(Arc::clone(&db_pool))),
    );
    let usecase = ClassUseCase::new(guard, Arc::new(ClassPostgres::new(db_pool)));

    Router::new()
        .route(
            "/",
            post(create_class::<SubscriptionPostgres, UsagePostgres, ClassPostgres>),
        )
        .with_state(Arc::new(usecase))
}

pub async fn create_class<S, U, C>(
    State(usecase): State<Arc<ClassUseCase<S, U, C>>>,
    auth: AuthUser,
    Json(create_class_model): Json<CreateClassModel>,
) -> Response
where
    S: SubscriptionRepository + Send + Sync + 'static,
    U: UsageRepository + Send + Sync + 'static,
    C: ClassRepository + Send + Sync + 'static,
{
    let Some(school_id) = auth.school_id else {
        warn!(user_id = %auth.user_id, "classes: token is not bound to a school");
        return AppError::Forbidden.into_response();
    };

    match usecase
        .create_class(school_id, &create_class_model.name)
        .await
    {
        Ok(class) => (StatusCode::CREATED, Json(class)).into_response(),
        Err(err) => err.into_response(),
    }
}
