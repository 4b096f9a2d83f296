use std::sync::Arc;

use schoolhub::domain::{
    repositories::{
        classes::ClassRepository, subscriptions::SubscriptionRepository, usage::UsageRepository,
    },
    value_objects::{classes::ClassModel, enums::resource_kinds::ResourceKind},
};
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use crate::usecases::entitlement_guard::{EntitlementError, EntitlementGuard};

#[derive(Debug, Error)]
pub enum ClassError {
    #[error("class name is required")]
    EmptyName,
    #[error(transparent)]
    Entitlement(#[from] EntitlementError),
    #[error(transparent)]
    Internal(anyhow::Error),
}

impl ClassError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            ClassError::EmptyName => StatusCode::BAD_REQUEST,
            ClassError::Entitlement(err) => err.status_code(),
            ClassError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub struct ClassUseCase<S, U, C>
where
    S: SubscriptionRepository + Send + Sync + 'static,
    U: UsageRepository + Send + Sync + 'static,
    C: ClassRepository + Send + Sync + 'static,
{
    guard: EntitlementGuard<S, U>,
    class_repo: Arc<C>,
}

impl<S, U, C> ClassUseCase<S, U, C>
where
    S: SubscriptionRepository + Send + Sync + 'static,
    U: UsageRepository + Send + Sync + 'static,
    C: ClassRepository + Send + Sync + 'static,
{
    pub fn new(guard: EntitlementGuard<S, U>, class_repo: Arc<C>) -> Self {
        Self { guard, class_repo }
    }

    /// Plan-gated write: nothing is inserted unless the guard lets one more class in.
    pub async fn create_class(
        &self,
        school_id: Uuid,
        name: &str,
    ) -> Result<ClassModel, ClassError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ClassError::EmptyName);
        }

        self.guard
            .ensure_can_create(school_id, ResourceKind::Classes, None)
            .await?;

        let class = self
            .class_repo
            .create_class(school_id, name)
            .await
            .map_err(|err| {
                error!(%school_id, db_error = ?err, "classes: failed to create class");
                ClassError::Internal(err)
            })?;

        info!(%school_id, class_id = %class.id, "classes: class created");
        Ok(class)
    }
}
