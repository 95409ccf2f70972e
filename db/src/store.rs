use std::sync::Arc;

use async_trait::async_trait;
use common::error::{AppError, Res};
use sqlx::PgPool;

use crate::{
    developer,
    dtos::developer::{DeveloperFilter, DeveloperUpdate, NewDeveloper},
    models::developer::Developer,
};

/// Storage seam for developer records.
///
/// Every mutation touches a single developer and is atomic on its own; callers
/// get no multi-record transactions.
#[async_trait]
pub trait DeveloperStore: Send + Sync {
    /// Returns the developer matching `filter`, or [`AppError::NotFound`].
    async fn find_one(&self, filter: &DeveloperFilter) -> Res<Developer>;

    /// All developers, oldest first.
    async fn find_all(&self) -> Res<Vec<Developer>>;

    /// Persists a new developer. A duplicate email or token is a permanent
    /// [`AppError::BadRequest`].
    async fn insert(&self, developer: &NewDeveloper) -> Res<Developer>;

    /// Applies `update` to the developer matching `filter` and returns the
    /// updated record, or [`AppError::NotFound`].
    async fn update_fields(
        &self,
        filter: &DeveloperFilter,
        update: &DeveloperUpdate,
    ) -> Res<Developer>;
}

pub(crate) fn not_found() -> AppError {
    AppError::NotFound("Developer not found".to_string())
}

/// Postgres-backed store.
#[derive(Clone)]
pub struct PgDeveloperStore {
    pool: Arc<PgPool>,
}

impl PgDeveloperStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        PgDeveloperStore { pool }
    }
}

#[async_trait]
impl DeveloperStore for PgDeveloperStore {
    async fn find_one(&self, filter: &DeveloperFilter) -> Res<Developer> {
        developer::find_developer(&*self.pool, filter)
            .await?
            .ok_or_else(not_found)
    }

    async fn find_all(&self) -> Res<Vec<Developer>> {
        developer::get_developers(&*self.pool).await
    }

    async fn insert(&self, data: &NewDeveloper) -> Res<Developer> {
        developer::insert_developer(&*self.pool, data).await
    }

    async fn update_fields(
        &self,
        filter: &DeveloperFilter,
        update: &DeveloperUpdate,
    ) -> Res<Developer> {
        developer::update_developer(&*self.pool, filter, update)
            .await?
            .ok_or_else(not_found)
    }
}
