//! PostgreSQL-backed `ProjectRepository` implementation.
//!
//! Every lookup and mutation filters on the owner column.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::ProjectRow;
use super::pool::{DbPool, PoolError};
use super::schema::projects;
use crate::domain::ports::{ProjectRepository, ProjectRepositoryError};
use crate::domain::{Project, UserId};

/// Diesel-backed project repository.
#[derive(Clone)]
pub struct DieselProjectRepository {
    pool: DbPool,
}

impl DieselProjectRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool(error: PoolError) -> ProjectRepositoryError {
    map_pool_error(error, ProjectRepositoryError::connection)
}

fn map_diesel(error: DieselError) -> ProjectRepositoryError {
    map_diesel_error(
        &error,
        ProjectRepositoryError::query,
        ProjectRepositoryError::connection,
    )
}

#[async_trait]
impl ProjectRepository for DieselProjectRepository {
    async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<Project>, ProjectRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let rows: Vec<ProjectRow> = projects::table
            .filter(projects::owner.eq(owner.as_uuid()))
            .select(ProjectRow::as_select())
            .order(projects::created_at.desc())
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;
        Ok(rows.into_iter().map(Project::from).collect())
    }

    async fn find_owned(
        &self,
        owner: &UserId,
        id: Uuid,
    ) -> Result<Option<Project>, ProjectRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        projects::table
            .filter(projects::id.eq(id).and(projects::owner.eq(owner.as_uuid())))
            .select(ProjectRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map(|row| row.map(Project::from))
            .map_err(map_diesel)
    }

    async fn insert(&self, project: &Project) -> Result<(), ProjectRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        diesel::insert_into(projects::table)
            .values(ProjectRow::from(project))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel)
    }

    async fn update(&self, project: &Project) -> Result<bool, ProjectRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        diesel::update(
            projects::table.filter(
                projects::id
                    .eq(project.id)
                    .and(projects::owner.eq(project.owner.as_uuid())),
            ),
        )
        .set(&ProjectRow::from(project))
        .execute(&mut conn)
        .await
        .map(|count| count > 0)
        .map_err(map_diesel)
    }

    async fn delete_owned(&self, owner: &UserId, id: Uuid) -> Result<bool, ProjectRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        diesel::delete(
            projects::table.filter(projects::id.eq(id).and(projects::owner.eq(owner.as_uuid()))),
        )
        .execute(&mut conn)
        .await
        .map(|count| count > 0)
        .map_err(map_diesel)
    }
}
