//! PostgreSQL-backed `CourseRepository` implementation.
//!
//! Chapters are stored as one JSONB array per course. Owner lookups by
//! chapter or episode id use JSONB containment (`@>`), which the GIN index
//! on `courses.chapters` serves. Edits lock the course row with
//! `SELECT ... FOR UPDATE` inside a transaction.

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::AsyncConnection as _;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use serde_json::json;
use tracing::warn;
use uuid::Uuid;

use super::diesel_error_mapping::{like_pattern, map_diesel_error, map_pool_error, search_term};
use super::models::CourseRow;
use super::pool::{DbPool, PoolError};
use super::schema::courses;
use crate::domain::Course;
use crate::domain::ports::{CourseEdit, CourseRepository, CourseRepositoryError, CourseRevision};

/// Diesel-backed course repository.
#[derive(Clone)]
pub struct DieselCourseRepository {
    pool: DbPool,
}

impl DieselCourseRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn first(
        &self,
        query: courses::BoxedQuery<'static, Pg>,
    ) -> Result<Option<Course>, CourseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        query
            .select(CourseRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?
            .map(to_domain)
            .transpose()
    }
}

fn map_pool(error: PoolError) -> CourseRepositoryError {
    map_pool_error(error, CourseRepositoryError::connection)
}

fn map_diesel(error: DieselError) -> CourseRepositoryError {
    map_diesel_error(
        &error,
        CourseRepositoryError::query,
        CourseRepositoryError::connection,
    )
}

/// Failure inside the locked edit transaction.
enum ModifyError {
    Diesel(DieselError),
    Repository(CourseRepositoryError),
}

impl From<DieselError> for ModifyError {
    fn from(error: DieselError) -> Self {
        Self::Diesel(error)
    }
}

impl From<CourseRepositoryError> for ModifyError {
    fn from(error: CourseRepositoryError) -> Self {
        Self::Repository(error)
    }
}

impl From<ModifyError> for CourseRepositoryError {
    fn from(error: ModifyError) -> Self {
        match error {
            ModifyError::Diesel(error) => map_diesel(error),
            ModifyError::Repository(error) => error,
        }
    }
}

fn to_domain(row: CourseRow) -> Result<Course, CourseRepositoryError> {
    Course::try_from(row).map_err(|err| {
        warn!(error = %err, "course row failed to decode");
        CourseRepositoryError::corrupt(err.to_string())
    })
}

fn to_row(course: &Course) -> Result<CourseRow, CourseRepositoryError> {
    CourseRow::try_from(course).map_err(|err| CourseRepositoryError::corrupt(err.to_string()))
}

#[async_trait]
impl CourseRepository for DieselCourseRepository {
    async fn list(&self, search: Option<String>) -> Result<Vec<Course>, CourseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let mut query = courses::table
            .select(CourseRow::as_select())
            .order(courses::created_at.desc())
            .into_boxed();
        if let Some(term) = search_term(search) {
            let pattern = like_pattern(&term);
            query = query.filter(
                courses::title
                    .ilike(pattern.clone())
                    .or(courses::short_desc.ilike(pattern.clone()))
                    .or(courses::full_desc.ilike(pattern)),
            );
        }
        query
            .load(&mut conn)
            .await
            .map_err(map_diesel)?
            .into_iter()
            .map(to_domain)
            .collect()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Course>, CourseRepositoryError> {
        self.first(courses::table.filter(courses::id.eq(id)).into_boxed())
            .await
    }

    async fn find_by_chapter(
        &self,
        chapter_id: Uuid,
    ) -> Result<Option<Course>, CourseRepositoryError> {
        let needle = json!([{ "id": chapter_id }]);
        self.first(courses::table.filter(courses::chapters.contains(needle)).into_boxed())
            .await
    }

    async fn find_by_episode(
        &self,
        episode_id: Uuid,
    ) -> Result<Option<Course>, CourseRepositoryError> {
        let needle = json!([{ "episodes": [{ "id": episode_id }] }]);
        self.first(courses::table.filter(courses::chapters.contains(needle)).into_boxed())
            .await
    }

    async fn insert(&self, course: &Course) -> Result<(), CourseRepositoryError> {
        let row = to_row(course)?;
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        diesel::insert_into(courses::table)
            .values(row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel)
    }

    async fn modify(
        &self,
        id: Uuid,
        edit: CourseEdit,
    ) -> Result<CourseRevision, CourseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let revision = conn
            .transaction::<_, ModifyError, _>(|conn| {
                async move {
                    let Some(row) = courses::table
                        .find(id)
                        .select(CourseRow::as_select())
                        .for_update()
                        .first(conn)
                        .await
                        .optional()?
                    else {
                        return Ok(CourseRevision::Missing);
                    };
                    let before = to_domain(row)?;
                    let mut after = before.clone();
                    if !edit(&mut after) {
                        return Ok(CourseRevision::Rejected(before));
                    }
                    diesel::update(courses::table.find(id))
                        .set(&to_row(&after)?)
                        .execute(conn)
                        .await?;
                    Ok(CourseRevision::Saved { before, after })
                }
                .scope_boxed()
            })
            .await?;
        Ok(revision)
    }
}
