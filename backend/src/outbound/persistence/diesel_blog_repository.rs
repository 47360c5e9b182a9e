//! PostgreSQL-backed `BlogRepository` implementation.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::BlogRow;
use super::pool::{DbPool, PoolError};
use super::schema::blogs;
use crate::domain::Blog;
use crate::domain::ports::{BlogRepository, BlogRepositoryError};

/// Diesel-backed blog repository.
#[derive(Clone)]
pub struct DieselBlogRepository {
    pool: DbPool,
}

impl DieselBlogRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool(error: PoolError) -> BlogRepositoryError {
    map_pool_error(error, BlogRepositoryError::connection)
}

fn map_diesel(error: DieselError) -> BlogRepositoryError {
    map_diesel_error(
        &error,
        BlogRepositoryError::query,
        BlogRepositoryError::connection,
    )
}

#[async_trait]
impl BlogRepository for DieselBlogRepository {
    async fn list(&self) -> Result<Vec<Blog>, BlogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let rows: Vec<BlogRow> = blogs::table
            .select(BlogRow::as_select())
            .order(blogs::created_at.desc())
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;
        Ok(rows.into_iter().map(Blog::from).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Blog>, BlogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        blogs::table
            .find(id)
            .select(BlogRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map(|row| row.map(Blog::from))
            .map_err(map_diesel)
    }

    async fn insert(&self, blog: &Blog) -> Result<(), BlogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        diesel::insert_into(blogs::table)
            .values(BlogRow::from(blog))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel)
    }

    async fn update(&self, blog: &Blog) -> Result<bool, BlogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        diesel::update(blogs::table.find(blog.id))
            .set(&BlogRow::from(blog))
            .execute(&mut conn)
            .await
            .map(|count| count > 0)
            .map_err(map_diesel)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, BlogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        diesel::delete(blogs::table.find(id))
            .execute(&mut conn)
            .await
            .map(|count| count > 0)
            .map_err(map_diesel)
    }
}
