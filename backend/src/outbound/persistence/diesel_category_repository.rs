//! PostgreSQL-backed `CategoryRepository` implementation.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use super::diesel_error_mapping::{is_unique_violation, map_diesel_error, map_pool_error};
use super::models::CategoryRow;
use super::pool::{DbPool, PoolError};
use super::schema::categories;
use crate::domain::Category;
use crate::domain::ports::{CategoryRepository, CategoryRepositoryError};

/// Diesel-backed category repository.
#[derive(Clone)]
pub struct DieselCategoryRepository {
    pool: DbPool,
}

impl DieselCategoryRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool(error: PoolError) -> CategoryRepositoryError {
    map_pool_error(error, CategoryRepositoryError::connection)
}

fn map_diesel(error: DieselError, title: &str) -> CategoryRepositoryError {
    if is_unique_violation(&error) {
        return CategoryRepositoryError::duplicate(title);
    }
    map_diesel_error(
        &error,
        CategoryRepositoryError::query,
        CategoryRepositoryError::connection,
    )
}

fn map_read(error: DieselError) -> CategoryRepositoryError {
    map_diesel(error, "")
}

#[async_trait]
impl CategoryRepository for DieselCategoryRepository {
    async fn list_all(&self) -> Result<Vec<Category>, CategoryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let rows: Vec<CategoryRow> = categories::table
            .select(CategoryRow::as_select())
            .order(categories::title.asc())
            .load(&mut conn)
            .await
            .map_err(map_read)?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, CategoryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        categories::table
            .find(id)
            .select(CategoryRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map(|row| row.map(Category::from))
            .map_err(map_read)
    }

    async fn find_by_title(
        &self,
        title: &str,
    ) -> Result<Option<Category>, CategoryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        categories::table
            .filter(categories::title.eq(title))
            .select(CategoryRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map(|row| row.map(Category::from))
            .map_err(map_read)
    }

    async fn insert(&self, category: &Category) -> Result<(), CategoryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        diesel::insert_into(categories::table)
            .values(CategoryRow::from(category))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_diesel(err, &category.title))
    }

    async fn update_title(&self, id: Uuid, title: &str) -> Result<bool, CategoryRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        diesel::update(categories::table.find(id))
            .set(categories::title.eq(title))
            .execute(&mut conn)
            .await
            .map(|count| count > 0)
            .map_err(|err| map_diesel(err, title))
    }

    async fn delete_many(&self, ids: Vec<Uuid>) -> Result<usize, CategoryRepositoryError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        diesel::delete(categories::table.filter(categories::id.eq_any(ids)))
            .execute(&mut conn)
            .await
            .map_err(map_read)
    }
}
