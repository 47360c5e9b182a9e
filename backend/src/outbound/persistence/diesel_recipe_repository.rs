//! PostgreSQL-backed `RecipeRepository` implementation.

use async_trait::async_trait;
use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel::sql_types::{Array, Text};
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use super::diesel_error_mapping::{like_pattern, map_diesel_error, map_pool_error, search_term};
use super::models::RecipeRow;
use super::pool::{DbPool, PoolError};
use super::schema::recipes;
use crate::domain::ports::{RecipeRepository, RecipeRepositoryError};
use crate::domain::{Recipe, UserId};

diesel::define_sql_function! {
    /// PostgreSQL `array_to_string`.
    fn array_to_string(array: Array<Text>, delimiter: Text) -> Text;
}

/// Diesel-backed recipe repository.
#[derive(Clone)]
pub struct DieselRecipeRepository {
    pool: DbPool,
}

impl DieselRecipeRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool(error: PoolError) -> RecipeRepositoryError {
    map_pool_error(error, RecipeRepositoryError::connection)
}

fn map_diesel(error: DieselError) -> RecipeRepositoryError {
    map_diesel_error(
        &error,
        RecipeRepositoryError::query,
        RecipeRepositoryError::connection,
    )
}

#[async_trait]
impl RecipeRepository for DieselRecipeRepository {
    async fn list(&self, keyword: Option<String>) -> Result<Vec<Recipe>, RecipeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let mut query = recipes::table
            .select(RecipeRow::as_select())
            .order(recipes::created_at.desc())
            .into_boxed();
        if let Some(term) = search_term(keyword) {
            let pattern = like_pattern(&term);
            query = query.filter(
                recipes::title
                    .ilike(pattern.clone())
                    .or(array_to_string(recipes::ingredients, " ").ilike(pattern.clone()))
                    .or(array_to_string(recipes::instructions, " ").ilike(pattern)),
            );
        }
        let rows: Vec<RecipeRow> = query.load(&mut conn).await.map_err(map_diesel)?;
        Ok(rows.into_iter().map(Recipe::from).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Recipe>, RecipeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        recipes::table
            .find(id)
            .select(RecipeRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map(|row| row.map(Recipe::from))
            .map_err(map_diesel)
    }

    async fn count_by_chef(&self, chef: &UserId) -> Result<usize, RecipeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let count: i64 = recipes::table
            .filter(recipes::chef.eq(chef.as_uuid()))
            .select(count_star())
            .first(&mut conn)
            .await
            .map_err(map_diesel)?;
        usize::try_from(count).map_err(|err| RecipeRepositoryError::query(err.to_string()))
    }

    async fn insert(&self, recipe: &Recipe) -> Result<(), RecipeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        diesel::insert_into(recipes::table)
            .values(RecipeRow::from(recipe))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RecipeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        diesel::delete(recipes::table.find(id))
            .execute(&mut conn)
            .await
            .map(|count| count > 0)
            .map_err(map_diesel)
    }
}
