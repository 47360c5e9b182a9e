//! PostgreSQL-backed `CoffeeRepository` implementation.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::CoffeeRow;
use super::pool::{DbPool, PoolError};
use super::schema::coffees;
use crate::domain::Coffee;
use crate::domain::ports::{CoffeeRepository, CoffeeRepositoryError};

/// Diesel-backed coffee repository.
#[derive(Clone)]
pub struct DieselCoffeeRepository {
    pool: DbPool,
}

impl DieselCoffeeRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool(error: PoolError) -> CoffeeRepositoryError {
    map_pool_error(error, CoffeeRepositoryError::connection)
}

fn map_diesel(error: DieselError) -> CoffeeRepositoryError {
    map_diesel_error(
        &error,
        CoffeeRepositoryError::query,
        CoffeeRepositoryError::connection,
    )
}

#[async_trait]
impl CoffeeRepository for DieselCoffeeRepository {
    async fn list(&self) -> Result<Vec<Coffee>, CoffeeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let rows: Vec<CoffeeRow> = coffees::table
            .select(CoffeeRow::as_select())
            .order(coffees::created_at.desc())
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;
        Ok(rows.into_iter().map(Coffee::from).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Coffee>, CoffeeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        coffees::table
            .find(id)
            .select(CoffeeRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map(|row| row.map(Coffee::from))
            .map_err(map_diesel)
    }

    async fn insert(&self, coffee: &Coffee) -> Result<(), CoffeeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        diesel::insert_into(coffees::table)
            .values(CoffeeRow::from(coffee))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel)
    }

    async fn update(&self, coffee: &Coffee) -> Result<bool, CoffeeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        diesel::update(coffees::table.find(coffee.id))
            .set(&CoffeeRow::from(coffee))
            .execute(&mut conn)
            .await
            .map(|count| count > 0)
            .map_err(map_diesel)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, CoffeeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        diesel::delete(coffees::table.find(id))
            .execute(&mut conn)
            .await
            .map(|count| count > 0)
            .map_err(map_diesel)
    }
}
