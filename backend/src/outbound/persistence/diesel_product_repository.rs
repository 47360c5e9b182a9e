//! PostgreSQL-backed `ProductRepository` implementation.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use super::diesel_error_mapping::{like_pattern, map_diesel_error, map_pool_error, search_term};
use super::models::ProductRow;
use super::pool::{DbPool, PoolError};
use super::schema::products;
use crate::domain::Product;
use crate::domain::ports::{ProductRepository, ProductRepositoryError};

/// Diesel-backed product repository.
#[derive(Clone)]
pub struct DieselProductRepository {
    pool: DbPool,
}

impl DieselProductRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool(error: PoolError) -> ProductRepositoryError {
    map_pool_error(error, ProductRepositoryError::connection)
}

fn map_diesel(error: DieselError) -> ProductRepositoryError {
    map_diesel_error(
        &error,
        ProductRepositoryError::query,
        ProductRepositoryError::connection,
    )
}

fn to_domain(row: ProductRow) -> Result<Product, ProductRepositoryError> {
    Product::try_from(row).map_err(|err| ProductRepositoryError::query(err.to_string()))
}

#[async_trait]
impl ProductRepository for DieselProductRepository {
    async fn list(&self, search: Option<String>) -> Result<Vec<Product>, ProductRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let mut query = products::table
            .select(ProductRow::as_select())
            .order(products::created_at.desc())
            .into_boxed();
        if let Some(term) = search_term(search) {
            let pattern = like_pattern(&term);
            query = query.filter(
                products::title
                    .ilike(pattern.clone())
                    .or(products::short_text.ilike(pattern.clone()))
                    .or(products::text.ilike(pattern)),
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

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, ProductRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        products::table
            .find(id)
            .select(ProductRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?
            .map(to_domain)
            .transpose()
    }

    async fn insert(&self, product: &Product) -> Result<(), ProductRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        diesel::insert_into(products::table)
            .values(ProductRow::from(product))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel)
    }

    async fn update(&self, product: &Product) -> Result<bool, ProductRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        diesel::update(products::table.find(product.id))
            .set(&ProductRow::from(product))
            .execute(&mut conn)
            .await
            .map(|count| count > 0)
            .map_err(map_diesel)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ProductRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        diesel::delete(products::table.find(id))
            .execute(&mut conn)
            .await
            .map(|count| count > 0)
            .map_err(map_diesel)
    }
}
