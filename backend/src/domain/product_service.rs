//! Storefront product use-cases.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use tracing::info;
use uuid::Uuid;

use crate::domain::ports::{CategoryRepository, FileStorage, ProductRepository};
use crate::domain::product::check_image_count;
use crate::domain::service_support::{
    discard_files, map_category_error, map_product_error, store_upload,
};
use crate::domain::upload::{IncomingFile, MediaClass, UploadKind};
use crate::domain::{Error, Product, ProductChanges, ProductDraft, User};

const NOT_FOUND: &str = "Product not found";

/// Dependencies of [`ProductService`].
#[derive(Clone)]
pub struct ProductServicePorts {
    pub products: Arc<dyn ProductRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub storage: Arc<dyn FileStorage>,
    pub clock: Arc<dyn Clock>,
}

/// Product use-cases.
#[derive(Clone)]
pub struct ProductService {
    ports: ProductServicePorts,
}

impl ProductService {
    /// Create the service.
    pub fn new(ports: ProductServicePorts) -> Self {
        Self { ports }
    }

    /// Products matching `search`, newest first.
    pub async fn list(&self, search: Option<String>) -> Result<Vec<Product>, Error> {
        self.ports
            .products
            .list(search)
            .await
            .map_err(map_product_error)
    }

    /// One product.
    pub async fn get(&self, id: Uuid) -> Result<Product, Error> {
        self.ports
            .products
            .find_by_id(id)
            .await
            .map_err(map_product_error)?
            .ok_or_else(|| Error::not_found(NOT_FOUND))
    }

    /// List a product supplied by `supplier`.
    pub async fn add(
        &self,
        supplier: &User,
        draft: ProductDraft,
        images: Vec<IncomingFile>,
    ) -> Result<Product, Error> {
        check_image_count(images.len())?;
        self.ensure_category(draft.category).await?;
        let now = self.ports.clock.utc();
        let stored = self.store_images(&images, now).await?;

        let product = draft.into_product(supplier.id.clone(), stored, now);
        if let Err(error) = self.ports.products.insert(&product).await {
            discard_files(self.ports.storage.as_ref(), product.images).await;
            return Err(map_product_error(error));
        }
        info!(product_id = %product.id, supplier = %supplier.id, "created product");
        Ok(product)
    }

    /// Apply `changes`; a non-empty `images` replaces the whole set.
    pub async fn edit(
        &self,
        id: Uuid,
        changes: ProductChanges,
        images: Vec<IncomingFile>,
    ) -> Result<Product, Error> {
        check_image_count(images.len())?;
        let mut product = self.get(id).await?;
        if let Some(category) = changes.category() {
            self.ensure_category(category).await?;
        }
        let now = self.ports.clock.utc();
        let replaced = if images.is_empty() {
            Vec::new()
        } else {
            let stored = self.store_images(&images, now).await?;
            std::mem::replace(&mut product.images, stored)
        };
        changes.apply(&mut product, now);

        let updated = match self.ports.products.update(&product).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(Error::not_found(NOT_FOUND)),
            Err(error) => Err(map_product_error(error)),
        };
        if let Err(error) = updated {
            if !images.is_empty() {
                discard_files(self.ports.storage.as_ref(), product.images).await;
            }
            return Err(error);
        }
        discard_files(self.ports.storage.as_ref(), replaced).await;
        Ok(product)
    }

    /// Delete a product and its images.
    pub async fn remove(&self, id: Uuid) -> Result<(), Error> {
        let product = self.get(id).await?;
        if !self
            .ports
            .products
            .delete(id)
            .await
            .map_err(map_product_error)?
        {
            return Err(Error::not_found(NOT_FOUND));
        }
        discard_files(self.ports.storage.as_ref(), product.images).await;
        info!(product_id = %id, "removed product");
        Ok(())
    }

    async fn ensure_category(&self, id: Uuid) -> Result<(), Error> {
        self.ports
            .categories
            .find_by_id(id)
            .await
            .map_err(map_category_error)?
            .map(|_| ())
            .ok_or_else(|| Error::not_found("Category not found"))
    }

    /// Store every image, offsetting each timestamp by its index so paths
    /// never collide. Already stored files are discarded on failure.
    async fn store_images(
        &self,
        images: &[IncomingFile],
        now: DateTime<Utc>,
    ) -> Result<Vec<String>, Error> {
        let mut stored = Vec::with_capacity(images.len());
        for (offset, file) in (0_i64..).zip(images) {
            let at = now + TimeDelta::milliseconds(offset);
            match store_upload(
                self.ports.storage.as_ref(),
                UploadKind::Products,
                MediaClass::Image,
                file,
                at,
            )
            .await
            {
                Ok(path) => stored.push(path),
                Err(error) => {
                    discard_files(self.ports.storage.as_ref(), stored).await;
                    return Err(error);
                }
            }
        }
        Ok(stored)
    }
}
