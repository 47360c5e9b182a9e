//! Category tree use-cases.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::domain::category::{CategoryNode, category_title, category_tree, subtree_ids, with_children};
use crate::domain::ports::CategoryRepository;
use crate::domain::service_support::map_category_error;
use crate::domain::{Category, Error};

const NOT_FOUND: &str = "Category not found";

/// Category use-cases.
#[derive(Clone)]
pub struct CategoryService {
    repo: Arc<dyn CategoryRepository>,
}

impl CategoryService {
    /// Create the service.
    pub fn new(repo: Arc<dyn CategoryRepository>) -> Self {
        Self { repo }
    }

    /// Add a category, optionally beneath `parent`.
    pub async fn add(&self, title: &str, parent: Option<Uuid>) -> Result<Category, Error> {
        let title = category_title(title)?;
        if let Some(parent) = parent {
            self.find(parent).await?;
        }
        self.ensure_title_free(&title, None).await?;

        let category = Category {
            id: Uuid::new_v4(),
            title,
            parent,
        };
        self.repo.insert(&category).await.map_err(map_category_error)?;
        info!(category_id = %category.id, "created category");
        Ok(category)
    }

    /// Root categories.
    pub async fn parents(&self) -> Result<Vec<Category>, Error> {
        Ok(self
            .all_flat()
            .await?
            .into_iter()
            .filter(|category| category.parent.is_none())
            .collect())
    }

    /// Direct children of `parent`.
    pub async fn children(&self, parent: Uuid) -> Result<Vec<Category>, Error> {
        Ok(self
            .all_flat()
            .await?
            .into_iter()
            .filter(|category| category.parent == Some(parent))
            .collect())
    }

    /// Roots with their nested descendants.
    pub async fn tree(&self) -> Result<Vec<CategoryNode>, Error> {
        Ok(category_tree(&self.all_flat().await?))
    }

    /// Every category without nesting.
    pub async fn all_flat(&self) -> Result<Vec<Category>, Error> {
        self.repo.list_all().await.map_err(map_category_error)
    }

    /// One category with its direct children.
    pub async fn by_id(&self, id: Uuid) -> Result<CategoryNode, Error> {
        let all = self.all_flat().await?;
        let category = all
            .iter()
            .find(|category| category.id == id)
            .ok_or_else(|| Error::not_found(NOT_FOUND))?;
        Ok(with_children(category, &all))
    }

    /// Rename category `id`.
    pub async fn update_title(&self, id: Uuid, title: &str) -> Result<Category, Error> {
        let title = category_title(title)?;
        let mut category = self.find(id).await?;
        self.ensure_title_free(&title, Some(id)).await?;
        if !self
            .repo
            .update_title(id, &title)
            .await
            .map_err(map_category_error)?
        {
            return Err(Error::not_found(NOT_FOUND));
        }
        category.title = title;
        Ok(category)
    }

    /// Remove category `id` and everything beneath it.
    pub async fn remove(&self, id: Uuid) -> Result<usize, Error> {
        let all = self.all_flat().await?;
        if !all.iter().any(|category| category.id == id) {
            return Err(Error::not_found(NOT_FOUND));
        }
        let ids = subtree_ids(&all, id);
        let removed = self
            .repo
            .delete_many(ids)
            .await
            .map_err(map_category_error)?;
        info!(category_id = %id, removed, "removed category subtree");
        Ok(removed)
    }

    /// Title of category `id`, when it exists.
    pub async fn title_of(&self, id: Uuid) -> Result<Option<String>, Error> {
        Ok(self
            .repo
            .find_by_id(id)
            .await
            .map_err(map_category_error)?
            .map(|category| category.title))
    }

    async fn find(&self, id: Uuid) -> Result<Category, Error> {
        self.repo
            .find_by_id(id)
            .await
            .map_err(map_category_error)?
            .ok_or_else(|| Error::not_found(NOT_FOUND))
    }

    async fn ensure_title_free(&self, title: &str, except: Option<Uuid>) -> Result<(), Error> {
        let taken = self
            .repo
            .find_by_title(title)
            .await
            .map_err(map_category_error)?
            .is_some_and(|other| Some(other.id) != except);
        if taken {
            return Err(Error::conflict("Category already exists"));
        }
        Ok(())
    }
}
