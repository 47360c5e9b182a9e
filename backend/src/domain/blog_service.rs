//! Blog use-cases.
//!
//! Views join each post with its author's public identity and its category
//! title; a dangling author or category yields `None` rather than an error.

use std::collections::HashMap;
use std::sync::Arc;

use mockable::Clock;
use tracing::info;
use uuid::Uuid;

use crate::domain::ports::{BlogRepository, CategoryRepository, FileStorage, UserRepository};
use crate::domain::service_support::{
    discard_files, map_blog_error, map_category_error, map_user_error, store_upload,
};
use crate::domain::upload::{IncomingFile, MediaClass, UploadKind};
use crate::domain::{
    AuthorSummary, Blog, BlogChanges, BlogDraft, BlogView, Error, User, UserId,
};

const NOT_FOUND: &str = "Blog not found";

/// Dependencies of [`BlogService`].
#[derive(Clone)]
pub struct BlogServicePorts {
    pub blogs: Arc<dyn BlogRepository>,
    pub users: Arc<dyn UserRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub storage: Arc<dyn FileStorage>,
    pub clock: Arc<dyn Clock>,
}

/// Blog use-cases.
#[derive(Clone)]
pub struct BlogService {
    ports: BlogServicePorts,
}

impl From<&User> for AuthorSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.as_ref().map(|name| name.as_str().to_owned()),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            mobile: user.mobile.to_string(),
        }
    }
}

impl BlogService {
    /// Create the service.
    pub fn new(ports: BlogServicePorts) -> Self {
        Self { ports }
    }

    /// Every post, newest first.
    pub async fn list(&self) -> Result<Vec<BlogView>, Error> {
        let blogs = self.ports.blogs.list().await.map_err(map_blog_error)?;
        let categories: HashMap<Uuid, String> = self
            .ports
            .categories
            .list_all()
            .await
            .map_err(map_category_error)?
            .into_iter()
            .map(|category| (category.id, category.title))
            .collect();
        let mut authors: HashMap<UserId, Option<AuthorSummary>> = HashMap::new();
        let mut views = Vec::with_capacity(blogs.len());
        for blog in blogs {
            if !authors.contains_key(&blog.author) {
                let author = self.author(&blog.author).await?;
                authors.insert(blog.author.clone(), author);
            }
            views.push(BlogView {
                author: authors.get(&blog.author).cloned().flatten(),
                category_title: categories.get(&blog.category).cloned(),
                blog,
            });
        }
        Ok(views)
    }

    /// One post.
    pub async fn get(&self, id: Uuid) -> Result<BlogView, Error> {
        let blog = self.find(id).await?;
        self.view(blog).await
    }

    /// Publish a post by `author` with an optional cover image.
    pub async fn add(
        &self,
        author: &User,
        draft: BlogDraft,
        image: Option<IncomingFile>,
    ) -> Result<BlogView, Error> {
        self.ensure_category(draft.category).await?;
        let now = self.ports.clock.utc();
        let image_path = match image {
            Some(file) => Some(
                store_upload(
                    self.ports.storage.as_ref(),
                    UploadKind::Blogs,
                    MediaClass::Image,
                    &file,
                    now,
                )
                .await?,
            ),
            None => None,
        };

        let blog = draft.into_blog(author.id.clone(), image_path.clone(), now);
        if let Err(error) = self.ports.blogs.insert(&blog).await {
            discard_files(self.ports.storage.as_ref(), image_path).await;
            return Err(map_blog_error(error));
        }
        info!(blog_id = %blog.id, author = %author.id, "created blog");
        self.view(blog).await
    }

    /// Apply `changes` and optionally replace the image.
    pub async fn update(
        &self,
        id: Uuid,
        changes: BlogChanges,
        image: Option<IncomingFile>,
    ) -> Result<BlogView, Error> {
        let mut blog = self.find(id).await?;
        if let Some(category) = changes.category {
            self.ensure_category(category).await?;
        }
        let now = self.ports.clock.utc();
        let new_image = match image {
            Some(file) => Some(
                store_upload(
                    self.ports.storage.as_ref(),
                    UploadKind::Blogs,
                    MediaClass::Image,
                    &file,
                    now,
                )
                .await?,
            ),
            None => None,
        };
        let previous_image = match &new_image {
            Some(path) => blog.image.replace(path.clone()),
            None => None,
        };
        changes.apply(&mut blog, now);

        let updated = match self.ports.blogs.update(&blog).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(Error::not_found(NOT_FOUND)),
            Err(error) => Err(map_blog_error(error)),
        };
        if let Err(error) = updated {
            discard_files(self.ports.storage.as_ref(), new_image).await;
            return Err(error);
        }
        discard_files(self.ports.storage.as_ref(), previous_image).await;
        self.view(blog).await
    }

    /// Delete a post and its image.
    pub async fn delete(&self, id: Uuid) -> Result<(), Error> {
        let blog = self.find(id).await?;
        if !self.ports.blogs.delete(id).await.map_err(map_blog_error)? {
            return Err(Error::not_found(NOT_FOUND));
        }
        discard_files(self.ports.storage.as_ref(), blog.image).await;
        info!(blog_id = %id, "deleted blog");
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Blog, Error> {
        self.ports
            .blogs
            .find_by_id(id)
            .await
            .map_err(map_blog_error)?
            .ok_or_else(|| Error::not_found(NOT_FOUND))
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

    async fn author(&self, id: &UserId) -> Result<Option<AuthorSummary>, Error> {
        Ok(self
            .ports
            .users
            .find_by_id(id)
            .await
            .map_err(map_user_error)?
            .as_ref()
            .map(AuthorSummary::from))
    }

    async fn view(&self, blog: Blog) -> Result<BlogView, Error> {
        let author = self.author(&blog.author).await?;
        let category_title = self
            .ports
            .categories
            .find_by_id(blog.category)
            .await
            .map_err(map_category_error)?
            .map(|category| category.title);
        Ok(BlogView {
            blog,
            author,
            category_title,
        })
    }
}

#[cfg(test)]
#[path = "blog_service_tests.rs"]
mod tests;
