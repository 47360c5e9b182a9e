//! Port for recipe persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Recipe, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by recipe repositories.
    pub enum RecipeRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "recipe repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "recipe repository query failed: {message}",
    }
}

/// Storage for recipes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipeRepository: Send + Sync {
    /// Recipes whose title, ingredients or instructions contain `keyword`
    /// case-insensitively; every recipe when `None`. Newest first.
    async fn list(&self, keyword: Option<String>) -> Result<Vec<Recipe>, RecipeRepositoryError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Recipe>, RecipeRepositoryError>;

    /// How many recipes `chef` has published.
    async fn count_by_chef(&self, chef: &UserId) -> Result<usize, RecipeRepositoryError>;

    async fn insert(&self, recipe: &Recipe) -> Result<(), RecipeRepositoryError>;

    /// Returns `false` when the id is unknown.
    async fn delete(&self, id: Uuid) -> Result<bool, RecipeRepositoryError>;
}
