//! In-process adapters backed by locked vectors.
//!
//! The server falls back to these when no database or Redis URL is
//! configured, and the HTTP integration tests run the full application on
//! them. Data does not survive a restart.

mod content;
mod courses;
mod rbac;
mod refresh_tokens;
mod table;
mod teams;
mod users;

pub use content::{
    InMemoryBlogRepository, InMemoryCategoryRepository, InMemoryCoffeeRepository,
    InMemoryProductRepository, InMemoryProjectRepository, InMemoryRecipeRepository,
};
pub use courses::InMemoryCourseRepository;
pub use rbac::{InMemoryPermissionRepository, InMemoryRoleRepository};
pub use refresh_tokens::InMemoryRefreshTokenStore;
pub use teams::InMemoryTeamRepository;
pub use users::InMemoryUserRepository;
