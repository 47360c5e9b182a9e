//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod blog_repository;
mod category_repository;
mod coffee_repository;
mod course_repository;
mod file_storage;
mod password_hasher;
mod product_repository;
mod project_repository;
mod recipe_repository;
mod refresh_token_store;
mod role_repository;
mod team_repository;
mod token_codec;
mod user_repository;
mod video_duration_probe;

#[cfg(test)]
pub use blog_repository::MockBlogRepository;
pub use blog_repository::{BlogRepository, BlogRepositoryError};
#[cfg(test)]
pub use category_repository::MockCategoryRepository;
pub use category_repository::{CategoryRepository, CategoryRepositoryError};
#[cfg(test)]
pub use coffee_repository::MockCoffeeRepository;
pub use coffee_repository::{CoffeeRepository, CoffeeRepositoryError};
#[cfg(test)]
pub use course_repository::MockCourseRepository;
pub use course_repository::{CourseEdit, CourseRepository, CourseRepositoryError, CourseRevision};
#[cfg(test)]
pub use file_storage::MockFileStorage;
pub use file_storage::{FileStorage, FileStorageError};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHasher, PasswordHasherError};
#[cfg(test)]
pub use product_repository::MockProductRepository;
pub use product_repository::{ProductRepository, ProductRepositoryError};
#[cfg(test)]
pub use project_repository::MockProjectRepository;
pub use project_repository::{ProjectRepository, ProjectRepositoryError};
#[cfg(test)]
pub use recipe_repository::MockRecipeRepository;
pub use recipe_repository::{RecipeRepository, RecipeRepositoryError};
#[cfg(test)]
pub use refresh_token_store::MockRefreshTokenStore;
pub use refresh_token_store::{RefreshTokenStore, RefreshTokenStoreError};
#[cfg(test)]
pub use role_repository::{MockPermissionRepository, MockRoleRepository};
pub use role_repository::{PermissionRepository, RbacRepositoryError, RoleRepository};
#[cfg(test)]
pub use team_repository::MockTeamRepository;
pub use team_repository::{InvitationAnswer, InviteOutcome, TeamRepository, TeamRepositoryError};
#[cfg(test)]
pub use token_codec::MockTokenCodec;
pub use token_codec::{TokenCodec, TokenCodecError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
#[cfg(test)]
pub use video_duration_probe::MockVideoDurationProbe;
pub use video_duration_probe::{VideoDurationProbe, VideoProbeError};
