//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repositories translate between Diesel rows and domain types and hold no
//! business rules. Row structs (`models.rs`) and table definitions
//! (`schema.rs`) stay private to this module.
//!
//! # Example
//!
//! ```no_run
//! use campus::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! # async fn wire() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/campus")).await?;
//! let users = DieselUserRepository::new(pool);
//! # let _ = users;
//! # Ok(())
//! # }
//! ```

mod diesel_blog_repository;
mod diesel_category_repository;
mod diesel_coffee_repository;
mod diesel_course_repository;
mod diesel_error_mapping;
mod diesel_product_repository;
mod diesel_project_repository;
mod diesel_rbac_repository;
mod diesel_recipe_repository;
mod diesel_team_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_blog_repository::DieselBlogRepository;
pub use diesel_category_repository::DieselCategoryRepository;
pub use diesel_coffee_repository::DieselCoffeeRepository;
pub use diesel_course_repository::DieselCourseRepository;
pub use diesel_product_repository::DieselProductRepository;
pub use diesel_project_repository::DieselProjectRepository;
pub use diesel_rbac_repository::{DieselPermissionRepository, DieselRoleRepository};
pub use diesel_recipe_repository::DieselRecipeRepository;
pub use diesel_team_repository::DieselTeamRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
