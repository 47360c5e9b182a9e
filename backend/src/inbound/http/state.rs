//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain services and remain testable without I/O.

use std::path::PathBuf;

use crate::domain::{
    AuthService, BlogService, CategoryService, CoffeeService, CourseService, ProductService,
    ProjectService, RbacService, RecipeService, TeamService, UserService,
};

/// Parameter object bundling the services HTTP handlers call.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub auth: AuthService,
    pub users: UserService,
    pub rbac: RbacService,
    pub categories: CategoryService,
    pub blogs: BlogService,
    pub products: ProductService,
    pub courses: CourseService,
    pub recipes: RecipeService,
    pub teams: TeamService,
    pub projects: ProjectService,
    pub coffees: CoffeeService,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub auth: AuthService,
    pub users: UserService,
    pub rbac: RbacService,
    pub categories: CategoryService,
    pub blogs: BlogService,
    pub products: ProductService,
    pub courses: CourseService,
    pub recipes: RecipeService,
    pub teams: TeamService,
    pub projects: ProjectService,
    pub coffees: CoffeeService,
    /// Prefix for public URLs of stored uploads.
    pub public_base_url: String,
    /// Directory incoming multipart files are spooled into.
    pub upload_scratch: PathBuf,
}

impl HttpState {
    /// Construct state from the service bundle.
    ///
    /// Incoming files are spooled into the system temporary directory until
    /// [`HttpState::with_upload_scratch`] points them elsewhere.
    pub fn new(ports: HttpStatePorts, public_base_url: impl Into<String>) -> Self {
        let HttpStatePorts {
            auth,
            users,
            rbac,
            categories,
            blogs,
            products,
            courses,
            recipes,
            teams,
            projects,
            coffees,
        } = ports;
        Self {
            auth,
            users,
            rbac,
            categories,
            blogs,
            products,
            courses,
            recipes,
            teams,
            projects,
            coffees,
            public_base_url: public_base_url.into(),
            upload_scratch: std::env::temp_dir().join("campus-incoming"),
        }
    }

    /// Spool incoming multipart files into `dir`.
    #[must_use]
    pub fn with_upload_scratch(mut self, dir: impl Into<PathBuf>) -> Self {
        self.upload_scratch = dir.into();
        self
    }

    /// Public URL of a stored upload.
    pub fn public_url(&self, relative_path: &str) -> String {
        crate::domain::upload::public_url(&self.public_base_url, relative_path)
    }
}
