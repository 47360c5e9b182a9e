//! Builders for the HTTP state from PostgreSQL, Redis or in-memory adapters.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};

use campus::domain::ports::{
    BlogRepository, CategoryRepository, CoffeeRepository, CourseRepository, FileStorage,
    PermissionRepository, ProductRepository, ProjectRepository, RecipeRepository,
    RefreshTokenStore, RoleRepository, TeamRepository, UserRepository,
};
use campus::domain::{
    AuthService, AuthServicePorts, BlogService, BlogServicePorts, CategoryService, CoffeeService,
    CoffeeServicePorts, CourseService, CourseServicePorts, ProductService, ProductServicePorts,
    ProjectService, ProjectServicePorts, RbacService, RecipeService, RecipeServicePorts,
    TeamService, TeamServicePorts, UserService,
};
use campus::inbound::http::state::{HttpState, HttpStatePorts};
use campus::outbound::media::FfprobeDurationProbe;
use campus::outbound::memory::{
    InMemoryBlogRepository, InMemoryCategoryRepository, InMemoryCoffeeRepository,
    InMemoryCourseRepository, InMemoryPermissionRepository, InMemoryProductRepository,
    InMemoryProjectRepository, InMemoryRecipeRepository, InMemoryRefreshTokenStore,
    InMemoryRoleRepository, InMemoryTeamRepository, InMemoryUserRepository,
};
use campus::outbound::persistence::{
    DbPool, DieselBlogRepository, DieselCategoryRepository, DieselCoffeeRepository,
    DieselCourseRepository, DieselPermissionRepository, DieselProductRepository,
    DieselProjectRepository, DieselRecipeRepository, DieselRoleRepository, DieselTeamRepository,
    DieselUserRepository,
};
use campus::outbound::security::{Argon2PasswordHasher, JwtTokenCodec};
use campus::outbound::storage::LocalFileStorage;

use super::ServerConfig;

/// Every repository port, backed by one kind of store.
struct Repositories {
    users: Arc<dyn UserRepository>,
    roles: Arc<dyn RoleRepository>,
    permissions: Arc<dyn PermissionRepository>,
    categories: Arc<dyn CategoryRepository>,
    blogs: Arc<dyn BlogRepository>,
    products: Arc<dyn ProductRepository>,
    courses: Arc<dyn CourseRepository>,
    recipes: Arc<dyn RecipeRepository>,
    teams: Arc<dyn TeamRepository>,
    projects: Arc<dyn ProjectRepository>,
    coffees: Arc<dyn CoffeeRepository>,
}

impl Repositories {
    fn diesel(pool: &DbPool) -> Self {
        Self {
            users: Arc::new(DieselUserRepository::new(pool.clone())),
            roles: Arc::new(DieselRoleRepository::new(pool.clone())),
            permissions: Arc::new(DieselPermissionRepository::new(pool.clone())),
            categories: Arc::new(DieselCategoryRepository::new(pool.clone())),
            blogs: Arc::new(DieselBlogRepository::new(pool.clone())),
            products: Arc::new(DieselProductRepository::new(pool.clone())),
            courses: Arc::new(DieselCourseRepository::new(pool.clone())),
            recipes: Arc::new(DieselRecipeRepository::new(pool.clone())),
            teams: Arc::new(DieselTeamRepository::new(pool.clone())),
            projects: Arc::new(DieselProjectRepository::new(pool.clone())),
            coffees: Arc::new(DieselCoffeeRepository::new(pool.clone())),
        }
    }

    /// In-memory stores with the default roles and permissions seeded.
    fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            roles: Arc::new(InMemoryRoleRepository::seeded()),
            permissions: Arc::new(InMemoryPermissionRepository::seeded()),
            categories: Arc::new(InMemoryCategoryRepository::new()),
            blogs: Arc::new(InMemoryBlogRepository::new()),
            products: Arc::new(InMemoryProductRepository::new()),
            courses: Arc::new(InMemoryCourseRepository::new()),
            recipes: Arc::new(InMemoryRecipeRepository::new()),
            teams: Arc::new(InMemoryTeamRepository::new()),
            projects: Arc::new(InMemoryProjectRepository::new()),
            coffees: Arc::new(InMemoryCoffeeRepository::new()),
        }
    }

    fn from_pool(pool: Option<&DbPool>) -> Self {
        pool.map_or_else(Self::in_memory, Self::diesel)
    }
}

fn refresh_store(config: &ServerConfig) -> Arc<dyn RefreshTokenStore> {
    match &config.refresh_store {
        Some(store) => Arc::new(store.clone()),
        None => Arc::new(InMemoryRefreshTokenStore::new()),
    }
}

fn build_ports(config: &ServerConfig, repos: Repositories) -> HttpStatePorts {
    let Repositories {
        users,
        roles,
        permissions,
        categories,
        blogs,
        products,
        courses,
        recipes,
        teams,
        projects,
        coffees,
    } = repos;
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let storage: Arc<dyn FileStorage> = Arc::new(LocalFileStorage::new(&config.upload_root));
    let tokens = Arc::new(JwtTokenCodec::new(
        config.access_secret.clone(),
        config.refresh_secret.clone(),
    ));

    HttpStatePorts {
        auth: AuthService::new(AuthServicePorts {
            users: users.clone(),
            tokens,
            refresh_tokens: refresh_store(config),
            hasher: Arc::new(Argon2PasswordHasher::new()),
            clock: clock.clone(),
        }),
        users: UserService::new(users.clone(), clock.clone()),
        rbac: RbacService::new(roles, permissions, users.clone()),
        categories: CategoryService::new(categories.clone()),
        blogs: BlogService::new(BlogServicePorts {
            blogs,
            users: users.clone(),
            categories: categories.clone(),
            storage: storage.clone(),
            clock: clock.clone(),
        }),
        products: ProductService::new(ProductServicePorts {
            products,
            categories: categories.clone(),
            storage: storage.clone(),
            clock: clock.clone(),
        }),
        courses: CourseService::new(CourseServicePorts {
            courses,
            categories,
            storage: storage.clone(),
            probe: Arc::new(FfprobeDurationProbe::new(&config.ffprobe_path)),
            clock: clock.clone(),
        }),
        recipes: RecipeService::new(RecipeServicePorts {
            recipes,
            users: users.clone(),
            storage: storage.clone(),
            clock: clock.clone(),
        }),
        teams: TeamService::new(TeamServicePorts {
            teams,
            users,
            clock: clock.clone(),
        }),
        projects: ProjectService::new(ProjectServicePorts {
            projects,
            storage: storage.clone(),
            clock: clock.clone(),
        }),
        coffees: CoffeeService::new(CoffeeServicePorts {
            coffees,
            storage,
            clock,
        }),
    }
}

/// Build the shared HTTP state, choosing Diesel repositories when a pool is
/// configured and in-memory ones otherwise.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let repos = Repositories::from_pool(config.db_pool.as_ref());
    let ports = build_ports(config, repos);
    web::Data::new(
        HttpState::new(ports, config.public_base_url.clone())
            .with_upload_scratch(config.upload_scratch()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus::domain::rbac::{permissions, roles};
    use rstest::rstest;
    use zeroize::Zeroizing;

    fn config() -> ServerConfig {
        ServerConfig::new(
            "127.0.0.1:0".parse().expect("address"),
            Zeroizing::new("access".into()),
            Zeroizing::new("refresh".into()),
        )
        .with_public_base_url("https://campus.example")
        .with_upload_root("/srv/uploads")
    }

    #[rstest]
    fn state_carries_upload_settings() {
        let state = build_http_state(&config());

        assert_eq!(state.public_base_url, "https://campus.example");
        assert_eq!(
            state.upload_scratch,
            std::path::PathBuf::from("/srv/uploads/.incoming")
        );
    }

    #[rstest]
    #[tokio::test]
    async fn in_memory_state_is_seeded_with_default_roles() {
        let state = build_http_state(&config());

        let listed = state.rbac.list_roles().await.expect("role listing");

        let writer = listed
            .iter()
            .find(|role| role.title == roles::WRITER)
            .expect("writer role");
        assert!(writer.permissions.iter().any(|p| p == permissions::BLOG));
    }
}
