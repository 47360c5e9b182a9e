//! The full service graph on in-memory adapters.

use std::path::Path;
use std::sync::Arc;

use actix_web::web;
use chrono::Utc;
use mockable::{Clock, DefaultClock};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::domain::ports::{FileStorage, TokenCodec, UserRepository};
use crate::domain::{
    AuthService, AuthServicePorts, BlogService, BlogServicePorts, CategoryService, CoffeeService,
    CoffeeServicePorts, CourseDraft, CourseDraftInput, CourseService, CourseServicePorts,
    IncomingFile, Mobile, ProductService, ProductServicePorts, ProjectService,
    ProjectServicePorts, RbacService, RecipeService, RecipeServicePorts, RoleTitle, TeamService,
    TeamServicePorts, TokenKind, User, UserService, Username,
};
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::outbound::memory::{
    InMemoryBlogRepository, InMemoryCategoryRepository, InMemoryCoffeeRepository,
    InMemoryCourseRepository, InMemoryPermissionRepository, InMemoryProductRepository,
    InMemoryProjectRepository, InMemoryRecipeRepository, InMemoryRefreshTokenStore,
    InMemoryRoleRepository, InMemoryTeamRepository, InMemoryUserRepository,
};
use crate::outbound::security::{Argon2PasswordHasher, JwtTokenCodec};
use crate::outbound::storage::LocalFileStorage;

use super::{FixedDurationProbe, TempUploads};

/// Public base URL used by test states.
pub const TEST_BASE_URL: &str = "http://campus.test";

/// Seconds every probed test video lasts.
pub const TEST_VIDEO_SECONDS: f64 = 95.0;

/// HTTP state wired to in-memory repositories and a temporary upload root.
pub struct TestBackend {
    state: HttpState,
    users: Arc<InMemoryUserRepository>,
    tokens: Arc<JwtTokenCodec>,
    uploads: TempUploads,
}

impl TestBackend {
    pub fn new() -> std::io::Result<Self> {
        let uploads = TempUploads::new()?;
        let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
        let users = Arc::new(InMemoryUserRepository::new());
        let tokens = Arc::new(JwtTokenCodec::new(
            Zeroizing::new("test-access-secret".to_owned()),
            Zeroizing::new("test-refresh-secret".to_owned()),
        ));
        let categories = Arc::new(InMemoryCategoryRepository::new());
        let storage: Arc<dyn FileStorage> = Arc::new(LocalFileStorage::new(uploads.root()));

        let ports = HttpStatePorts {
            auth: AuthService::new(AuthServicePorts {
                users: users.clone(),
                tokens: tokens.clone(),
                refresh_tokens: Arc::new(InMemoryRefreshTokenStore::new()),
                hasher: Arc::new(Argon2PasswordHasher::new()),
                clock: clock.clone(),
            }),
            users: UserService::new(users.clone(), clock.clone()),
            rbac: RbacService::new(
                Arc::new(InMemoryRoleRepository::seeded()),
                Arc::new(InMemoryPermissionRepository::seeded()),
                users.clone(),
            ),
            categories: CategoryService::new(categories.clone()),
            blogs: BlogService::new(BlogServicePorts {
                blogs: Arc::new(InMemoryBlogRepository::new()),
                users: users.clone(),
                categories: categories.clone(),
                storage: storage.clone(),
                clock: clock.clone(),
            }),
            products: ProductService::new(ProductServicePorts {
                products: Arc::new(InMemoryProductRepository::new()),
                categories: categories.clone(),
                storage: storage.clone(),
                clock: clock.clone(),
            }),
            courses: CourseService::new(CourseServicePorts {
                courses: Arc::new(InMemoryCourseRepository::new()),
                categories,
                storage: storage.clone(),
                probe: Arc::new(FixedDurationProbe(TEST_VIDEO_SECONDS)),
                clock: clock.clone(),
            }),
            recipes: RecipeService::new(RecipeServicePorts {
                recipes: Arc::new(InMemoryRecipeRepository::new()),
                users: users.clone(),
                storage: storage.clone(),
                clock: clock.clone(),
            }),
            teams: TeamService::new(TeamServicePorts {
                teams: Arc::new(InMemoryTeamRepository::new()),
                users: users.clone(),
                clock: clock.clone(),
            }),
            projects: ProjectService::new(ProjectServicePorts {
                projects: Arc::new(InMemoryProjectRepository::new()),
                storage: storage.clone(),
                clock: clock.clone(),
            }),
            coffees: CoffeeService::new(CoffeeServicePorts {
                coffees: Arc::new(InMemoryCoffeeRepository::new()),
                storage,
                clock,
            }),
        };
        let state = HttpState::new(ports, TEST_BASE_URL).with_upload_scratch(uploads.scratch());

        Ok(Self {
            state,
            users,
            tokens,
            uploads,
        })
    }

    /// State to hand to `App::app_data`.
    pub fn data(&self) -> web::Data<HttpState> {
        web::Data::new(self.state.clone())
    }

    /// Root stored uploads land in.
    pub fn upload_root(&self) -> &Path {
        self.uploads.root()
    }

    /// Create a user holding `role` and return an `Authorization` header
    /// value for them.
    pub async fn bearer_for(&self, mobile: &str, role: &str) -> String {
        self.sign_in(mobile, role, None).await
    }

    /// Like [`TestBackend::bearer_for`], for a user who also has a username.
    pub async fn bearer_for_username(&self, mobile: &str, role: &str, username: &str) -> String {
        self.sign_in(mobile, role, Some(username)).await
    }

    async fn sign_in(&self, mobile: &str, role: &str, username: Option<&str>) -> String {
        let mobile = Mobile::new(mobile).expect("fixture mobile");
        let mut user = User::from_mobile(mobile.clone(), Utc::now());
        user.role = RoleTitle::new(role);
        user.username = username.map(|name| Username::new(name).expect("fixture username"));
        self.users.insert(&user).await.expect("insert fixture user");
        let token = self
            .tokens
            .issue(TokenKind::Access, &mobile, Utc::now())
            .expect("issue fixture token");
        format!("Bearer {token}")
    }

    /// Create a category and a cash course in it; returns the course id.
    pub async fn seed_course(&self) -> Uuid {
        let suffix = Uuid::new_v4().simple().to_string();
        let category = self
            .state
            .categories
            .add(&format!("Seed {}", &suffix[..8]), None)
            .await
            .expect("seed category");
        let draft = CourseDraft::try_from_input(CourseDraftInput {
            title: "Seeded course".into(),
            short_desc: "Short".into(),
            full_desc: "Full description".into(),
            tags: vec!["seed".into()],
            category: category.id,
            price: 100,
            discount: 0,
            kind: "cash".into(),
            status: None,
        })
        .expect("seed course draft");
        let image = self.incoming(&format!("{suffix}.png"), b"png");
        let instructor = User::from_mobile(Mobile::new("9129999999").expect("mobile"), Utc::now());
        self.state
            .courses
            .add(&instructor, draft, image)
            .await
            .expect("seed course")
            .id
    }

    /// Stage `contents` as an uploaded file named `file_name`.
    pub fn incoming(&self, file_name: &str, contents: &[u8]) -> IncomingFile {
        let temp_path = self
            .uploads
            .incoming(&format!("{}.part", Uuid::new_v4()), contents)
            .expect("stage upload");
        IncomingFile {
            temp_path,
            file_name: file_name.to_owned(),
            size: contents.len() as u64,
        }
    }
}
