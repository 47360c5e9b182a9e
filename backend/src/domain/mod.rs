//! Domain primitives, aggregates, ports and services.
//!
//! Purpose: Define strongly typed domain entities used by the API and
//! persistence layers, the ports adapters implement, and the services that
//! hold the business rules. Nothing here depends on actix, Diesel or Redis.
//!
//! Public surface:
//! - Error (alias to `error::Error`) — API error response payload.
//! - ErrorCode (alias to `error::ErrorCode`) — stable error identifier.
//! - User (alias to `user::User`) — account identity and profile.
//! - The `*Service` types — one per resource, built from `Arc<dyn Port>`s.

pub mod auth;
pub mod blog;
pub mod category;
pub mod coffee;
pub mod course;
pub mod duration;
pub mod error;
pub mod ports;
pub mod product;
pub mod project;
pub mod rbac;
pub mod recipe;
pub mod sanitize;
pub mod team;
pub mod trace_id;
pub mod upload;
pub mod user;

mod auth_service;
mod blog_service;
mod category_service;
mod coffee_service;
mod course_service;
mod product_service;
mod project_service;
mod rbac_service;
mod recipe_service;
pub(crate) mod service_support;
mod team_service;
mod user_service;

pub use self::auth::{
    LoginCredentials, LoginValidationError, OTP_TTL, Otp, OtpChallenge, OtpCode,
    OtpValidationError, Password, REFRESH_TOKEN_TTL_SECS, Registration,
    RegistrationValidationError, SignIn, TokenKind, TokenPair,
};
pub use self::auth_service::{AuthService, AuthServicePorts, LOGIN_FAILED_MESSAGE};
pub use self::blog::{AuthorSummary, Blog, BlogChanges, BlogDraft, BlogView};
pub use self::blog_service::{BlogService, BlogServicePorts};
pub use self::category::{Category, CategoryNode};
pub use self::category_service::CategoryService;
pub use self::coffee::{Coffee, CoffeeChanges, CoffeeDraft};
pub use self::coffee_service::{CoffeeService, CoffeeServicePorts};
pub use self::course::{
    Chapter, ChapterChanges, ChapterDraft, Course, CourseChanges, CourseChangesInput, CourseDraft,
    CourseDraftInput, CourseKind, CourseStatus, Episode, EpisodeChanges, EpisodeDraft, EpisodeKind,
};
pub use self::course_service::{CourseChapters, CourseService, CourseServicePorts};
pub use self::error::{Error, ErrorCode};
pub use self::product::{
    FeatureInput, Product, ProductChanges, ProductChangesInput, ProductDraft, ProductDraftInput,
    ProductFeatures, ProductKind,
};
pub use self::product_service::{ProductService, ProductServicePorts};
pub use self::project::{Project, ProjectChanges, ProjectDraft};
pub use self::project_service::{ProjectService, ProjectServicePorts};
pub use self::rbac::{
    Permission, PermissionChanges, PermissionDraft, Role, RoleChanges, RoleDraft, RoleTitle,
};
pub use self::rbac_service::{FORBIDDEN_MESSAGE, OwnerScope, RbacService};
pub use self::recipe::{Recipe, RecipeDraft, RecipeView};
pub use self::recipe_service::{RecipeService, RecipeServicePorts};
pub use self::sanitize::FieldViolation;
pub use self::team::{
    Invitation, InvitationStatus, InvitationView, Team, TeamChanges, TeamDraft, TeamHandle,
    TeamView,
};
pub use self::team_service::{TeamService, TeamServicePorts};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::upload::IncomingFile;
pub use self::user::{
    Email, Mobile, ProfileChanges, User, UserId, UserValidationError, Username,
};
pub use self::user_service::UserService;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use campus::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
