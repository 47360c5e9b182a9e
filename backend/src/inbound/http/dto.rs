//! Response bodies shared by the HTTP handlers.
//!
//! Domain types stay free of serde and utoipa; these DTOs decide the wire
//! shape. Stored upload paths are paired with public URLs built from the
//! configured base URL.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::upload::public_url;
use crate::domain::{
    AuthorSummary, BlogView, Category, CategoryNode, Chapter, Coffee, Course, Episode,
    InvitationView, OtpChallenge, Permission, Product, ProductFeatures, Project, RecipeView, Role,
    SignIn, TeamView, User,
};

/// Optional free-text filter for list endpoints.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Case-insensitive substring.
    pub search: Option<String>,
}

/// Plain acknowledgement.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageDto {
    #[schema(example = "Blog deleted")]
    pub message: String,
}

impl MessageDto {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Public view of an account. Secrets and OTP state are never exposed.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    #[schema(example = "9121234567")]
    pub mobile: String,
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[schema(example = "USER")]
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            mobile: user.mobile.to_string(),
            username: user.username.map(|u| u.as_str().to_owned()),
            email: user.email.map(|e| e.as_str().to_owned()),
            first_name: user.first_name,
            last_name: user.last_name,
            role: user.role.to_string(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Issued one-time password.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OtpChallengeDto {
    #[schema(example = "9121234567")]
    pub mobile: String,
    #[schema(example = 48213)]
    pub code: u32,
}

impl From<OtpChallenge> for OtpChallengeDto {
    fn from(challenge: OtpChallenge) -> Self {
        Self {
            mobile: challenge.mobile.to_string(),
            code: challenge.code.value(),
        }
    }
}

/// Token pair plus the signed in account.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignInDto {
    pub access_token: String,
    pub refresh_token: String,
    pub user: UserDto,
}

impl From<SignIn> for SignInDto {
    fn from(sign_in: SignIn) -> Self {
        Self {
            access_token: sign_in.tokens.access_token,
            refresh_token: sign_in.tokens.refresh_token,
            user: sign_in.user.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDto {
    pub id: Uuid,
    #[schema(example = "Programming")]
    pub title: String,
    pub parent: Option<Uuid>,
}

impl From<Category> for CategoryDto {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            title: category.title,
            parent: category.parent,
        }
    }
}

/// A category with its nested children.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryNodeDto {
    pub id: Uuid,
    pub title: String,
    pub parent: Option<Uuid>,
    #[schema(no_recursion)]
    pub children: Vec<CategoryNodeDto>,
}

impl From<CategoryNode> for CategoryNodeDto {
    fn from(node: CategoryNode) -> Self {
        Self {
            id: node.id,
            title: node.title,
            parent: node.parent,
            children: node.children.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthorDto {
    pub id: String,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub mobile: String,
}

impl From<AuthorSummary> for AuthorDto {
    fn from(author: AuthorSummary) -> Self {
        Self {
            id: author.id.to_string(),
            username: author.username,
            first_name: author.first_name,
            last_name: author.last_name,
            mobile: author.mobile,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BlogDto {
    pub id: Uuid,
    pub author_id: String,
    pub author: Option<AuthorDto>,
    pub title: String,
    pub short_text: String,
    pub text: String,
    pub image: Option<String>,
    pub image_url: Option<String>,
    pub tags: Vec<String>,
    pub category: Uuid,
    pub category_title: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BlogDto {
    pub fn new(view: BlogView, base_url: &str) -> Self {
        let BlogView {
            blog,
            author,
            category_title,
        } = view;
        Self {
            id: blog.id,
            author_id: blog.author.to_string(),
            author: author.map(Into::into),
            title: blog.title,
            short_text: blog.short_text,
            text: blog.text,
            image_url: blog.image.as_deref().map(|path| public_url(base_url, path)),
            image: blog.image,
            tags: blog.tags,
            category: blog.category,
            category_title,
            created_at: blog.created_at,
            updated_at: blog.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeaturesDto {
    pub colors: Vec<String>,
    pub width: f64,
    pub height: f64,
    pub length: f64,
    pub weight: f64,
}

impl From<ProductFeatures> for FeaturesDto {
    fn from(features: ProductFeatures) -> Self {
        Self {
            colors: features.colors,
            width: features.width,
            height: features.height,
            length: features.length,
            weight: features.weight,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub id: Uuid,
    pub title: String,
    pub short_text: String,
    pub text: String,
    pub images: Vec<String>,
    pub images_url: Vec<String>,
    pub tags: Vec<String>,
    pub category: Uuid,
    pub price: i64,
    pub discount: i64,
    pub count: i64,
    #[schema(example = "physical")]
    #[serde(rename = "type")]
    pub kind: String,
    pub supplier: String,
    pub features: FeaturesDto,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductDto {
    pub fn new(product: Product, base_url: &str) -> Self {
        Self {
            id: product.id,
            images_url: product
                .images
                .iter()
                .map(|path| public_url(base_url, path))
                .collect(),
            images: product.images,
            title: product.title,
            short_text: product.short_text,
            text: product.text,
            tags: product.tags,
            category: product.category,
            price: product.price,
            discount: product.discount,
            count: product.count,
            kind: product.kind.to_string(),
            supplier: product.supplier.to_string(),
            features: product.features.into(),
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeDto {
    pub id: Uuid,
    pub title: String,
    pub text: String,
    #[schema(example = "unlock")]
    #[serde(rename = "type")]
    pub kind: String,
    #[schema(example = "00:12:30")]
    pub time: String,
    pub video_address: String,
    pub video_url: String,
}

impl EpisodeDto {
    pub fn new(episode: Episode, base_url: &str) -> Self {
        Self {
            id: episode.id,
            title: episode.title,
            text: episode.text,
            kind: episode.kind.to_string(),
            time: episode.time,
            video_url: public_url(base_url, &episode.video_address),
            video_address: episode.video_address,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChapterDto {
    pub id: Uuid,
    pub title: String,
    pub text: String,
    pub episodes: Vec<EpisodeDto>,
}

impl ChapterDto {
    pub fn new(chapter: Chapter, base_url: &str) -> Self {
        Self {
            id: chapter.id,
            title: chapter.title,
            text: chapter.text,
            episodes: chapter
                .episodes
                .into_iter()
                .map(|episode| EpisodeDto::new(episode, base_url))
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseDto {
    pub id: Uuid,
    pub title: String,
    pub short_desc: String,
    pub full_desc: String,
    pub image: String,
    pub image_url: String,
    pub tags: Vec<String>,
    pub category: Uuid,
    pub price: i64,
    pub discount: i64,
    #[schema(example = "cash")]
    #[serde(rename = "type")]
    pub kind: String,
    #[schema(example = "NotStarted")]
    pub status: String,
    pub instructor: String,
    #[schema(example = "01:07:05")]
    pub total_time: String,
    pub chapters: Vec<ChapterDto>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CourseDto {
    pub fn new(course: Course, base_url: &str) -> Self {
        let total_time = course.total_time();
        Self {
            id: course.id,
            title: course.title,
            short_desc: course.short_desc,
            full_desc: course.full_desc,
            image_url: public_url(base_url, &course.image),
            image: course.image,
            tags: course.tags,
            category: course.category,
            price: course.price,
            discount: course.discount,
            kind: course.kind.to_string(),
            status: course.status.to_string(),
            instructor: course.instructor.to_string(),
            total_time,
            chapters: course
                .chapters
                .into_iter()
                .map(|chapter| ChapterDto::new(chapter, base_url))
                .collect(),
            created_at: course.created_at,
            updated_at: course.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleDto {
    pub id: Uuid,
    #[schema(example = "TEACHER")]
    pub title: String,
    pub description: Option<String>,
    pub permissions: Vec<String>,
}

impl From<Role> for RoleDto {
    fn from(role: Role) -> Self {
        Self {
            id: role.id,
            title: role.title,
            description: role.description,
            permissions: role.permissions,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PermissionDto {
    pub id: Uuid,
    #[schema(example = "course")]
    pub title: String,
    pub description: Option<String>,
}

impl From<Permission> for PermissionDto {
    fn from(permission: Permission) -> Self {
        Self {
            id: permission.id,
            title: permission.title,
            description: permission.description,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDto {
    pub id: Uuid,
    pub chef_id: String,
    pub chef: Option<AuthorDto>,
    /// Recipes the chef has published.
    pub chef_recipes: usize,
    pub title: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    #[schema(example = "45 min")]
    pub time: String,
    #[schema(example = "easy")]
    pub level: String,
    pub image: String,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
}

impl RecipeDto {
    pub fn new(view: RecipeView, base_url: &str) -> Self {
        let RecipeView {
            recipe,
            chef,
            chef_recipes,
        } = view;
        Self {
            id: recipe.id,
            chef_id: recipe.chef.to_string(),
            chef: chef.map(Into::into),
            chef_recipes,
            title: recipe.title,
            ingredients: recipe.ingredients,
            instructions: recipe.instructions,
            time: recipe.time,
            level: recipe.level,
            image_url: public_url(base_url, &recipe.image),
            image: recipe.image,
            created_at: recipe.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamDto {
    pub id: Uuid,
    pub name: String,
    #[schema(example = "nightowls")]
    pub username: String,
    pub description: String,
    pub owner_id: String,
    pub owner: Option<AuthorDto>,
    pub members: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TeamView> for TeamDto {
    fn from(view: TeamView) -> Self {
        let TeamView { team, owner } = view;
        Self {
            id: team.id,
            name: team.name,
            username: team.handle.to_string(),
            description: team.description,
            owner_id: team.owner.to_string(),
            owner: owner.map(Into::into),
            members: team.members.iter().map(ToString::to_string).collect(),
            created_at: team.created_at,
            updated_at: team.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvitationDto {
    pub id: Uuid,
    pub team_id: Uuid,
    pub team_name: Option<String>,
    pub inviter: Option<AuthorDto>,
    #[schema(example = "pending")]
    pub status: String,
    pub requested_at: DateTime<Utc>,
    pub answered_at: Option<DateTime<Utc>>,
}

impl From<InvitationView> for InvitationDto {
    fn from(view: InvitationView) -> Self {
        let InvitationView {
            invitation,
            team_name,
            inviter,
        } = view;
        Self {
            id: invitation.id,
            team_id: invitation.team,
            team_name,
            inviter: inviter.map(Into::into),
            status: invitation.status.to_string(),
            requested_at: invitation.requested_at,
            answered_at: invitation.answered_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDto {
    pub id: Uuid,
    pub title: String,
    pub text: String,
    pub tags: Vec<String>,
    pub image: String,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProjectDto {
    pub fn new(project: Project, base_url: &str) -> Self {
        Self {
            id: project.id,
            title: project.title,
            text: project.text,
            tags: project.tags,
            image_url: public_url(base_url, &project.image),
            image: project.image,
            created_at: project.created_at,
            updated_at: project.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CoffeeDto {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: i64,
    pub quantity: i64,
    pub image: String,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CoffeeDto {
    pub fn new(coffee: Coffee, base_url: &str) -> Self {
        Self {
            id: coffee.id,
            name: coffee.name,
            description: coffee.description,
            price: coffee.price,
            quantity: coffee.quantity,
            image_url: public_url(base_url, &coffee.image),
            image: coffee.image,
            created_at: coffee.created_at,
            updated_at: coffee.updated_at,
        }
    }
}
