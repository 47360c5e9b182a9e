//! Diesel row structs and their conversions to and from domain types.
//!
//! Rows never leave the persistence module. Reading a row back can fail when
//! the stored text no longer satisfies a domain rule; such rows are reported
//! as [`CorruptRow`].

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::schema::{
    blogs, categories, coffees, courses, permissions, products, projects, recipes, roles,
    team_invitations, teams, users,
};
use crate::domain::{
    Blog, Category, Chapter, Coffee, Course, CourseKind, CourseStatus, Email, Episode, EpisodeKind,
    Invitation, InvitationStatus, Mobile, Otp, OtpCode, Permission, Product, ProductFeatures,
    ProductKind, Project, Recipe, Role, RoleTitle, Team, TeamHandle, User, UserId, Username,
};

/// A stored row that no longer maps onto a valid domain value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("corrupt {table} row {id}: {message}")]
pub(crate) struct CorruptRow {
    pub table: &'static str,
    pub id: Uuid,
    pub message: String,
}

impl CorruptRow {
    fn new(table: &'static str, id: Uuid, message: impl ToString) -> Self {
        Self {
            table,
            id,
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub mobile: String,
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: String,
    pub otp_code: Option<i32>,
    pub otp_expires_at: Option<DateTime<Utc>>,
    pub password_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserRow {
    fn from(user: &User) -> Self {
        Self {
            id: *user.id.as_uuid(),
            mobile: user.mobile.to_string(),
            username: user.username.as_ref().map(|name| name.as_str().to_owned()),
            email: user.email.as_ref().map(|email| email.as_str().to_owned()),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            role: user.role.to_string(),
            otp_code: user
                .otp
                .as_ref()
                .and_then(|otp| i32::try_from(otp.code.value()).ok()),
            otp_expires_at: user.otp.as_ref().map(|otp| otp.expires_at),
            password_hash: user.password_hash.clone(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

impl TryFrom<UserRow> for User {
    type Error = CorruptRow;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let corrupt = |message: &dyn ToString| CorruptRow::new("users", id, message.to_string());
        let mobile = Mobile::new(&row.mobile).map_err(|err| corrupt(&err))?;
        let username = row
            .username
            .as_deref()
            .map(Username::new)
            .transpose()
            .map_err(|err| corrupt(&err))?;
        let email = row
            .email
            .as_deref()
            .map(Email::new)
            .transpose()
            .map_err(|err| corrupt(&err))?;
        let otp = match (row.otp_code, row.otp_expires_at) {
            (Some(code), Some(expires_at)) => Some(Otp {
                code: OtpCode::from_stored(u32::try_from(code).map_err(|err| corrupt(&err))?),
                expires_at,
            }),
            _ => None,
        };
        Ok(Self {
            id: UserId::from_uuid(id),
            mobile,
            username,
            email,
            first_name: row.first_name,
            last_name: row.last_name,
            role: RoleTitle::new(row.role),
            otp,
            password_hash: row.password_hash,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = roles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct RoleRow {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub permissions: Vec<String>,
}

impl From<&Role> for RoleRow {
    fn from(role: &Role) -> Self {
        Self {
            id: role.id,
            title: role.title.clone(),
            description: role.description.clone(),
            permissions: role.permissions.clone(),
        }
    }
}

impl From<RoleRow> for Role {
    fn from(row: RoleRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            permissions: row.permissions,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = permissions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct PermissionRow {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
}

impl From<&Permission> for PermissionRow {
    fn from(permission: &Permission) -> Self {
        Self {
            id: permission.id,
            title: permission.title.clone(),
            description: permission.description.clone(),
        }
    }
}

impl From<PermissionRow> for Permission {
    fn from(row: PermissionRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = categories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CategoryRow {
    pub id: Uuid,
    pub title: String,
    pub parent: Option<Uuid>,
}

impl From<&Category> for CategoryRow {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id,
            title: category.title.clone(),
            parent: category.parent,
        }
    }
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            parent: row.parent,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = blogs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct BlogRow {
    pub id: Uuid,
    pub author: Uuid,
    pub title: String,
    pub short_text: String,
    pub text: String,
    pub image: Option<String>,
    pub tags: Vec<String>,
    pub category: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Blog> for BlogRow {
    fn from(blog: &Blog) -> Self {
        Self {
            id: blog.id,
            author: *blog.author.as_uuid(),
            title: blog.title.clone(),
            short_text: blog.short_text.clone(),
            text: blog.text.clone(),
            image: blog.image.clone(),
            tags: blog.tags.clone(),
            category: blog.category,
            created_at: blog.created_at,
            updated_at: blog.updated_at,
        }
    }
}

impl From<BlogRow> for Blog {
    fn from(row: BlogRow) -> Self {
        Self {
            id: row.id,
            author: UserId::from_uuid(row.author),
            title: row.title,
            short_text: row.short_text,
            text: row.text,
            image: row.image,
            tags: row.tags,
            category: row.category,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProductRow {
    pub id: Uuid,
    pub title: String,
    pub short_text: String,
    pub text: String,
    pub images: Vec<String>,
    pub tags: Vec<String>,
    pub category: Uuid,
    pub price: i64,
    pub discount: i64,
    pub count: i64,
    pub kind: String,
    pub supplier: Uuid,
    pub colors: Vec<String>,
    pub width: f64,
    pub height: f64,
    pub length: f64,
    pub weight: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Product> for ProductRow {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            title: product.title.clone(),
            short_text: product.short_text.clone(),
            text: product.text.clone(),
            images: product.images.clone(),
            tags: product.tags.clone(),
            category: product.category,
            price: product.price,
            discount: product.discount,
            count: product.count,
            kind: product.kind.as_str().to_owned(),
            supplier: *product.supplier.as_uuid(),
            colors: product.features.colors.clone(),
            width: product.features.width,
            height: product.features.height,
            length: product.features.length,
            weight: product.features.weight,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

impl TryFrom<ProductRow> for Product {
    type Error = CorruptRow;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let kind = row
            .kind
            .parse::<ProductKind>()
            .map_err(|err| CorruptRow::new("products", row.id, err))?;
        Ok(Self {
            id: row.id,
            title: row.title,
            short_text: row.short_text,
            text: row.text,
            images: row.images,
            tags: row.tags,
            category: row.category,
            price: row.price,
            discount: row.discount,
            count: row.count,
            kind,
            supplier: UserId::from_uuid(row.supplier),
            features: ProductFeatures {
                colors: row.colors,
                width: row.width,
                height: row.height,
                length: row.length,
                weight: row.weight,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// JSONB form of an episode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct EpisodeDocument {
    pub id: Uuid,
    pub title: String,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub time: String,
    pub video_address: String,
}

/// JSONB form of a chapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ChapterDocument {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub episodes: Vec<EpisodeDocument>,
}

impl From<&Chapter> for ChapterDocument {
    fn from(chapter: &Chapter) -> Self {
        Self {
            id: chapter.id,
            title: chapter.title.clone(),
            text: chapter.text.clone(),
            episodes: chapter
                .episodes
                .iter()
                .map(|episode| EpisodeDocument {
                    id: episode.id,
                    title: episode.title.clone(),
                    text: episode.text.clone(),
                    kind: episode.kind.as_str().to_owned(),
                    time: episode.time.clone(),
                    video_address: episode.video_address.clone(),
                })
                .collect(),
        }
    }
}

impl ChapterDocument {
    fn into_chapter(self) -> Result<Chapter, String> {
        let episodes = self
            .episodes
            .into_iter()
            .map(|episode| {
                Ok(Episode {
                    id: episode.id,
                    title: episode.title,
                    text: episode.text,
                    kind: episode
                        .kind
                        .parse::<EpisodeKind>()
                        .map_err(|err| format!("episode {}: {err}", episode.id))?,
                    time: episode.time,
                    video_address: episode.video_address,
                })
            })
            .collect::<Result<Vec<_>, String>>()?;
        Ok(Chapter {
            id: self.id,
            title: self.title,
            text: self.text,
            episodes,
        })
    }
}

/// Encode chapters for the `chapters` column.
pub(crate) fn encode_chapters(chapters: &[Chapter]) -> Result<serde_json::Value, serde_json::Error> {
    let documents: Vec<ChapterDocument> = chapters.iter().map(ChapterDocument::from).collect();
    serde_json::to_value(documents)
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = courses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CourseRow {
    pub id: Uuid,
    pub title: String,
    pub short_desc: String,
    pub full_desc: String,
    pub image: String,
    pub tags: Vec<String>,
    pub category: Uuid,
    pub price: i64,
    pub discount: i64,
    pub kind: String,
    pub status: String,
    pub instructor: Uuid,
    pub chapters: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<&Course> for CourseRow {
    type Error = serde_json::Error;

    fn try_from(course: &Course) -> Result<Self, Self::Error> {
        Ok(Self {
            id: course.id,
            title: course.title.clone(),
            short_desc: course.short_desc.clone(),
            full_desc: course.full_desc.clone(),
            image: course.image.clone(),
            tags: course.tags.clone(),
            category: course.category,
            price: course.price,
            discount: course.discount,
            kind: course.kind.as_str().to_owned(),
            status: course.status.as_str().to_owned(),
            instructor: *course.instructor.as_uuid(),
            chapters: encode_chapters(&course.chapters)?,
            created_at: course.created_at,
            updated_at: course.updated_at,
        })
    }
}

impl TryFrom<CourseRow> for Course {
    type Error = CorruptRow;

    fn try_from(row: CourseRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let corrupt = |message: String| CorruptRow::new("courses", id, message);
        let documents: Vec<ChapterDocument> =
            serde_json::from_value(row.chapters).map_err(|err| corrupt(err.to_string()))?;
        let chapters = documents
            .into_iter()
            .map(ChapterDocument::into_chapter)
            .collect::<Result<Vec<_>, _>>()
            .map_err(corrupt)?;
        Ok(Self {
            id,
            title: row.title,
            short_desc: row.short_desc,
            full_desc: row.full_desc,
            image: row.image,
            tags: row.tags,
            category: row.category,
            price: row.price,
            discount: row.discount,
            kind: row
                .kind
                .parse::<CourseKind>()
                .map_err(|err| corrupt(err.to_string()))?,
            status: row
                .status
                .parse::<CourseStatus>()
                .map_err(|err| corrupt(err.to_string()))?,
            instructor: UserId::from_uuid(row.instructor),
            chapters,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = recipes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RecipeRow {
    pub id: Uuid,
    pub chef: Uuid,
    pub title: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub time: String,
    pub level: String,
    pub image: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Recipe> for RecipeRow {
    fn from(recipe: &Recipe) -> Self {
        Self {
            id: recipe.id,
            chef: *recipe.chef.as_uuid(),
            title: recipe.title.clone(),
            ingredients: recipe.ingredients.clone(),
            instructions: recipe.instructions.clone(),
            time: recipe.time.clone(),
            level: recipe.level.clone(),
            image: recipe.image.clone(),
            created_at: recipe.created_at,
        }
    }
}

impl From<RecipeRow> for Recipe {
    fn from(row: RecipeRow) -> Self {
        Self {
            id: row.id,
            chef: UserId::from_uuid(row.chef),
            title: row.title,
            ingredients: row.ingredients,
            instructions: row.instructions,
            time: row.time,
            level: row.level,
            image: row.image,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = projects)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProjectRow {
    pub id: Uuid,
    pub owner: Uuid,
    pub title: String,
    pub text: String,
    pub tags: Vec<String>,
    pub image: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Project> for ProjectRow {
    fn from(project: &Project) -> Self {
        Self {
            id: project.id,
            owner: *project.owner.as_uuid(),
            title: project.title.clone(),
            text: project.text.clone(),
            tags: project.tags.clone(),
            image: project.image.clone(),
            created_at: project.created_at,
            updated_at: project.updated_at,
        }
    }
}

impl From<ProjectRow> for Project {
    fn from(row: ProjectRow) -> Self {
        Self {
            id: row.id,
            owner: UserId::from_uuid(row.owner),
            title: row.title,
            text: row.text,
            tags: row.tags,
            image: row.image,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = coffees)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CoffeeRow {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: i64,
    pub quantity: i64,
    pub image: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Coffee> for CoffeeRow {
    fn from(coffee: &Coffee) -> Self {
        Self {
            id: coffee.id,
            name: coffee.name.clone(),
            description: coffee.description.clone(),
            price: coffee.price,
            quantity: coffee.quantity,
            image: coffee.image.clone(),
            created_at: coffee.created_at,
            updated_at: coffee.updated_at,
        }
    }
}

impl From<CoffeeRow> for Coffee {
    fn from(row: CoffeeRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            quantity: row.quantity,
            image: row.image,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = teams)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TeamRow {
    pub id: Uuid,
    pub name: String,
    pub handle: String,
    pub description: String,
    pub owner: Uuid,
    pub members: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Team> for TeamRow {
    fn from(team: &Team) -> Self {
        Self {
            id: team.id,
            name: team.name.clone(),
            handle: team.handle.as_str().to_owned(),
            description: team.description.clone(),
            owner: *team.owner.as_uuid(),
            members: team.members.iter().map(|member| *member.as_uuid()).collect(),
            created_at: team.created_at,
            updated_at: team.updated_at,
        }
    }
}

impl TryFrom<TeamRow> for Team {
    type Error = CorruptRow;

    fn try_from(row: TeamRow) -> Result<Self, Self::Error> {
        let handle =
            TeamHandle::new(&row.handle).map_err(|err| CorruptRow::new("teams", row.id, err))?;
        Ok(Self {
            id: row.id,
            name: row.name,
            handle,
            description: row.description,
            owner: UserId::from_uuid(row.owner),
            members: row.members.into_iter().map(UserId::from_uuid).collect(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = team_invitations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct InvitationRow {
    pub id: Uuid,
    pub team: Uuid,
    pub invitee: Uuid,
    pub inviter: Uuid,
    pub status: String,
    pub requested_at: DateTime<Utc>,
    pub answered_at: Option<DateTime<Utc>>,
}

impl From<&Invitation> for InvitationRow {
    fn from(invitation: &Invitation) -> Self {
        Self {
            id: invitation.id,
            team: invitation.team,
            invitee: *invitation.invitee.as_uuid(),
            inviter: *invitation.inviter.as_uuid(),
            status: invitation.status.as_str().to_owned(),
            requested_at: invitation.requested_at,
            answered_at: invitation.answered_at,
        }
    }
}

impl TryFrom<InvitationRow> for Invitation {
    type Error = CorruptRow;

    fn try_from(row: InvitationRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<InvitationStatus>()
            .map_err(|err| CorruptRow::new("team_invitations", row.id, err))?;
        Ok(Self {
            id: row.id,
            team: row.team,
            invitee: UserId::from_uuid(row.invitee),
            inviter: UserId::from_uuid(row.inviter),
            status,
            requested_at: row.requested_at,
            answered_at: row.answered_at,
        })
    }
}
