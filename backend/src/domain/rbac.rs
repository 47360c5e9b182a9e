//! Role based access control.
//!
//! A user holds one role title; a role lists permission titles. Admin scopes
//! demand a single permission, and the `all` permission satisfies any demand.

use std::fmt;

use uuid::Uuid;

use super::sanitize::{FieldViolation, bounded_text, clean_list, clean_text};

/// Well-known permission titles.
pub mod permissions {
    /// Grants every scope.
    pub const ALL: &str = "all";
    /// Own profile access.
    pub const PROFILE: &str = "profile";
    /// Courses, chapters and episodes.
    pub const COURSE: &str = "course";
    /// Blog posts.
    pub const BLOG: &str = "blog";
    /// Category tree.
    pub const CATEGORY: &str = "category";
    /// Store products.
    pub const PRODUCT: &str = "product";
}

/// Well-known role titles seeded by the initial migration.
pub mod roles {
    pub const USER: &str = "USER";
    pub const ADMIN: &str = "ADMIN";
    pub const WRITER: &str = "WRITER";
    pub const TEACHER: &str = "TEACHER";
    pub const SUPPLIER: &str = "SUPPLIER";
    pub const CONTENT_MANAGER: &str = "CONTENT_MANAGER";
}

/// Permissions present on a fresh install.
pub const DEFAULT_PERMISSIONS: &[&str] = &[
    permissions::ALL,
    permissions::PROFILE,
    permissions::COURSE,
    permissions::BLOG,
    permissions::CATEGORY,
    permissions::PRODUCT,
];

/// Roles present on a fresh install with the permissions each grants.
pub const DEFAULT_ROLES: &[(&str, &[&str])] = &[
    (roles::USER, &[permissions::PROFILE]),
    (roles::ADMIN, &[permissions::ALL]),
    (roles::WRITER, &[permissions::BLOG, permissions::PROFILE]),
    (
        roles::TEACHER,
        &[permissions::COURSE, permissions::BLOG, permissions::PROFILE],
    ),
    (roles::SUPPLIER, &[permissions::PRODUCT, permissions::PROFILE]),
    (
        roles::CONTENT_MANAGER,
        &[
            permissions::COURSE,
            permissions::BLOG,
            permissions::CATEGORY,
            permissions::PRODUCT,
            permissions::PROFILE,
        ],
    ),
];

/// Title of the role assigned to a user.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoleTitle(String);

impl RoleTitle {
    /// Wrap a stored role title.
    pub fn new(title: impl Into<String>) -> Self {
        Self(title.into())
    }

    /// The default role of new accounts.
    pub fn user() -> Self {
        Self::new(roles::USER)
    }

    /// Borrow the title.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoleTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named permission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permission {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
}

/// A role and the permission titles it grants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub permissions: Vec<String>,
}

impl Role {
    /// True when this role satisfies `required`.
    ///
    /// # Examples
    /// ```
    /// use campus::domain::Role;
    /// use uuid::Uuid;
    ///
    /// let teacher = Role {
    ///     id: Uuid::new_v4(),
    ///     title: "TEACHER".into(),
    ///     description: None,
    ///     permissions: vec!["course".into(), "blog".into()],
    /// };
    /// assert!(teacher.grants(Some("course")));
    /// assert!(!teacher.grants(Some("product")));
    /// ```
    pub fn grants(&self, required: Option<&str>) -> bool {
        grants(&self.permissions, required)
    }
}

/// Decide whether `granted` satisfies `required`.
///
/// An empty requirement only needs an authenticated caller.
pub fn grants(granted: &[String], required: Option<&str>) -> bool {
    if granted.iter().any(|title| title == permissions::ALL) {
        return true;
    }
    match required {
        None => true,
        Some(required) => granted.iter().any(|title| title == required),
    }
}

const TITLE_MIN: usize = 3;
const TITLE_MAX: usize = 30;
const DESCRIPTION_MIN: usize = 3;
const DESCRIPTION_MAX: usize = 100;

fn role_title(raw: &str) -> Result<String, FieldViolation> {
    bounded_text("title", "role", raw, TITLE_MIN, TITLE_MAX)
}

fn description(raw: Option<String>) -> Result<Option<String>, FieldViolation> {
    clean_text(raw)
        .map(|text| {
            bounded_text(
                "description",
                "description",
                &text,
                DESCRIPTION_MIN,
                DESCRIPTION_MAX,
            )
        })
        .transpose()
}

/// Input for creating a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleDraft {
    pub title: String,
    pub description: Option<String>,
    pub permissions: Vec<String>,
}

impl RoleDraft {
    /// Validate raw role fields.
    pub fn try_from_parts(
        title: &str,
        description_raw: Option<String>,
        permissions: Vec<String>,
    ) -> Result<Self, FieldViolation> {
        Ok(Self {
            title: role_title(title)?,
            description: description(description_raw)?,
            permissions: clean_list(Some(permissions)).unwrap_or_default(),
        })
    }

    /// Materialise the role with a fresh identifier.
    pub fn into_role(self) -> Role {
        Role {
            id: Uuid::new_v4(),
            title: self.title,
            description: self.description,
            permissions: self.permissions,
        }
    }
}

/// Sparse role update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub permissions: Option<Vec<String>>,
}

impl RoleChanges {
    /// Validate the present fields and drop nullish ones.
    pub fn try_from_parts(
        title: Option<String>,
        description_raw: Option<String>,
        permissions: Option<Vec<String>>,
    ) -> Result<Self, FieldViolation> {
        Ok(Self {
            title: clean_text(title).map(|t| role_title(&t)).transpose()?,
            description: description(description_raw)?,
            permissions: clean_list(permissions),
        })
    }

    /// True when nothing would change.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.permissions.is_none()
    }

    /// Apply onto `role`.
    pub fn apply(self, role: &mut Role) {
        if let Some(title) = self.title {
            role.title = title;
        }
        if let Some(description) = self.description {
            role.description = Some(description);
        }
        if let Some(permissions) = self.permissions {
            role.permissions = permissions;
        }
    }
}

/// Input for creating a permission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionDraft {
    pub title: String,
    pub description: Option<String>,
}

impl PermissionDraft {
    /// Validate raw permission fields.
    pub fn try_from_parts(title: &str, description_raw: Option<String>) -> Result<Self, FieldViolation> {
        Ok(Self {
            title: bounded_text("title", "permission", title, TITLE_MIN, TITLE_MAX)?,
            description: description(description_raw)?,
        })
    }

    /// Materialise the permission with a fresh identifier.
    pub fn into_permission(self) -> Permission {
        Permission {
            id: Uuid::new_v4(),
            title: self.title,
            description: self.description,
        }
    }
}

/// Sparse permission update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionChanges {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl PermissionChanges {
    /// Validate the present fields and drop nullish ones.
    pub fn try_from_parts(
        title: Option<String>,
        description_raw: Option<String>,
    ) -> Result<Self, FieldViolation> {
        Ok(Self {
            title: clean_text(title)
                .map(|t| bounded_text("title", "permission", &t, TITLE_MIN, TITLE_MAX))
                .transpose()?,
            description: description(description_raw)?,
        })
    }

    /// True when nothing would change.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none()
    }

    /// Apply onto `permission`.
    pub fn apply(self, permission: &mut Permission) {
        if let Some(title) = self.title {
            permission.title = title;
        }
        if let Some(description) = self.description {
            permission.description = Some(description);
        }
    }
}
