//! Internal helpers shared by the domain services.

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::domain::Error;
use crate::domain::ports::{
    BlogRepositoryError, CategoryRepositoryError, CoffeeRepositoryError, CourseRepositoryError,
    FileStorage, FileStorageError, PasswordHasherError, ProductRepositoryError,
    ProjectRepositoryError, RbacRepositoryError, RecipeRepositoryError, RefreshTokenStoreError,
    TeamRepositoryError, TokenCodecError, UserPersistenceError, VideoProbeError,
};
use crate::domain::upload::{IncomingFile, MediaClass, UploadKind, check_upload, relative_upload_path};

pub(crate) fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::Duplicate { message } => {
            Error::conflict(format!("User already exists: {message}"))
        }
    }
}

pub(crate) fn map_refresh_store_error(error: RefreshTokenStoreError) -> Error {
    match error {
        RefreshTokenStoreError::Connection { message } => {
            Error::service_unavailable(format!("refresh token store unavailable: {message}"))
        }
        RefreshTokenStoreError::Command { message } => {
            Error::internal(format!("refresh token store error: {message}"))
        }
    }
}

pub(crate) fn map_hasher_error(error: &PasswordHasherError) -> Error {
    Error::internal(error.to_string())
}

pub(crate) fn map_signing_error(error: &TokenCodecError) -> Error {
    Error::internal(error.to_string())
}

pub(crate) fn map_rbac_error(error: RbacRepositoryError) -> Error {
    match error {
        RbacRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("rbac repository unavailable: {message}"))
        }
        RbacRepositoryError::Query { message } => {
            Error::internal(format!("rbac repository error: {message}"))
        }
        RbacRepositoryError::Duplicate { title } => {
            Error::conflict(format!("{title} already exists"))
        }
    }
}

pub(crate) fn map_category_error(error: CategoryRepositoryError) -> Error {
    match error {
        CategoryRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("category repository unavailable: {message}"))
        }
        CategoryRepositoryError::Query { message } => {
            Error::internal(format!("category repository error: {message}"))
        }
        CategoryRepositoryError::Duplicate { .. } => Error::conflict("Category already exists"),
    }
}

pub(crate) fn map_blog_error(error: BlogRepositoryError) -> Error {
    match error {
        BlogRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("blog repository unavailable: {message}"))
        }
        BlogRepositoryError::Query { message } => {
            Error::internal(format!("blog repository error: {message}"))
        }
    }
}

pub(crate) fn map_product_error(error: ProductRepositoryError) -> Error {
    match error {
        ProductRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("product repository unavailable: {message}"))
        }
        ProductRepositoryError::Query { message } => {
            Error::internal(format!("product repository error: {message}"))
        }
    }
}

pub(crate) fn map_course_error(error: CourseRepositoryError) -> Error {
    match error {
        CourseRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("course repository unavailable: {message}"))
        }
        CourseRepositoryError::Query { message } | CourseRepositoryError::Corrupt { message } => {
            Error::internal(format!("course repository error: {message}"))
        }
    }
}

pub(crate) fn map_recipe_error(error: RecipeRepositoryError) -> Error {
    match error {
        RecipeRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("recipe repository unavailable: {message}"))
        }
        RecipeRepositoryError::Query { message } => {
            Error::internal(format!("recipe repository error: {message}"))
        }
    }
}

pub(crate) fn map_project_error(error: ProjectRepositoryError) -> Error {
    match error {
        ProjectRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("project repository unavailable: {message}"))
        }
        ProjectRepositoryError::Query { message } => {
            Error::internal(format!("project repository error: {message}"))
        }
    }
}

pub(crate) fn map_coffee_error(error: CoffeeRepositoryError) -> Error {
    match error {
        CoffeeRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("coffee repository unavailable: {message}"))
        }
        CoffeeRepositoryError::Query { message } => {
            Error::internal(format!("coffee repository error: {message}"))
        }
    }
}

pub(crate) fn map_team_error(error: TeamRepositoryError) -> Error {
    match error {
        TeamRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("team repository unavailable: {message}"))
        }
        TeamRepositoryError::Query { message } => {
            Error::internal(format!("team repository error: {message}"))
        }
        TeamRepositoryError::Duplicate { .. } => {
            Error::conflict("The team username already exists")
        }
    }
}

pub(crate) fn map_storage_error(error: FileStorageError) -> Error {
    match error {
        FileStorageError::Io { path, message } => {
            Error::internal(format!("file storage failed at {path}: {message}"))
        }
        FileStorageError::InvalidPath { path } => {
            Error::invalid_request(format!("Invalid file path: {path}"))
        }
    }
}

pub(crate) fn map_probe_error(error: VideoProbeError) -> Error {
    match error {
        VideoProbeError::Unavailable { message } | VideoProbeError::Failed { message } => {
            Error::service_unavailable(format!("video duration probe failed: {message}"))
        }
    }
}

/// Validate `file` against `class` and move it into storage under `kind`.
///
/// Returns the stored path relative to the upload root.
pub(crate) async fn store_upload(
    storage: &dyn FileStorage,
    kind: UploadKind,
    class: MediaClass,
    file: &IncomingFile,
    now: DateTime<Utc>,
) -> Result<String, Error> {
    let extension = check_upload(class, &file.file_name, file.size)?;
    let relative_path = relative_upload_path(kind, &extension, now);
    storage
        .store(file, &relative_path)
        .await
        .map_err(map_storage_error)?;
    Ok(relative_path)
}

/// Remove stored files, logging rather than failing when one cannot be
/// deleted.
pub(crate) async fn discard_files<I>(storage: &dyn FileStorage, paths: I)
where
    I: IntoIterator<Item = String>,
{
    for path in paths {
        if let Err(error) = storage.remove(&path).await {
            warn!(%path, %error, "failed to remove stored upload");
        }
    }
}
