//! Port for course persistence.
//!
//! Courses are stored as whole aggregates including their chapters and
//! episodes. Edits go through [`CourseRepository::modify`], which holds the
//! stored course locked while the edit runs so concurrent edits never
//! overwrite each other.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::Course;

use super::define_port_error;

define_port_error! {
    /// Errors raised by course repositories.
    pub enum CourseRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "course repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "course repository query failed: {message}",
        /// A stored chapter document could not be decoded.
        Corrupt { message: String } => "course document is corrupt: {message}",
    }
}

/// Edit applied to a locked course. Returning `false` rejects the edit and
/// leaves the stored course untouched.
pub type CourseEdit = Box<dyn FnOnce(&mut Course) -> bool + Send>;

/// Outcome of [`CourseRepository::modify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CourseRevision {
    /// No course has the requested id.
    Missing,
    /// The edit rejected the course as it was stored.
    Rejected(Course),
    /// The edit was applied and written back.
    Saved { before: Course, after: Course },
}

/// Storage for course aggregates.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CourseRepository: Send + Sync {
    /// Courses newest first, optionally filtered by a case-insensitive
    /// search over title and descriptions.
    async fn list(&self, search: Option<String>) -> Result<Vec<Course>, CourseRepositoryError>;

    /// Fetch a course by id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Course>, CourseRepositoryError>;

    /// Fetch the course owning chapter `chapter_id`.
    async fn find_by_chapter(
        &self,
        chapter_id: Uuid,
    ) -> Result<Option<Course>, CourseRepositoryError>;

    /// Fetch the course owning episode `episode_id`.
    async fn find_by_episode(
        &self,
        episode_id: Uuid,
    ) -> Result<Option<Course>, CourseRepositoryError>;

    /// Insert a new course.
    async fn insert(&self, course: &Course) -> Result<(), CourseRepositoryError>;

    /// Run `edit` against course `id` while no other edit can touch it.
    async fn modify(
        &self,
        id: Uuid,
        edit: CourseEdit,
    ) -> Result<CourseRevision, CourseRepositoryError>;
}
