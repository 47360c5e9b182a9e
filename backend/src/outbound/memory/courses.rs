//! In-memory `CourseRepository`.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::Course;
use crate::domain::ports::{CourseEdit, CourseRepository, CourseRepositoryError, CourseRevision};

use super::table::Table;

/// Course aggregates kept in process memory.
#[derive(Debug, Default)]
pub struct InMemoryCourseRepository {
    courses: Table<Course>,
}

impl InMemoryCourseRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CourseRepository for InMemoryCourseRepository {
    async fn list(&self, search: Option<String>) -> Result<Vec<Course>, CourseRepositoryError> {
        let mut courses = self.courses.read(|rows| match search.as_deref() {
            Some(needle) => rows
                .iter()
                .filter(|course| course.matches_search(needle))
                .cloned()
                .collect::<Vec<_>>(),
            None => rows.to_vec(),
        });
        courses.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(courses)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Course>, CourseRepositoryError> {
        Ok(self.courses.find(|course| course.id == id))
    }

    async fn find_by_chapter(
        &self,
        chapter_id: Uuid,
    ) -> Result<Option<Course>, CourseRepositoryError> {
        Ok(self
            .courses
            .find(|course| course.chapters.iter().any(|chapter| chapter.id == chapter_id)))
    }

    async fn find_by_episode(
        &self,
        episode_id: Uuid,
    ) -> Result<Option<Course>, CourseRepositoryError> {
        Ok(self.courses.find(|course| {
            course
                .chapters
                .iter()
                .flat_map(|chapter| chapter.episodes.iter())
                .any(|episode| episode.id == episode_id)
        }))
    }

    async fn insert(&self, course: &Course) -> Result<(), CourseRepositoryError> {
        self.courses.write(|rows| rows.push(course.clone()));
        Ok(())
    }

    async fn modify(
        &self,
        id: Uuid,
        edit: CourseEdit,
    ) -> Result<CourseRevision, CourseRepositoryError> {
        Ok(self.courses.write(|rows| {
            let Some(slot) = rows.iter_mut().find(|course| course.id == id) else {
                return CourseRevision::Missing;
            };
            let before = slot.clone();
            let mut after = before.clone();
            if !edit(&mut after) {
                return CourseRevision::Rejected(before);
            }
            *slot = after.clone();
            CourseRevision::Saved { before, after }
        }))
    }
}
