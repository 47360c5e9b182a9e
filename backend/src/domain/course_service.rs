//! Course use-cases, including the nested chapters and episodes.
//!
//! A course is persisted as one aggregate. Every edit runs through
//! [`CourseRepository::modify`] so the owning course stays locked between
//! reading and writing it back. Uploads are stored before the lock is taken
//! and discarded again when the edit does not land.

use std::sync::Arc;

use mockable::Clock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::duration::format_duration;
use crate::domain::ports::{
    CategoryRepository, CourseRepository, CourseRevision, FileStorage, VideoDurationProbe,
};
use crate::domain::service_support::{
    discard_files, map_category_error, map_course_error, map_probe_error, map_storage_error,
    store_upload,
};
use crate::domain::upload::{IncomingFile, MediaClass, UploadKind};
use crate::domain::{
    Chapter, ChapterChanges, ChapterDraft, Course, CourseChanges, CourseDraft, Episode,
    EpisodeChanges, EpisodeDraft, Error, User,
};

const COURSE_NOT_FOUND: &str = "Course not found";
const CHAPTER_NOT_FOUND: &str = "Chapter not found";
const EPISODE_NOT_FOUND: &str = "Episode not found";

/// A course title with its chapters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseChapters {
    pub course_id: Uuid,
    pub title: String,
    pub chapters: Vec<Chapter>,
}

/// Dependencies of [`CourseService`].
#[derive(Clone)]
pub struct CourseServicePorts {
    pub courses: Arc<dyn CourseRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub storage: Arc<dyn FileStorage>,
    pub probe: Arc<dyn VideoDurationProbe>,
    pub clock: Arc<dyn Clock>,
}

/// Course, chapter and episode use-cases.
#[derive(Clone)]
pub struct CourseService {
    ports: CourseServicePorts,
}

impl CourseService {
    /// Create the service.
    pub fn new(ports: CourseServicePorts) -> Self {
        Self { ports }
    }

    /// Courses matching `search`, newest first.
    pub async fn list(&self, search: Option<String>) -> Result<Vec<Course>, Error> {
        self.ports
            .courses
            .list(search)
            .await
            .map_err(map_course_error)
    }

    /// One course.
    pub async fn get(&self, id: Uuid) -> Result<Course, Error> {
        self.ports
            .courses
            .find_by_id(id)
            .await
            .map_err(map_course_error)?
            .ok_or_else(|| Error::not_found(COURSE_NOT_FOUND))
    }

    /// Publish a course taught by `instructor`.
    pub async fn add(
        &self,
        instructor: &User,
        draft: CourseDraft,
        image: IncomingFile,
    ) -> Result<Course, Error> {
        self.ensure_category(draft.category).await?;
        let now = self.ports.clock.utc();
        let image_path = store_upload(
            self.ports.storage.as_ref(),
            UploadKind::Courses,
            MediaClass::Image,
            &image,
            now,
        )
        .await?;

        let course = draft.into_course(instructor.id.clone(), image_path, now);
        if let Err(error) = self.ports.courses.insert(&course).await {
            discard_files(self.ports.storage.as_ref(), [course.image]).await;
            return Err(map_course_error(error));
        }
        info!(course_id = %course.id, instructor = %instructor.id, "created course");
        Ok(course)
    }

    /// Apply `changes` and optionally replace the cover image.
    pub async fn edit(
        &self,
        id: Uuid,
        changes: CourseChanges,
        image: Option<IncomingFile>,
    ) -> Result<Course, Error> {
        if let Some(category) = changes.category() {
            self.ensure_category(category).await?;
        }
        let now = self.ports.clock.utc();
        let mut preview = self.get(id).await?;
        changes.clone().apply(&mut preview, now)?;

        let image_path = match image {
            Some(file) => Some(
                store_upload(
                    self.ports.storage.as_ref(),
                    UploadKind::Courses,
                    MediaClass::Image,
                    &file,
                    now,
                )
                .await?,
            ),
            None => None,
        };

        let retry = changes.clone();
        let new_image = image_path.clone();
        let revision = self
            .modify(id, move |course| {
                if changes.apply(course, now).is_err() {
                    return false;
                }
                if let Some(path) = new_image {
                    course.image = path;
                }
                true
            })
            .await;
        let error = match revision {
            Ok(CourseRevision::Saved { before, after }) => {
                if image_path.is_some() {
                    discard_files(self.ports.storage.as_ref(), [before.image]).await;
                }
                return Ok(after);
            }
            Ok(CourseRevision::Missing) => Error::not_found(COURSE_NOT_FOUND),
            Ok(CourseRevision::Rejected(mut current)) => match retry.apply(&mut current, now) {
                Err(violation) => violation.into(),
                Ok(()) => Error::conflict("Course changed while it was being edited"),
            },
            Err(error) => error,
        };
        discard_files(self.ports.storage.as_ref(), image_path).await;
        Err(error)
    }

    /// Append a chapter to course `course_id`.
    pub async fn add_chapter(&self, course_id: Uuid, draft: ChapterDraft) -> Result<Chapter, Error> {
        let chapter = draft.into_chapter();
        let added = chapter.clone();
        let revision = self
            .modify(course_id, move |course| {
                course.chapters.push(added);
                true
            })
            .await?;
        if !matches!(revision, CourseRevision::Saved { .. }) {
            return Err(Error::not_found(COURSE_NOT_FOUND));
        }
        info!(%course_id, chapter_id = %chapter.id, "added chapter");
        Ok(chapter)
    }

    /// Title and chapters of course `course_id`.
    pub async fn chapters(&self, course_id: Uuid) -> Result<CourseChapters, Error> {
        let course = self.get(course_id).await?;
        Ok(CourseChapters {
            course_id: course.id,
            title: course.title,
            chapters: course.chapters,
        })
    }

    /// Remove chapter `chapter_id` together with its episode videos.
    pub async fn remove_chapter(&self, chapter_id: Uuid) -> Result<(), Error> {
        let owner = self.course_of_chapter(chapter_id).await?;
        let revision = self
            .modify(owner.id, move |course| course.remove_chapter(chapter_id).is_some())
            .await?;
        let CourseRevision::Saved { before, .. } = revision else {
            return Err(Error::not_found(CHAPTER_NOT_FOUND));
        };
        let videos: Vec<String> = before
            .chapter(chapter_id)
            .map(|chapter| {
                chapter
                    .episodes
                    .iter()
                    .map(|episode| episode.video_address.clone())
                    .collect()
            })
            .unwrap_or_default();
        discard_files(self.ports.storage.as_ref(), videos).await;
        info!(course_id = %owner.id, %chapter_id, "removed chapter");
        Ok(())
    }

    /// Apply `changes` to chapter `chapter_id`.
    pub async fn update_chapter(
        &self,
        chapter_id: Uuid,
        changes: ChapterChanges,
    ) -> Result<Chapter, Error> {
        let owner = self.course_of_chapter(chapter_id).await?;
        if changes.is_empty() {
            return owner
                .chapter(chapter_id)
                .cloned()
                .ok_or_else(|| Error::not_found(CHAPTER_NOT_FOUND));
        }
        let revision = self
            .modify(owner.id, move |course| match course.chapter_mut(chapter_id) {
                Some(chapter) => {
                    changes.apply(chapter);
                    true
                }
                None => false,
            })
            .await?;
        match revision {
            CourseRevision::Saved { after, .. } => after.chapter(chapter_id).cloned(),
            _ => None,
        }
        .ok_or_else(|| Error::not_found(CHAPTER_NOT_FOUND))
    }

    /// Upload `video` as a new episode of chapter `chapter_id`.
    pub async fn add_episode(
        &self,
        course_id: Uuid,
        chapter_id: Uuid,
        draft: EpisodeDraft,
        video: IncomingFile,
    ) -> Result<Episode, Error> {
        if self.get(course_id).await?.chapter(chapter_id).is_none() {
            return Err(Error::not_found(CHAPTER_NOT_FOUND));
        }
        let (video_address, time) = self.store_video(&video).await?;
        let episode = draft.into_episode(time, video_address);

        let added = episode.clone();
        let revision = self
            .modify(course_id, move |course| match course.chapter_mut(chapter_id) {
                Some(chapter) => {
                    chapter.episodes.push(added);
                    true
                }
                None => false,
            })
            .await;
        let error = match revision {
            Ok(CourseRevision::Saved { .. }) => {
                info!(%course_id, %chapter_id, episode_id = %episode.id, "added episode");
                return Ok(episode);
            }
            Ok(CourseRevision::Missing) => Error::not_found(COURSE_NOT_FOUND),
            Ok(CourseRevision::Rejected(_)) => Error::not_found(CHAPTER_NOT_FOUND),
            Err(error) => error,
        };
        discard_files(self.ports.storage.as_ref(), [episode.video_address]).await;
        Err(error)
    }

    /// Remove episode `episode_id` and its video.
    pub async fn remove_episode(&self, episode_id: Uuid) -> Result<(), Error> {
        let owner = self.course_of_episode(episode_id).await?;
        let revision = self
            .modify(owner.id, move |course| course.remove_episode(episode_id).is_some())
            .await?;
        let CourseRevision::Saved { before, .. } = revision else {
            return Err(Error::not_found(EPISODE_NOT_FOUND));
        };
        discard_files(
            self.ports.storage.as_ref(),
            before
                .episode(episode_id)
                .map(|episode| episode.video_address.clone()),
        )
        .await;
        info!(course_id = %owner.id, %episode_id, "removed episode");
        Ok(())
    }

    /// Apply `changes` to episode `episode_id`.
    ///
    /// A new `video` replaces the stored one and is probed again; otherwise
    /// the duration and address are kept.
    pub async fn edit_episode(
        &self,
        episode_id: Uuid,
        changes: EpisodeChanges,
        video: Option<IncomingFile>,
    ) -> Result<Episode, Error> {
        let owner = self.course_of_episode(episode_id).await?;
        let new_video = match video {
            Some(file) => Some(self.store_video(&file).await?),
            None => None,
        };

        let replacement = new_video.clone();
        let revision = self
            .modify(owner.id, move |course| {
                let Some(episode) = course.episode_mut(episode_id) else {
                    return false;
                };
                changes.apply(episode);
                if let Some((address, time)) = replacement {
                    episode.video_address = address;
                    episode.time = time;
                }
                true
            })
            .await;
        let error = match revision {
            Ok(CourseRevision::Saved { before, after }) => {
                if new_video.is_some() {
                    discard_files(
                        self.ports.storage.as_ref(),
                        before
                            .episode(episode_id)
                            .map(|episode| episode.video_address.clone()),
                    )
                    .await;
                }
                return after
                    .episode(episode_id)
                    .cloned()
                    .ok_or_else(|| Error::not_found(EPISODE_NOT_FOUND));
            }
            Ok(_) => Error::not_found(EPISODE_NOT_FOUND),
            Err(error) => error,
        };
        discard_files(
            self.ports.storage.as_ref(),
            new_video.map(|(address, _)| address),
        )
        .await;
        Err(error)
    }

    async fn modify(
        &self,
        id: Uuid,
        edit: impl FnOnce(&mut Course) -> bool + Send + 'static,
    ) -> Result<CourseRevision, Error> {
        self.ports
            .courses
            .modify(id, Box::new(edit))
            .await
            .map_err(map_course_error)
    }

    async fn course_of_chapter(&self, chapter_id: Uuid) -> Result<Course, Error> {
        self.ports
            .courses
            .find_by_chapter(chapter_id)
            .await
            .map_err(map_course_error)?
            .ok_or_else(|| Error::not_found(CHAPTER_NOT_FOUND))
    }

    async fn course_of_episode(&self, episode_id: Uuid) -> Result<Course, Error> {
        self.ports
            .courses
            .find_by_episode(episode_id)
            .await
            .map_err(map_course_error)?
            .ok_or_else(|| Error::not_found(EPISODE_NOT_FOUND))
    }

    async fn ensure_category(&self, id: Uuid) -> Result<(), Error> {
        self.ports
            .categories
            .find_by_id(id)
            .await
            .map_err(map_category_error)?
            .map(|_| ())
            .ok_or_else(|| Error::not_found("Category not found"))
    }

    /// Store an episode video and measure it. Returns the stored path and
    /// the formatted duration.
    async fn store_video(&self, video: &IncomingFile) -> Result<(String, String), Error> {
        let now = self.ports.clock.utc();
        let address = store_upload(
            self.ports.storage.as_ref(),
            UploadKind::Episodes,
            MediaClass::Video,
            video,
            now,
        )
        .await?;
        match self.probe(&address).await {
            Ok(time) => Ok((address, time)),
            Err(error) => {
                discard_files(self.ports.storage.as_ref(), [address]).await;
                Err(error)
            }
        }
    }

    async fn probe(&self, address: &str) -> Result<String, Error> {
        let path = self
            .ports
            .storage
            .resolve(address)
            .map_err(map_storage_error)?;
        let seconds = self
            .ports
            .probe
            .probe(&path)
            .await
            .map_err(map_probe_error)?;
        debug!(%address, seconds, "probed episode video");
        Ok(format_duration(seconds))
    }
}

#[cfg(test)]
#[path = "course_service_tests.rs"]
mod tests;
