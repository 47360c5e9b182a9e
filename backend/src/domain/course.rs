//! Courses with nested chapters and episodes.
//!
//! Chapters and episodes live inside the course aggregate and are persisted
//! with it; they are addressed by their own ids across all courses.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::duration;
use super::sanitize::{
    FieldViolation, bounded_text, clean_list, clean_number, clean_text, non_negative,
    required_text, tag_list,
};
use super::UserId;

const TITLE_MIN: usize = 3;
const TITLE_MAX: usize = 255;
/// Maximum number of tags per course.
pub const MAX_TAGS: usize = 20;

/// Message returned when a free course carries a price.
pub const FREE_COURSE_PRICE_MESSAGE: &str = "For free courses, price should be 0";

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal { $($variant:ident => $wire:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Wire representation.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = FieldViolation;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                $(
                    if trimmed.eq_ignore_ascii_case($wire) {
                        return Ok(Self::$variant);
                    }
                )+
                Err(FieldViolation::new($field, concat!("Your ", $field, " is invalid")))
            }
        }
    };
}

wire_enum! {
    /// How a course is sold.
    CourseKind, "type" {
        Free => "free",
        Cash => "cash",
        Special => "special",
    }
}

wire_enum! {
    /// Production state of a course.
    CourseStatus, "status" {
        NotStarted => "NotStarted",
        Completed => "Completed",
        Holding => "Holding",
    }
}

wire_enum! {
    /// Whether an episode is freely viewable.
    EpisodeKind, "type" {
        Lock => "lock",
        Unlock => "unlock",
    }
}

/// A single video lesson.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Episode {
    pub id: Uuid,
    pub title: String,
    pub text: String,
    pub kind: EpisodeKind,
    /// Duration formatted as `HH:MM:SS`.
    pub time: String,
    /// Video path relative to the upload root.
    pub video_address: String,
}

/// A group of episodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    pub id: Uuid,
    pub title: String,
    pub text: String,
    pub episodes: Vec<Episode>,
}

/// A stored course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub short_desc: String,
    pub full_desc: String,
    /// Cover image path relative to the upload root.
    pub image: String,
    pub tags: Vec<String>,
    pub category: Uuid,
    pub price: i64,
    pub discount: i64,
    pub kind: CourseKind,
    pub status: CourseStatus,
    pub instructor: UserId,
    pub chapters: Vec<Chapter>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Course {
    /// Sum of all episode durations as `HH:MM:SS`.
    pub fn total_time(&self) -> String {
        duration::total_time(
            self.chapters
                .iter()
                .flat_map(|chapter| chapter.episodes.iter())
                .map(|episode| episode.time.as_str()),
        )
    }

    /// Case-insensitive match over title and descriptions.
    pub fn matches_search(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        [&self.title, &self.short_desc, &self.full_desc]
            .into_iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }

    /// Chapter `id`, if present.
    pub fn chapter(&self, id: Uuid) -> Option<&Chapter> {
        self.chapters.iter().find(|chapter| chapter.id == id)
    }

    /// Episode `id` in any chapter.
    pub fn episode(&self, id: Uuid) -> Option<&Episode> {
        self.chapters
            .iter()
            .flat_map(|chapter| chapter.episodes.iter())
            .find(|episode| episode.id == id)
    }

    /// Mutable access to chapter `id`.
    pub fn chapter_mut(&mut self, id: Uuid) -> Option<&mut Chapter> {
        self.chapters.iter_mut().find(|chapter| chapter.id == id)
    }

    /// Remove chapter `id`, returning it.
    pub fn remove_chapter(&mut self, id: Uuid) -> Option<Chapter> {
        let position = self.chapters.iter().position(|chapter| chapter.id == id)?;
        Some(self.chapters.remove(position))
    }

    /// Mutable access to episode `id` in any chapter.
    pub fn episode_mut(&mut self, id: Uuid) -> Option<&mut Episode> {
        self.chapters
            .iter_mut()
            .flat_map(|chapter| chapter.episodes.iter_mut())
            .find(|episode| episode.id == id)
    }

    /// Remove episode `id` from whichever chapter holds it.
    pub fn remove_episode(&mut self, id: Uuid) -> Option<Episode> {
        self.chapters.iter_mut().find_map(|chapter| {
            let position = chapter.episodes.iter().position(|episode| episode.id == id)?;
            Some(chapter.episodes.remove(position))
        })
    }

    /// Video paths of every episode.
    pub fn video_addresses(&self) -> impl Iterator<Item = &str> {
        self.chapters
            .iter()
            .flat_map(|chapter| chapter.episodes.iter())
            .map(|episode| episode.video_address.as_str())
    }
}

/// Ensure free courses are not priced.
///
/// # Examples
/// ```
/// use campus::domain::course::{CourseKind, check_pricing};
///
/// assert!(check_pricing(CourseKind::Free, 0).is_ok());
/// assert!(check_pricing(CourseKind::Free, 10).is_err());
/// assert!(check_pricing(CourseKind::Cash, 10).is_ok());
/// ```
pub fn check_pricing(kind: CourseKind, price: i64) -> Result<(), FieldViolation> {
    if kind == CourseKind::Free && price > 0 {
        return Err(FieldViolation::new("price", FREE_COURSE_PRICE_MESSAGE));
    }
    Ok(())
}

/// Raw fields of a new course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseDraftInput {
    pub title: String,
    pub short_desc: String,
    pub full_desc: String,
    pub tags: Vec<String>,
    pub category: Uuid,
    pub price: i64,
    pub discount: i64,
    pub kind: String,
    pub status: Option<String>,
}

/// Validated input for a new course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseDraft {
    pub title: String,
    pub short_desc: String,
    pub full_desc: String,
    pub tags: Vec<String>,
    pub category: Uuid,
    pub price: i64,
    pub discount: i64,
    pub kind: CourseKind,
    pub status: CourseStatus,
}

impl CourseDraft {
    /// Validate `input`; the status defaults to `NotStarted`.
    pub fn try_from_input(input: CourseDraftInput) -> Result<Self, FieldViolation> {
        let kind: CourseKind = input.kind.parse()?;
        let price = non_negative("price", "price", input.price)?;
        check_pricing(kind, price)?;
        Ok(Self {
            title: bounded_text("title", "title", &input.title, TITLE_MIN, TITLE_MAX)?,
            short_desc: required_text("shortDesc", "short description", &input.short_desc)?,
            full_desc: required_text("fullDesc", "description", &input.full_desc)?,
            tags: tag_list(input.tags, MAX_TAGS)?,
            category: input.category,
            price,
            discount: non_negative("discount", "discount", input.discount)?,
            kind,
            status: clean_text(input.status)
                .map(|s| s.parse())
                .transpose()?
                .unwrap_or(CourseStatus::NotStarted),
        })
    }

    /// Materialise the course.
    pub fn into_course(self, instructor: UserId, image: String, now: DateTime<Utc>) -> Course {
        Course {
            id: Uuid::new_v4(),
            title: self.title,
            short_desc: self.short_desc,
            full_desc: self.full_desc,
            image,
            tags: self.tags,
            category: self.category,
            price: self.price,
            discount: self.discount,
            kind: self.kind,
            status: self.status,
            instructor,
            chapters: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Raw sparse update of a course.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseChangesInput {
    pub title: Option<String>,
    pub short_desc: Option<String>,
    pub full_desc: Option<String>,
    pub tags: Option<Vec<String>>,
    pub category: Option<Uuid>,
    pub price: Option<i64>,
    pub discount: Option<i64>,
    pub kind: Option<String>,
    pub status: Option<String>,
}

/// Validated sparse update. Chapters and the instructor are not editable
/// through this path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseChanges {
    title: Option<String>,
    short_desc: Option<String>,
    full_desc: Option<String>,
    tags: Option<Vec<String>>,
    category: Option<Uuid>,
    price: Option<i64>,
    discount: Option<i64>,
    kind: Option<CourseKind>,
    status: Option<CourseStatus>,
}

impl CourseChanges {
    /// Validate present fields; nullish values are dropped.
    pub fn try_from_input(input: CourseChangesInput) -> Result<Self, FieldViolation> {
        Ok(Self {
            title: clean_text(input.title)
                .map(|v| bounded_text("title", "title", &v, TITLE_MIN, TITLE_MAX))
                .transpose()?,
            short_desc: clean_text(input.short_desc),
            full_desc: clean_text(input.full_desc),
            tags: clean_list(input.tags)
                .map(|t| tag_list(t, MAX_TAGS))
                .transpose()?,
            category: input.category.filter(|id| !id.is_nil()),
            price: clean_number(input.price)
                .map(|v| non_negative("price", "price", v))
                .transpose()?,
            discount: clean_number(input.discount)
                .map(|v| non_negative("discount", "discount", v))
                .transpose()?,
            kind: clean_text(input.kind).map(|k| k.parse()).transpose()?,
            status: clean_text(input.status).map(|s| s.parse()).transpose()?,
        })
    }

    /// Category the update moves to, if any.
    pub fn category(&self) -> Option<Uuid> {
        self.category
    }

    /// Apply onto `course`, rejecting a free course that ends up priced.
    ///
    /// A zero price is nullish, so switching to `free` without a price
    /// clears the stored one.
    pub fn apply(self, course: &mut Course, now: DateTime<Utc>) -> Result<(), FieldViolation> {
        let kind = self.kind.unwrap_or(course.kind);
        let price = match (self.kind, self.price) {
            (_, Some(price)) => price,
            (Some(CourseKind::Free), None) => 0,
            (_, None) => course.price,
        };
        check_pricing(kind, price)?;
        if let Some(title) = self.title {
            course.title = title;
        }
        if let Some(short_desc) = self.short_desc {
            course.short_desc = short_desc;
        }
        if let Some(full_desc) = self.full_desc {
            course.full_desc = full_desc;
        }
        if let Some(tags) = self.tags {
            course.tags = tags;
        }
        if let Some(category) = self.category {
            course.category = category;
        }
        if let Some(discount) = self.discount {
            course.discount = discount;
        }
        if let Some(status) = self.status {
            course.status = status;
        }
        course.kind = kind;
        course.price = price;
        course.updated_at = now;
        Ok(())
    }
}

/// Validated input for a new chapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterDraft {
    pub title: String,
    pub text: String,
}

impl ChapterDraft {
    /// Validate raw fields.
    pub fn try_from_parts(title: &str, text: &str) -> Result<Self, FieldViolation> {
        Ok(Self {
            title: bounded_text("title", "chapter title", title, TITLE_MIN, TITLE_MAX)?,
            text: text.trim().to_owned(),
        })
    }

    /// Materialise an empty chapter.
    pub fn into_chapter(self) -> Chapter {
        Chapter {
            id: Uuid::new_v4(),
            title: self.title,
            text: self.text,
            episodes: Vec::new(),
        }
    }
}

/// Sparse chapter update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChapterChanges {
    pub title: Option<String>,
    pub text: Option<String>,
}

impl ChapterChanges {
    /// Validate present fields; nullish values are dropped.
    pub fn try_from_parts(title: Option<String>, text: Option<String>) -> Result<Self, FieldViolation> {
        Ok(Self {
            title: clean_text(title)
                .map(|v| bounded_text("title", "chapter title", &v, TITLE_MIN, TITLE_MAX))
                .transpose()?,
            text: clean_text(text),
        })
    }

    /// True when nothing would change.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.text.is_none()
    }

    /// Apply onto `chapter`.
    pub fn apply(self, chapter: &mut Chapter) {
        if let Some(title) = self.title {
            chapter.title = title;
        }
        if let Some(text) = self.text {
            chapter.text = text;
        }
    }
}

/// Validated input for a new episode, minus the probed video details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeDraft {
    pub title: String,
    pub text: String,
    pub kind: EpisodeKind,
}

impl EpisodeDraft {
    /// Validate raw fields.
    pub fn try_from_parts(title: &str, text: &str, kind: &str) -> Result<Self, FieldViolation> {
        Ok(Self {
            title: bounded_text("title", "episode title", title, TITLE_MIN, TITLE_MAX)?,
            text: required_text("text", "text", text)?,
            kind: kind.parse()?,
        })
    }

    /// Materialise the episode.
    pub fn into_episode(self, time: String, video_address: String) -> Episode {
        Episode {
            id: Uuid::new_v4(),
            title: self.title,
            text: self.text,
            kind: self.kind,
            time,
            video_address,
        }
    }
}

/// Sparse episode update. A replacement video is handled by the service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EpisodeChanges {
    pub title: Option<String>,
    pub text: Option<String>,
    pub kind: Option<EpisodeKind>,
}

impl EpisodeChanges {
    /// Validate present fields; nullish values are dropped.
    pub fn try_from_parts(
        title: Option<String>,
        text: Option<String>,
        kind: Option<String>,
    ) -> Result<Self, FieldViolation> {
        Ok(Self {
            title: clean_text(title)
                .map(|v| bounded_text("title", "episode title", &v, TITLE_MIN, TITLE_MAX))
                .transpose()?,
            text: clean_text(text),
            kind: clean_text(kind).map(|k| k.parse()).transpose()?,
        })
    }

    /// Apply onto `episode`.
    pub fn apply(self, episode: &mut Episode) {
        if let Some(title) = self.title {
            episode.title = title;
        }
        if let Some(text) = self.text {
            episode.text = text;
        }
        if let Some(kind) = self.kind {
            episode.kind = kind;
        }
    }
}
