//! Personal projects.
//!
//! A project belongs to the user who created it and is invisible to
//! everybody else: looking up someone else's project reports it missing.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::UserId;
use super::sanitize::{FieldViolation, bounded_text, clean_list, clean_text, tag_list};

const TITLE_MAX: usize = 255;
/// Shortest accepted project description, in characters.
pub const TEXT_MIN: usize = 20;
/// Maximum number of tags on a project.
pub const MAX_TAGS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub id: Uuid,
    pub owner: UserId,
    pub title: String,
    pub text: String,
    pub tags: Vec<String>,
    /// Path relative to the upload root.
    pub image: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn title(value: &str) -> Result<String, FieldViolation> {
    bounded_text("title", "project title", value, 1, TITLE_MAX)
}

fn text(value: &str) -> Result<String, FieldViolation> {
    bounded_text("text", "project description", value, TEXT_MIN, usize::MAX).map_err(|_| {
        FieldViolation::new(
            "text",
            format!("The project description must be at least {TEXT_MIN} characters"),
        )
    })
}

/// Validated input for a new project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDraft {
    pub title: String,
    pub text: String,
    pub tags: Vec<String>,
}

impl ProjectDraft {
    pub fn try_from_parts(
        title_raw: &str,
        text_raw: &str,
        tags: Vec<String>,
    ) -> Result<Self, FieldViolation> {
        Ok(Self {
            title: title(title_raw)?,
            text: text(text_raw)?,
            tags: tag_list(tags, MAX_TAGS)?,
        })
    }

    pub fn into_project(self, owner: UserId, image: String, now: DateTime<Utc>) -> Project {
        Project {
            id: Uuid::new_v4(),
            owner,
            title: self.title,
            text: self.text,
            tags: self.tags,
            image,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Sparse update of a project's text fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectChanges {
    pub title: Option<String>,
    pub text: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl ProjectChanges {
    /// Validate present fields; nullish values and empty tag lists are
    /// dropped.
    pub fn try_from_parts(
        title_raw: Option<String>,
        text_raw: Option<String>,
        tags: Option<Vec<String>>,
    ) -> Result<Self, FieldViolation> {
        Ok(Self {
            title: clean_text(title_raw).map(|v| title(&v)).transpose()?,
            text: clean_text(text_raw).map(|v| text(&v)).transpose()?,
            tags: clean_list(tags).map(|t| tag_list(t, MAX_TAGS)).transpose()?,
        })
    }

    pub fn apply(self, project: &mut Project, now: DateTime<Utc>) {
        if let Some(title) = self.title {
            project.title = title;
        }
        if let Some(text) = self.text {
            project.text = text;
        }
        if let Some(tags) = self.tags {
            project.tags = tags;
        }
        project.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const DESCRIPTION: &str = "A tracker for shared household chores";

    #[rstest]
    fn short_descriptions_are_rejected() {
        let error = ProjectDraft::try_from_parts("Chores", "Too short", Vec::new())
            .expect_err("short text");
        assert_eq!(error.field(), "text");
        assert_eq!(
            error.to_string(),
            "The project description must be at least 20 characters"
        );
    }

    #[rstest]
    fn at_most_ten_tags() {
        let tags = (0..11).map(|i| format!("t{i}")).collect();
        let error =
            ProjectDraft::try_from_parts("Chores", DESCRIPTION, tags).expect_err("too many tags");
        assert_eq!(error.field(), "tags");
    }

    #[rstest]
    fn blank_changes_keep_the_project() {
        let mut project = ProjectDraft::try_from_parts("Chores", DESCRIPTION, vec!["home".into()])
            .expect("draft")
            .into_project(UserId::random(), "uploads/projects/a.png".into(), Utc::now());
        ProjectChanges::try_from_parts(Some(" ".into()), None, Some(vec![" ".into()]))
            .expect("changes")
            .apply(&mut project, Utc::now());

        assert_eq!(project.title, "Chores");
        assert_eq!(project.tags, vec!["home".to_owned()]);
    }
}
