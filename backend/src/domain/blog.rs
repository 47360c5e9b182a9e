//! Blog posts.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::sanitize::{FieldViolation, bounded_text, clean_list, clean_text, required_text, tag_list};
use super::UserId;

const TEXT_MIN: usize = 3;
const TEXT_MAX: usize = 255;
/// Maximum number of tags on a post.
pub const MAX_TAGS: usize = 20;

/// A stored blog post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blog {
    pub id: Uuid,
    pub author: UserId,
    pub title: String,
    pub short_text: String,
    pub text: String,
    /// Path relative to the upload root.
    pub image: Option<String>,
    pub tags: Vec<String>,
    pub category: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public identity of a post's author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorSummary {
    pub id: UserId,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub mobile: String,
}

/// A post joined with its author and category title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlogView {
    pub blog: Blog,
    pub author: Option<AuthorSummary>,
    pub category_title: Option<String>,
}

/// Validated input for a new post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlogDraft {
    pub title: String,
    pub short_text: String,
    pub text: String,
    pub tags: Vec<String>,
    pub category: Uuid,
}

impl BlogDraft {
    /// Validate the raw fields.
    pub fn try_from_parts(
        title: &str,
        short_text: &str,
        text: &str,
        tags: Vec<String>,
        category: Uuid,
    ) -> Result<Self, FieldViolation> {
        Ok(Self {
            title: bounded_text("title", "title", title, TEXT_MIN, TEXT_MAX)?,
            short_text: bounded_text("shortText", "short text", short_text, TEXT_MIN, TEXT_MAX)?,
            text: required_text("text", "text", text)?,
            tags: tag_list(tags, MAX_TAGS)?,
            category,
        })
    }

    /// Materialise the post.
    pub fn into_blog(
        self,
        author: UserId,
        image: Option<String>,
        now: DateTime<Utc>,
    ) -> Blog {
        Blog {
            id: Uuid::new_v4(),
            author,
            title: self.title,
            short_text: self.short_text,
            text: self.text,
            image,
            tags: self.tags,
            category: self.category,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Sparse update of a post. The author cannot be changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlogChanges {
    pub title: Option<String>,
    pub short_text: Option<String>,
    pub text: Option<String>,
    pub tags: Option<Vec<String>>,
    pub category: Option<Uuid>,
}

impl BlogChanges {
    /// Validate present fields; nullish values are dropped.
    pub fn try_from_parts(
        title: Option<String>,
        short_text: Option<String>,
        text: Option<String>,
        tags: Option<Vec<String>>,
        category: Option<Uuid>,
    ) -> Result<Self, FieldViolation> {
        Ok(Self {
            title: clean_text(title)
                .map(|v| bounded_text("title", "title", &v, TEXT_MIN, TEXT_MAX))
                .transpose()?,
            short_text: clean_text(short_text)
                .map(|v| bounded_text("shortText", "short text", &v, TEXT_MIN, TEXT_MAX))
                .transpose()?,
            text: clean_text(text),
            tags: clean_list(tags).map(|t| tag_list(t, MAX_TAGS)).transpose()?,
            category: category.filter(|id| !id.is_nil()),
        })
    }

    /// Apply onto `blog`.
    pub fn apply(self, blog: &mut Blog, now: DateTime<Utc>) {
        if let Some(title) = self.title {
            blog.title = title;
        }
        if let Some(short_text) = self.short_text {
            blog.short_text = short_text;
        }
        if let Some(text) = self.text {
            blog.text = text;
        }
        if let Some(tags) = self.tags {
            blog.tags = tags;
        }
        if let Some(category) = self.category {
            blog.category = category;
        }
        blog.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn draft() -> BlogDraft {
        BlogDraft::try_from_parts(
            " Async Rust ",
            "Futures explained",
            "Long body",
            vec!["rust".into(), " ".into()],
            Uuid::new_v4(),
        )
        .expect("valid draft")
    }

    #[rstest]
    fn draft_trims_and_drops_blank_tags() {
        let draft = draft();
        assert_eq!(draft.title, "Async Rust");
        assert_eq!(draft.tags, vec!["rust".to_owned()]);
    }

    #[rstest]
    #[case("ab", "short", "title")]
    #[case("title", "ab", "shortText")]
    fn draft_rejects_short_fields(#[case] title: &str, #[case] short: &str, #[case] field: &str) {
        let err = BlogDraft::try_from_parts(title, short, "body", Vec::new(), Uuid::new_v4())
            .expect_err("invalid draft");
        assert_eq!(err.field(), field);
    }

    #[rstest]
    fn changes_keep_untouched_fields() {
        let mut blog = draft().into_blog(UserId::random(), None, Utc::now());
        let original_category = blog.category;
        BlogChanges::try_from_parts(Some(String::new()), None, Some("New body".into()), None, None)
            .expect("valid changes")
            .apply(&mut blog, Utc::now());

        assert_eq!(blog.title, "Async Rust");
        assert_eq!(blog.text, "New body");
        assert_eq!(blog.category, original_category);
    }
}
