//! Upload policy and storage paths.
//!
//! Files land under
//! `uploads/<kind>/<yyyy>/<mm>/<dd>/<unix-millis>-<random><.ext>` relative to
//! the upload root. The month is 1-based and zero padded.

use std::fmt;

use chrono::{DateTime, Datelike, Utc};
use uuid::Uuid;

use super::sanitize::FieldViolation;

/// Which content type an upload belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UploadKind {
    Blogs,
    Products,
    Courses,
    Episodes,
    Recipes,
    Projects,
    Coffees,
}

impl UploadKind {
    /// Directory name under `uploads/`.
    pub const fn dir_name(self) -> &'static str {
        match self {
            Self::Blogs => "blogs",
            Self::Products => "products",
            Self::Courses => "courses",
            Self::Episodes => "episodes",
            Self::Recipes => "recipes",
            Self::Projects => "projects",
            Self::Coffees => "coffees",
        }
    }
}

impl fmt::Display for UploadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Accepted media families and their limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaClass {
    Image,
    Video,
}

const IMAGE_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".webp", ".gif"];
const VIDEO_EXTENSIONS: &[&str] = &[".mp4", ".mpg", ".mov", ".mkv", ".avi"];

impl MediaClass {
    /// Largest accepted file, in bytes.
    pub const fn max_bytes(self) -> u64 {
        match self {
            Self::Image => 1024 * 1024,
            Self::Video => 300 * 1024 * 1024,
        }
    }

    /// Lowercase extensions including the leading dot.
    pub const fn extensions(self) -> &'static [&'static str] {
        match self {
            Self::Image => IMAGE_EXTENSIONS,
            Self::Video => VIDEO_EXTENSIONS,
        }
    }

    /// Field name and noun used in validation messages.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
        }
    }
}

/// Lowercased extension of `file_name`, including the dot.
pub fn extension_of(file_name: &str) -> Option<String> {
    let (_, ext) = file_name.rsplit_once('.')?;
    if ext.is_empty() || ext.contains(['/', '\\']) {
        return None;
    }
    Some(format!(".{}", ext.to_ascii_lowercase()))
}

/// Check an incoming file against `class` and return its extension.
///
/// # Examples
/// ```
/// use campus::domain::upload::{MediaClass, check_upload};
///
/// assert_eq!(check_upload(MediaClass::Image, "cover.PNG", 10).as_deref(), Ok(".png"));
/// assert!(check_upload(MediaClass::Image, "cover.mp4", 10).is_err());
/// ```
pub fn check_upload(
    class: MediaClass,
    file_name: &str,
    size: u64,
) -> Result<String, FieldViolation> {
    let field = class.label();
    let extension = extension_of(file_name)
        .filter(|ext| class.extensions().contains(&ext.as_str()))
        .ok_or_else(|| {
            FieldViolation::new(field, format!("The {field} format is not supported"))
        })?;
    if size > class.max_bytes() {
        return Err(too_large(class));
    }
    Ok(extension)
}

/// Violation reported for a file over [`MediaClass::max_bytes`].
pub fn too_large(class: MediaClass) -> FieldViolation {
    let field = class.label();
    FieldViolation::new(
        field,
        format!("The {field} is larger than {} bytes", class.max_bytes()),
    )
}

/// Path of a new upload relative to the upload root.
///
/// The file name is the upload time in milliseconds plus a random suffix, so
/// uploads landing in the same millisecond get distinct paths.
pub fn relative_upload_path(kind: UploadKind, extension: &str, now: DateTime<Utc>) -> String {
    let nonce = Uuid::new_v4().simple().to_string();
    format!(
        "uploads/{kind}/{year:04}/{month:02}/{day:02}/{millis}-{suffix}{extension}",
        year = now.year(),
        month = now.month(),
        day = now.day(),
        millis = now.timestamp_millis(),
        suffix = &nonce[..12],
    )
}

/// Public URL of a stored file.
pub fn public_url(base_url: &str, relative_path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        relative_path.trim_start_matches('/')
    )
}

/// A file received from a client, already written to a temporary location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingFile {
    pub temp_path: std::path::PathBuf,
    pub file_name: String,
    pub size: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    #[rstest]
    fn path_uses_one_based_padded_month() {
        let now = Utc
            .with_ymd_and_hms(2026, 1, 5, 8, 0, 0)
            .single()
            .expect("fixture timestamp");
        let path = relative_upload_path(UploadKind::Courses, ".png", now);
        let prefix = format!("uploads/courses/2026/01/05/{}-", now.timestamp_millis());
        let suffix = path
            .strip_prefix(&prefix)
            .and_then(|rest| rest.strip_suffix(".png"))
            .expect("dated path with extension");
        assert_eq!(suffix.len(), 12);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[rstest]
    fn uploads_in_the_same_millisecond_get_distinct_paths() {
        let now = Utc::now();
        let first = relative_upload_path(UploadKind::Blogs, ".jpg", now);
        let second = relative_upload_path(UploadKind::Blogs, ".jpg", now);
        assert_ne!(first, second);
    }

    #[rstest]
    #[case(MediaClass::Image, "a.jpeg", 1024 * 1024, true)]
    #[case(MediaClass::Image, "a.jpeg", 1024 * 1024 + 1, false)]
    #[case(MediaClass::Image, "a", 1, false)]
    #[case(MediaClass::Video, "clip.MKV", 5, true)]
    #[case(MediaClass::Video, "clip.webm", 5, false)]
    #[case(MediaClass::Video, "clip.avi", 300 * 1024 * 1024 + 1, false)]
    fn upload_policy(
        #[case] class: MediaClass,
        #[case] name: &str,
        #[case] size: u64,
        #[case] ok: bool,
    ) {
        assert_eq!(check_upload(class, name, size).is_ok(), ok);
    }

    #[rstest]
    #[case("http://localhost:8080", "uploads/a.png", "http://localhost:8080/uploads/a.png")]
    #[case("http://cdn/", "/uploads/a.png", "http://cdn/uploads/a.png")]
    fn public_urls_join_with_one_slash(
        #[case] base: &str,
        #[case] path: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(public_url(base, path), expected);
    }
}
