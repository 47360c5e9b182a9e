//! `multipart/form-data` reading for upload endpoints.
//!
//! Text parts are buffered in memory; file parts are streamed to a scratch
//! directory and handed to services as [`IncomingFile`]s. Each endpoint names
//! the file fields it accepts as [`FilePart`]s. The extension is checked
//! before a file part is spooled and the media size limit while it streams,
//! so an oversized or unexpected file aborts the request without being
//! written out in full. Spooled files the services did not move into storage
//! are removed when the form is dropped.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use actix_multipart::{Field, Multipart, MultipartError};
use futures_util::TryStreamExt;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::upload::{MediaClass, check_upload, too_large};
use crate::domain::{Error, FieldViolation, IncomingFile};

use super::ApiResult;

/// Largest text part accepted.
const MAX_TEXT_BYTES: usize = 64 * 1024;

fn malformed(err: MultipartError) -> Error {
    Error::invalid_request(format!("malformed multipart body: {err}"))
}

fn spool_failure(err: std::io::Error) -> Error {
    Error::internal(format!("failed to spool upload: {err}"))
}

/// `tags[]` and `tags` name the same field.
fn normalise_name(raw: &str) -> String {
    raw.trim().trim_end_matches("[]").to_owned()
}

/// A file field an endpoint accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilePart {
    name: &'static str,
    class: MediaClass,
    max_count: usize,
}

impl FilePart {
    /// One file of `class` under `name`.
    pub const fn single(name: &'static str, class: MediaClass) -> Self {
        Self::many(name, class, 1)
    }

    /// Up to `max_count` files of `class` under `name`.
    pub const fn many(name: &'static str, class: MediaClass, max_count: usize) -> Self {
        Self {
            name,
            class,
            max_count,
        }
    }

    fn too_many(&self) -> FieldViolation {
        let label = self.class.label();
        let message = if self.max_count == 1 {
            format!("Only one {label} is allowed")
        } else {
            format!("At most {} {label}s are allowed", self.max_count)
        };
        FieldViolation::new(self.name, message)
    }
}

/// A parsed multipart form.
#[derive(Debug, Default)]
pub struct UploadForm {
    fields: HashMap<String, Vec<String>>,
    files: HashMap<String, Vec<IncomingFile>>,
    spooled: Vec<PathBuf>,
}

impl UploadForm {
    /// Drain `payload`, spooling the file parts named in `accepted` into
    /// `scratch`.
    ///
    /// A file under any other name, a file beyond its field's count, a wrong
    /// extension or a file over its media limit rejects the whole form.
    pub async fn read(
        mut payload: Multipart,
        scratch: &Path,
        accepted: &[FilePart],
    ) -> ApiResult<Self> {
        let mut form = Self::default();
        while let Some(field) = payload.try_next().await.map_err(malformed)? {
            let Some(name) = field.name().map(normalise_name) else {
                continue;
            };
            let file_name = field
                .content_disposition()
                .and_then(|cd| cd.get_filename())
                .map(str::to_owned);
            match file_name {
                Some(file_name) if !file_name.trim().is_empty() => {
                    let part = accepted
                        .iter()
                        .find(|part| part.name == name)
                        .ok_or_else(|| {
                            Error::invalid_request(format!("Unexpected file field {name}"))
                        })?;
                    if form.files.get(&name).map_or(0, Vec::len) >= part.max_count {
                        return Err(part.too_many().into());
                    }
                    check_upload(part.class, &file_name, 0)?;
                    let file = form.spool(field, file_name, part.class, scratch).await?;
                    form.files.entry(name).or_default().push(file);
                }
                Some(_) => drain(field).await?,
                None => {
                    let value = read_text(field).await?;
                    form.fields.entry(name).or_default().push(value);
                }
            }
        }
        Ok(form)
    }

    async fn spool(
        &mut self,
        mut field: Field,
        file_name: String,
        class: MediaClass,
        scratch: &Path,
    ) -> ApiResult<IncomingFile> {
        fs::create_dir_all(scratch).await.map_err(spool_failure)?;
        let temp_path = scratch.join(format!("{}.part", Uuid::new_v4()));
        let mut file = File::create(&temp_path).await.map_err(spool_failure)?;
        self.spooled.push(temp_path.clone());

        let mut size: u64 = 0;
        while let Some(chunk) = field.try_next().await.map_err(malformed)? {
            size += chunk.len() as u64;
            if size > class.max_bytes() {
                debug!(%file_name, size, "rejected oversized upload mid-stream");
                return Err(too_large(class).into());
            }
            file.write_all(&chunk).await.map_err(spool_failure)?;
        }
        file.flush().await.map_err(spool_failure)?;
        debug!(%file_name, size, "spooled upload");

        Ok(IncomingFile {
            temp_path,
            file_name,
            size,
        })
    }

    /// First value of text field `name`.
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields.get(name).and_then(|values| values.first()).cloned()
    }

    /// Every value of text field `name`.
    ///
    /// A field sent once is split on commas, so `tags=a,b` and repeated
    /// `tags` parts are equivalent. Returns `None` when the field is absent.
    pub fn list(&self, name: &str) -> Option<Vec<String>> {
        let values = self.fields.get(name)?;
        match values.as_slice() {
            [single] => Some(single.split(',').map(str::to_owned).collect()),
            many => Some(many.to_vec()),
        }
    }

    /// Take the first file uploaded under `name`.
    pub fn take_file(&mut self, name: &str) -> Option<IncomingFile> {
        let files = self.files.get_mut(name)?;
        (!files.is_empty()).then(|| files.remove(0))
    }

    /// Take every file uploaded under `name`.
    pub fn take_files(&mut self, name: &str) -> Vec<IncomingFile> {
        self.files.remove(name).unwrap_or_default()
    }
}

impl Drop for UploadForm {
    fn drop(&mut self) {
        for path in &self.spooled {
            match std::fs::remove_file(path) {
                Ok(()) => {}
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => warn!(path = %path.display(), error = %err, "failed to remove spooled upload"),
            }
        }
    }
}

async fn read_text(mut field: Field) -> ApiResult<String> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.try_next().await.map_err(malformed)? {
        if bytes.len() + chunk.len() > MAX_TEXT_BYTES {
            return Err(Error::invalid_request("A form field is too large"));
        }
        bytes.extend_from_slice(&chunk);
    }
    String::from_utf8(bytes).map_err(|_| Error::invalid_request("Form fields must be UTF-8"))
}

async fn drain(mut field: Field) -> ApiResult<()> {
    while field.try_next().await.map_err(malformed)?.is_some() {}
    Ok(())
}
