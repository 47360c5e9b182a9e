//! Test utilities for the backend crate.
//!
//! This module provides shared helpers for both unit tests (in `src/`) and
//! integration tests (in `tests/`). It is only compiled when running tests
//! or with the `test-support` feature.

pub mod backend;
pub mod clock;
pub mod media;
pub mod multipart;

pub use backend::{TEST_BASE_URL, TEST_VIDEO_SECONDS, TestBackend};
pub use clock::MutableClock;
pub use media::{FixedDurationProbe, TempUploads};
pub use multipart::MultipartBody;
