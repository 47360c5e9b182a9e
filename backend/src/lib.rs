//! Campus backend: OTP sign-in, role based administration, a category
//! tree, blogs, store products, courses and a coffee menu behind a
//! versioned REST API, plus recipes, teams with invitations and personal
//! projects for signed-in users.
//!
//! The crate follows a hexagonal layout. `domain` holds types, ports and
//! services; `inbound` exposes them over HTTP; `outbound` implements the
//! ports against PostgreSQL, Redis, the filesystem and `ffprobe`.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
