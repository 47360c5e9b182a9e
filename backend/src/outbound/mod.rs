//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL repositories using Diesel
//! - **cache**: Redis refresh token store
//! - **memory**: in-process repositories for tests and database-less runs
//! - **security**: JWT signing and Argon2 password hashing
//! - **storage**: uploads on the local filesystem
//! - **media**: `ffprobe` video duration probe
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no business rules.

pub mod cache;
pub mod media;
pub mod memory;
pub mod persistence;
pub mod security;
pub mod storage;
