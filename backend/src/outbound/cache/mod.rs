//! Redis-backed key-value adapters.

mod redis_refresh_token_store;

pub use redis_refresh_token_store::{RedisRefreshTokenStore, refresh_token_key};
