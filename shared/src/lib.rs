// shared/src/lib.rs

/// Error taxonomy for the whole pipeline.
///
/// Only `UpstreamFetch` and `Validation` are ever surfaced to a caller;
/// everything else is logged and recovered from locally.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("upstream fetch failed: {0}")]
    UpstreamFetch(String),
    #[error("store error: {0}")]
    Store(String),
    #[error("bus error: {0}")]
    Bus(String),
    #[error("bus publish failed: {0}")]
    BusPublish(String),
    #[error("malformed message: {0}")]
    MalformedMessage(String),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("database error: {0}")]
    Database(String),
}

pub type Result<T> = std::result::Result<T, Error>;

pub mod config;
