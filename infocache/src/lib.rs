//! Read-through cache and event-driven cache-warming pipeline.
//!
//! Client reads go through [`cache::CacheAccessor`]: cache hit from the
//! external key-value store, otherwise an upstream fetch whose result is
//! returned immediately and published onto the message bus. Bus consumers
//! on this and other instances converge the cached value asynchronously
//! via the typed workers in [`workers`]. A periodic job ([`popular`])
//! re-injects the most requested keys into the same pipeline.

pub mod bus;
pub mod cache;
pub mod fetch;
pub mod keys;
pub mod models;
pub mod popular;
pub mod requestlog;
pub mod store;
pub mod users;
pub mod workers;

#[cfg(test)]
pub(crate) mod testutil;
