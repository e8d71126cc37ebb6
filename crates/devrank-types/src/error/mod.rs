//! Typed error definitions for devrank.
//!
//! Each domain gets its own enum. All errors are serializable so they can be
//! carried in logs and CLI JSON output unchanged.

mod collection;
mod config;
mod store;

pub use collection::CollectionError;
pub use config::ConfigError;
pub use store::StoreError;
