//! SQLite-backed versioned cache stores.
//!
//! This module provides persistent, named cache stores using SQLite
//! with async access via tokio-rusqlite. It supports:
//!
//! - Request-identity keys (SHA-256 of method and URL)
//! - Automatic schema migrations
//! - WAL mode for concurrent access
//! - Eviction of every store but the current version

pub mod connection;
pub mod entries;
pub mod hash;
pub mod migrations;
pub mod storage;
pub mod stores;

pub use crate::Error;

pub use connection::CacheDb;
pub use entries::{CachedResponse, RequestKey};
pub use storage::{CacheStorage, CacheStore, Caches, EvictionReport};
