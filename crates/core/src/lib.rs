//! Core types and shared functionality for the unmessify offline data layer.
//!
//! This crate provides:
//! - Versioned cache stores with a SQLite backend
//! - The asset manifest cached for offline use
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod manifest;

pub use cache::{CacheDb, CacheStorage, CacheStore, CachedResponse, Caches, EvictionReport, RequestKey};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use manifest::AssetManifest;
