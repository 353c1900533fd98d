//! Client side of unmessify.
//!
//! This crate provides the HTTP fetch seam and the offline worker that sits
//! in front of it: install, activate, cache-first interception, background
//! refresh and notification handling.

pub mod fetch;
pub mod worker;

pub use fetch::{
    Destination, FetchClient, FetchConfig, FetchResponse, Fetcher, Method, Request, ResponseKind, Scope, StatusCode, UrlError,
    canonicalize,
};

pub use worker::{
    ClickOutcome, Dispatcher, DispatcherHandle, InstallReport, Intercepted, Notification, PathFailure, RefreshReport,
    SYNC_TAG, Served, Worker, WorkerEvent, WorkerState, WorkerStatus,
};
