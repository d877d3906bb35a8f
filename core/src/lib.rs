//! Blocking client for GhostBin-compatible paste services.
//!
//! # Overview
//! Submits pastes (with optional password, expiration and highlighting
//! language), retrieves raw paste text, extracts paste ids from paste URLs,
//! and caches the server's language catalog used to validate `lang`.
//!
//! # Design
//! - `GhostbinClient` splits every operation into `build_*` (produces an
//!   `HttpRequest`) and `parse_*` (consumes an `HttpResponse`); the blocking
//!   wrappers run them through a `Transport`.
//! - The default `UreqTransport` never follows redirects, so the `Location`
//!   of a `303` submission response can be read directly.
//! - The transport is a constructor argument, so tests and embedders can
//!   swap in their own.

pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod http;

pub use catalog::{Category, Language, LanguageCatalog};
pub use client::{GhostbinClient, PasteForm};
pub use config::{ClientConfig, PasteDefaults, PasteOptions};
pub use error::{GhostbinError, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
