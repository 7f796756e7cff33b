//! Translations for the customer onboarding app.
//!
//! - [`splitter`] turns nested per-language sources into a namespaced store
//! - [`server`] serves that store over HTTP
//! - [`loader`] fetches, caches and falls back on the client side

pub mod cache;
pub mod config;
pub mod error;
pub mod i18n;
pub mod loader;
pub mod retry;
pub mod server;
pub mod splitter;
pub mod storage;
pub mod store;
