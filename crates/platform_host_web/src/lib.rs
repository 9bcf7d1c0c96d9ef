//! Browser (`wasm32`) implementations of [`platform_host`] service contracts.
//!
//! Off `wasm32` the adapters compile to inert fallbacks so the workspace builds and tests
//! natively.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod storage;

pub use storage::local_prefs::WebPrefsStore;
