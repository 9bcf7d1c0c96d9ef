//! Key-value storage contracts and adapters.

pub mod prefs;
