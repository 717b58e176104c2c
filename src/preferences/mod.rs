//! Persisted user preferences: the selected language and its catalog.

mod backend;
mod catalog;
mod store;

pub use backend::{FileBackend, MemoryBackend, PreferenceBackend, PreferenceError, LANGUAGE_KEY};
pub use catalog::{fallback_languages, placeholder_language, LanguageSource};
pub use store::PreferenceStore;
