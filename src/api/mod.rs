//! HTTP client for the remote content service.

mod client;
mod error;
mod types;

pub use client::{resolve_base_url, ApiClient, DEFAULT_LANGUAGE};
pub use error::ApiError;
pub use types::{
    AudioMap, AudioSource, Direction, Language, LanguageList, Revelation, SearchHit,
    SearchResults, Surah, SurahDetail, SurahList, Verse, VerseDetail, SURAH_COUNT,
};
