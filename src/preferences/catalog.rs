use std::future::Future;

use crate::api::{ApiClient, ApiError, Direction, Language};

/// Built-in catalog used when the languages lookup fails.
pub fn fallback_languages() -> Vec<Language> {
    vec![
        Language::new("ar", "Arabic", "العربية", Direction::Rtl),
        Language::new("en", "English", "English", Direction::Ltr),
        Language::new("ur", "Urdu", "اردو", Direction::Rtl),
    ]
}

/// Anything that can produce the supported language catalog.
pub trait LanguageSource: Sync {
    fn fetch_languages(&self) -> impl Future<Output = Result<Vec<Language>, ApiError>> + Send;
}

impl LanguageSource for ApiClient {
    fn fetch_languages(&self) -> impl Future<Output = Result<Vec<Language>, ApiError>> + Send {
        ApiClient::fetch_languages(self)
    }
}

/// Placeholder for a code the catalog does not know (yet).
pub fn placeholder_language(code: &str) -> Language {
    Language {
        code: code.to_string(),
        name: code.to_string(),
        native_name: String::new(),
        direction: Direction::Ltr,
    }
}
