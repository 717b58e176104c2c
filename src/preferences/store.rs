use std::sync::Arc;

use tokio::sync::{watch, OnceCell};

use crate::api::Language;
use crate::preferences::backend::{PreferenceBackend, PreferenceError};
use crate::preferences::catalog::{fallback_languages, placeholder_language, LanguageSource};

/// Holds the active language code and the language catalog.
///
/// The code is read from the backend once at construction and written back
/// on every assignment. Pages hold an `Arc<PreferenceStore>` and subscribe
/// to changes instead of reading ambient state.
pub struct PreferenceStore {
    backend: Arc<dyn PreferenceBackend>,
    language: watch::Sender<String>,
    catalog: OnceCell<Vec<Language>>,
}

impl PreferenceStore {
    /// Open the store, falling back to `default_language` when nothing is
    /// persisted or the persisted data cannot be read.
    pub fn open(backend: Arc<dyn PreferenceBackend>, default_language: &str) -> Self {
        let persisted = match backend.load_language() {
            Ok(code) => code,
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring unreadable language preference");
                None
            }
        };

        let language = match persisted {
            Some(code) => code,
            None => {
                if let Err(e) = backend.save_language(default_language) {
                    tracing::warn!(error = %e, "Could not persist default language");
                }
                default_language.to_string()
            }
        };

        let (sender, _) = watch::channel(language);
        Self {
            backend,
            language: sender,
            catalog: OnceCell::new(),
        }
    }

    /// The active language code.
    pub fn language(&self) -> String {
        self.language.borrow().clone()
    }

    /// Persist `code` and make it active.
    ///
    /// The in-memory value only changes once the backend has accepted it.
    pub fn set_language(&self, code: &str) -> Result<(), PreferenceError> {
        self.backend.save_language(code)?;
        let changed = self.language.send_if_modified(|current| {
            if current == code {
                return false;
            }
            *current = code.to_string();
            true
        });
        if changed {
            tracing::info!(language = code, "Language changed");
        }
        Ok(())
    }

    /// Receiver that wakes whenever the active language changes.
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.language.subscribe()
    }

    /// Catalog loaded so far; empty until [`ensure_catalog`](Self::ensure_catalog) settles.
    pub fn languages(&self) -> Vec<Language> {
        self.catalog.get().cloned().unwrap_or_default()
    }

    pub fn is_catalog_loaded(&self) -> bool {
        self.catalog.initialized()
    }

    /// Load the catalog on first call; later calls reuse it.
    ///
    /// A failed or empty lookup installs the built-in fallback catalog.
    pub async fn ensure_catalog<S: LanguageSource>(&self, source: &S) -> &[Language] {
        self.catalog
            .get_or_init(|| async {
                match source.fetch_languages().await {
                    Ok(languages) if !languages.is_empty() => languages,
                    Ok(_) => {
                        tracing::warn!("Language catalog was empty, using built-in languages");
                        fallback_languages()
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Language catalog unavailable, using built-in languages");
                        fallback_languages()
                    }
                }
            })
            .await
    }

    /// Catalog record for the active code, or a placeholder. Never fails.
    pub fn current_language(&self) -> Language {
        let code = self.language();
        self.catalog
            .get()
            .and_then(|langs| langs.iter().find(|l| l.code == code).cloned())
            .unwrap_or_else(|| placeholder_language(&code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, Direction};
    use crate::preferences::backend::MemoryBackend;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: AtomicUsize,
        fail: bool,
    }

    impl LanguageSource for CountingSource {
        async fn fetch_languages(&self) -> Result<Vec<Language>, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(ApiError::Timeout { millis: 15000 })
            } else {
                Ok(vec![Language::new("fr", "French", "Français", Direction::Ltr)])
            }
        }
    }

    fn store_with(code: Option<&str>) -> PreferenceStore {
        let backend: Arc<dyn PreferenceBackend> = match code {
            Some(code) => Arc::new(MemoryBackend::with_language(code)),
            None => Arc::new(MemoryBackend::new()),
        };
        PreferenceStore::open(backend, "ur")
    }

    #[test]
    fn defaults_to_urdu_and_persists_it() {
        let backend = Arc::new(MemoryBackend::new());
        let store = PreferenceStore::open(backend.clone(), "ur");
        assert_eq!(store.language(), "ur");
        assert_eq!(backend.load_language().unwrap().as_deref(), Some("ur"));
    }

    #[test]
    fn reads_persisted_code() {
        assert_eq!(store_with(Some("en")).language(), "en");
    }

    #[test]
    fn placeholder_before_catalog_loads() {
        let store = store_with(Some("xx"));
        assert!(!store.is_catalog_loaded());
        let current = store.current_language();
        assert_eq!(current.code, "xx");
        assert_eq!(current.name, "xx");
        assert_eq!(current.direction, Direction::Ltr);
    }

    #[test]
    fn set_language_notifies_only_on_change() {
        let store = store_with(Some("ur"));
        let mut rx = store.subscribe();

        store.set_language("ur").unwrap();
        assert!(!rx.has_changed().unwrap());

        store.set_language("ar").unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), "ar");
    }

    #[tokio::test]
    async fn catalog_is_fetched_once() {
        let store = store_with(None);
        let source = CountingSource {
            calls: AtomicUsize::new(0),
            fail: false,
        };

        store.ensure_catalog(&source).await;
        store.ensure_catalog(&source).await;

        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.languages()[0].code, "fr");
    }

    #[tokio::test]
    async fn failed_catalog_uses_fallback() {
        let store = store_with(Some("ur"));
        let source = CountingSource {
            calls: AtomicUsize::new(0),
            fail: true,
        };

        let langs = store.ensure_catalog(&source).await;
        assert_eq!(langs.len(), 3);

        let current = store.current_language();
        assert_eq!(current.name, "Urdu");
        assert_eq!(current.direction, Direction::Rtl);
    }
}
