//! Value objects returned by the remote content service.
//!
//! Everything here is created by deserializing a response body and is never
//! written back. Field names follow the wire format of the service.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Highest surah number.
pub const SURAH_COUNT: u16 = 114;

/// Where a surah was revealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Revelation {
    Meccan,
    Medinan,
    #[default]
    #[serde(other)]
    Unknown,
}

impl Revelation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Meccan => "meccan",
            Self::Medinan => "medinan",
            Self::Unknown => "unknown",
        }
    }
}

/// One chapter as it appears in listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Surah {
    pub id: u16,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub transliteration: String,
    #[serde(default)]
    pub translation: String,
    #[serde(rename = "type", default)]
    pub revelation: Revelation,
    #[serde(default)]
    pub total_verses: u32,
}

/// Payload of the surah listing endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SurahList {
    #[serde(default)]
    pub surahs: Vec<Surah>,
}

/// A surah together with its ordered verses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurahDetail {
    #[serde(flatten)]
    pub surah: Surah,
    #[serde(default)]
    pub verses: Vec<Verse>,
}

/// A recording of one verse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioSource {
    pub url: String,
    #[serde(default)]
    pub reciter: String,
}

/// Recordings keyed by reciter identifier.
pub type AudioMap = BTreeMap<String, AudioSource>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verse {
    pub id: u32,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub translation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<AudioMap>,
}

/// Payload of the single-verse endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerseDetail {
    pub surah: Surah,
    pub verse: Verse,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<AudioMap>,
}

impl VerseDetail {
    /// Recordings attached to the response, or to the verse itself.
    pub fn recordings(&self) -> Vec<&AudioSource> {
        self.audio
            .as_ref()
            .or(self.verse.audio.as_ref())
            .map(|audio| audio.values().collect())
            .unwrap_or_default()
    }
}

/// Text direction of a language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Ltr,
    Rtl,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "nativeName", default)]
    pub native_name: String,
    #[serde(default)]
    pub direction: Direction,
}

impl Language {
    pub fn new(code: &str, name: &str, native_name: &str, direction: Direction) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            native_name: native_name.to_string(),
            direction,
        }
    }
}

/// Payload of the languages endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LanguageList {
    #[serde(default)]
    pub languages: Vec<Language>,
}

/// One search match, normalised from either wire shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub surah_id: u16,
    pub verse_id: u32,
    /// Arabic surah name, empty when the service omits it.
    pub surah_name: String,
    pub surah_title: Option<String>,
    pub text: String,
    pub translation: String,
}

impl SearchHit {
    /// Display title, preferring the transliteration.
    pub fn title(&self) -> String {
        self.surah_title
            .clone()
            .unwrap_or_else(|| format!("Surah {}", self.surah_id))
    }
}

/// Ordered search matches exactly as ranked by the service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "SearchPayload")]
pub struct SearchResults {
    pub hits: Vec<SearchHit>,
}

impl SearchResults {
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

#[derive(Deserialize)]
struct SearchPayload {
    #[serde(default)]
    results: Option<Vec<RawSearchItem>>,
    #[serde(default)]
    verses: Option<Vec<RawSearchItem>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSearchItem {
    #[serde(default)]
    surah: Option<RawSurahRef>,
    #[serde(default)]
    verse: Option<RawVerseRef>,
    #[serde(default)]
    surah_id: Option<u16>,
    #[serde(default)]
    verse_id: Option<u32>,
    #[serde(default)]
    surah_name: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    translation: Option<String>,
}

#[derive(Deserialize)]
struct RawSurahRef {
    #[serde(default)]
    id: Option<u16>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    transliteration: Option<String>,
}

#[derive(Deserialize)]
struct RawVerseRef {
    #[serde(default)]
    id: Option<u32>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    translation: Option<String>,
}

impl From<SearchPayload> for SearchResults {
    fn from(payload: SearchPayload) -> Self {
        // An empty `results` array still wins over `verses`.
        let items = payload.results.or(payload.verses).unwrap_or_default();
        let hits = items.into_iter().filter_map(RawSearchItem::normalize).collect();
        Self { hits }
    }
}

impl RawSearchItem {
    fn normalize(self) -> Option<SearchHit> {
        let (nested_surah_id, surah_name, transliteration) = match self.surah {
            Some(s) => (s.id, s.name, s.transliteration),
            None => (None, None, None),
        };
        let (nested_verse_id, nested_text, nested_translation) = match self.verse {
            Some(v) => (v.id, v.text, v.translation),
            None => (None, None, None),
        };

        let surah_id = nested_surah_id.or(self.surah_id)?;
        let verse_id = nested_verse_id.or(self.verse_id)?;

        Some(SearchHit {
            surah_id,
            verse_id,
            surah_name: surah_name.unwrap_or_default(),
            surah_title: transliteration
                .filter(|t| !t.is_empty())
                .or(self.surah_name.filter(|n| !n.is_empty())),
            text: nested_text.or(self.text).unwrap_or_default(),
            translation: nested_translation.or(self.translation).unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surah_list_decodes_revelation_and_counts() {
        let json = r#"{"surahs":[
            {"id":1,"name":"الفاتحة","transliteration":"Al-Fatihah","translation":"The Opener","type":"meccan","total_verses":7},
            {"id":2,"name":"البقرة","transliteration":"Al-Baqarah","translation":"The Cow","type":"medinan","total_verses":286}
        ]}"#;
        let list: SurahList = serde_json::from_str(json).unwrap();
        assert_eq!(list.surahs.len(), 2);
        assert_eq!(list.surahs[0].revelation, Revelation::Meccan);
        assert_eq!(list.surahs[1].total_verses, 286);
    }

    #[test]
    fn unknown_revelation_does_not_fail() {
        let surah: Surah = serde_json::from_str(r#"{"id":3,"type":"other"}"#).unwrap();
        assert_eq!(surah.revelation, Revelation::Unknown);
    }

    #[test]
    fn surah_detail_flattens_header() {
        let json = r#"{"id":112,"name":"الإخلاص","transliteration":"Al-Ikhlas","translation":"Sincerity",
            "type":"meccan","total_verses":4,
            "verses":[{"id":1,"text":"قُلْ هُوَ اللَّهُ أَحَدٌ","translation":"Say, He is Allah, One"}]}"#;
        let detail: SurahDetail = serde_json::from_str(json).unwrap();
        assert_eq!(detail.surah.id, 112);
        assert_eq!(detail.verses.len(), 1);
        assert!(detail.verses[0].audio.is_none());
    }

    #[test]
    fn verse_detail_prefers_top_level_audio() {
        let json = r#"{"surah":{"id":1,"name":"الفاتحة"},
            "verse":{"id":1,"text":"t","translation":"tr","audio":{"x":{"url":"https://a/x.mp3","reciter":"X"}}},
            "audio":{"alafasy":{"url":"https://a/1.mp3","reciter":"Mishary Alafasy"}}}"#;
        let detail: VerseDetail = serde_json::from_str(json).unwrap();
        let recordings = detail.recordings();
        assert_eq!(recordings.len(), 1);
        assert_eq!(recordings[0].reciter, "Mishary Alafasy");
    }

    #[test]
    fn verse_detail_without_audio_has_no_recordings() {
        let json = r#"{"surah":{"id":1},"verse":{"id":2,"text":"t","translation":"tr"}}"#;
        let detail: VerseDetail = serde_json::from_str(json).unwrap();
        assert!(detail.recordings().is_empty());
    }

    #[test]
    fn language_reads_native_name() {
        let json = r#"{"languages":[{"code":"ur","name":"Urdu","nativeName":"اردو","direction":"rtl"}]}"#;
        let list: LanguageList = serde_json::from_str(json).unwrap();
        assert_eq!(list.languages[0].native_name, "اردو");
        assert_eq!(list.languages[0].direction, Direction::Rtl);
    }

    #[test]
    fn search_accepts_nested_items() {
        let json = r#"{"results":[
            {"surah":{"id":2,"name":"البقرة","transliteration":"Al-Baqarah"},
             "verse":{"id":255,"text":"ayat al-kursi","translation":"Allah - there is no deity"}}
        ]}"#;
        let results: SearchResults = serde_json::from_str(json).unwrap();
        assert_eq!(results.len(), 1);
        let hit = &results.hits[0];
        assert_eq!((hit.surah_id, hit.verse_id), (2, 255));
        assert_eq!(hit.title(), "Al-Baqarah");
    }

    #[test]
    fn search_accepts_flat_items_under_verses() {
        let json = r#"{"verses":[
            {"surahId":1,"verseId":2,"surahName":"Al-Fatihah","text":"a","translation":"b"},
            {"surahId":1,"verseId":3,"text":"c","translation":"d"}
        ]}"#;
        let results: SearchResults = serde_json::from_str(json).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results.hits[0].title(), "Al-Fatihah");
        assert_eq!(results.hits[1].title(), "Surah 1");
    }

    #[test]
    fn empty_results_array_wins_over_verses() {
        let json = r#"{"results":[],"verses":[{"surahId":1,"verseId":1}]}"#;
        let results: SearchResults = serde_json::from_str(json).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn search_preserves_service_order() {
        let json = r#"{"results":[
            {"surahId":9,"verseId":1},{"surahId":2,"verseId":5},{"surahId":9,"verseId":1}
        ]}"#;
        let results: SearchResults = serde_json::from_str(json).unwrap();
        let ids: Vec<_> = results.hits.iter().map(|h| (h.surah_id, h.verse_id)).collect();
        assert_eq!(ids, vec![(9, 1), (2, 5), (9, 1)]);
    }
}
