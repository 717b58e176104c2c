//! Plain-text rendering of page data for the terminal.

use std::fmt::Write;

use crate::api::{Direction, Language, SearchResults, Surah, SurahDetail, VerseDetail};
use crate::view::navigation::{next_surah, next_verse, previous_surah, previous_verse, shows_bismillah, VerseLink};

const BISMILLAH: &str = "بِسْمِ ٱللَّهِ ٱلرَّحْمَـٰنِ ٱلرَّحِيمِ";
const DEFAULT_WIDTH: usize = 80;

/// Layout inputs shared by every renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub width: usize,
    /// Direction of the active translation language.
    pub direction: Direction,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            direction: Direction::Ltr,
        }
    }
}

impl Layout {
    pub fn new(width: usize, direction: Direction) -> Self {
        Self { width, direction }
    }
}

/// Right-aligns each line of `text` for rtl, leaves ltr untouched.
pub fn align(text: &str, direction: Direction, width: usize) -> String {
    match direction {
        Direction::Ltr => text.to_string(),
        Direction::Rtl => text
            .lines()
            .map(|line| {
                let len = line.chars().count();
                format!("{}{}", " ".repeat(width.saturating_sub(len)), line)
            })
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

fn surah_line(surah: &Surah) -> String {
    format!(
        "{:>3}. {} ({}) {} - {} verses, {}",
        surah.id,
        surah.transliteration,
        surah.translation,
        surah.name,
        surah.total_verses,
        surah.revelation.as_str()
    )
}

pub fn render_surah_list(surahs: &[&Surah]) -> String {
    if surahs.is_empty() {
        return "No surahs found".to_string();
    }
    surahs
        .iter()
        .map(|s| surah_line(s))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_surah(detail: &SurahDetail, layout: Layout) -> String {
    let surah = &detail.surah;
    let mut out = String::new();
    let _ = writeln!(out, "{}", surah_line(surah));

    if shows_bismillah(surah.id) {
        let _ = writeln!(out, "\n{}", align(BISMILLAH, Direction::Rtl, layout.width));
    }

    for verse in &detail.verses {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{}",
            align(&format!("{} ({})", verse.text, verse.id), Direction::Rtl, layout.width)
        );
        if !verse.translation.is_empty() {
            let _ = writeln!(out, "{}", align(&verse.translation, layout.direction, layout.width));
        }
    }

    let _ = writeln!(out);
    let _ = write!(out, "{}", surah_navigation(surah.id));
    out
}

fn surah_navigation(surah: u16) -> String {
    let prev = previous_surah(surah).map(|n| format!("< surah {}", n));
    let next = next_surah(surah).map(|n| format!("surah {} >", n));
    [prev, next].into_iter().flatten().collect::<Vec<_>>().join("  |  ")
}

pub fn render_verse(detail: &VerseDetail, layout: Layout) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {}:{}",
        detail.surah.transliteration, detail.surah.id, detail.verse.id
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", align(&detail.verse.text, Direction::Rtl, layout.width));
    if !detail.verse.translation.is_empty() {
        let _ = writeln!(
            out,
            "{}",
            align(&detail.verse.translation, layout.direction, layout.width)
        );
    }

    let recordings = detail.recordings();
    if !recordings.is_empty() {
        let _ = writeln!(out, "\nRecitations:");
        for audio in recordings {
            let _ = writeln!(out, "  {}: {}", audio.reciter, audio.url);
        }
    }

    let _ = writeln!(out);
    let back = match previous_verse(detail.surah.id, detail.verse.id) {
        VerseLink::Verse { surah, verse } => format!("< {}:{}", surah, verse),
        VerseLink::Surah(surah) => format!("< back to surah {}", surah),
    };
    let _ = write!(out, "{}", back);
    match next_verse(detail.surah.id, detail.verse.id) {
        Some(VerseLink::Verse { surah, verse }) => {
            let _ = write!(out, "  |  {}:{} >", surah, verse);
        }
        Some(VerseLink::Surah(surah)) => {
            let _ = write!(out, "  |  surah {} >", surah);
        }
        None => {}
    }
    out
}

/// `<n> result(s) for "<query>"`.
pub fn search_summary(count: usize, query: &str) -> String {
    let noun = if count == 1 { "result" } else { "results" };
    format!("{} {} for \"{}\"", count, noun, query)
}

pub fn render_search(results: &SearchResults, query: &str, layout: Layout) -> String {
    if results.is_empty() {
        return "No results found".to_string();
    }

    let mut out = search_summary(results.len(), query);
    for hit in &results.hits {
        let _ = write!(out, "\n\n{} {}:{}", hit.title(), hit.surah_id, hit.verse_id);
        if !hit.surah_name.is_empty() {
            let _ = write!(out, " {}", hit.surah_name);
        }
        if !hit.text.is_empty() {
            let _ = write!(out, "\n{}", align(&hit.text, Direction::Rtl, layout.width));
        }
        if !hit.translation.is_empty() {
            let _ = write!(out, "\n{}", align(&hit.translation, layout.direction, layout.width));
        }
    }
    out
}

/// One language per line, the active one marked with `*`.
pub fn render_languages(languages: &[Language], active: &str) -> String {
    languages
        .iter()
        .map(|lang| {
            let marker = if lang.code == active { "*" } else { " " };
            let dir = match lang.direction {
                Direction::Ltr => "ltr",
                Direction::Rtl => "rtl",
            };
            format!("{} {:<4} {} ({}) {}", marker, lang.code, lang.name, lang.native_name, dir)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
