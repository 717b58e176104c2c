use crate::api::SURAH_COUNT;

/// Where a "previous verse" control leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerseLink {
    Verse { surah: u16, verse: u32 },
    /// Back to the surah page from its first verse.
    Surah(u16),
}

pub fn previous_surah(surah: u16) -> Option<u16> {
    (surah > 1).then(|| surah - 1)
}

pub fn next_surah(surah: u16) -> Option<u16> {
    (surah < SURAH_COUNT).then(|| surah + 1)
}

pub fn previous_verse(surah: u16, verse: u32) -> VerseLink {
    if verse > 1 {
        VerseLink::Verse {
            surah,
            verse: verse - 1,
        }
    } else {
        VerseLink::Surah(surah)
    }
}

/// Offered for any representable successor: the verse endpoint does not
/// report the verse count.
pub fn next_verse(surah: u16, verse: u32) -> Option<VerseLink> {
    let verse = verse.checked_add(1)?;
    Some(VerseLink::Verse { surah, verse })
}

/// Al-Fatihah carries it as its first verse and At-Tawbah has none.
pub fn shows_bismillah(surah: u16) -> bool {
    surah != 1 && surah != 9
}

/// Parses a surah number in `1..=114`.
pub fn parse_surah_number(s: &str) -> Result<u16, String> {
    let n: u16 = s
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a surah number", s))?;
    if (1..=SURAH_COUNT).contains(&n) {
        Ok(n)
    } else {
        Err(format!("surah must be between 1 and {}", SURAH_COUNT))
    }
}

/// Parses a 1-based verse number.
pub fn parse_verse_number(s: &str) -> Result<u32, String> {
    match s.trim().parse::<u32>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(format!("'{}' is not a verse number", s)),
    }
}
