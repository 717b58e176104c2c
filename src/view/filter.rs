use std::str::FromStr;

use crate::api::{Revelation, Surah};

/// Revelation-place filter for the surah index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RevelationFilter {
    #[default]
    All,
    Meccan,
    Medinan,
}

impl FromStr for RevelationFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "meccan" => Ok(Self::Meccan),
            "medinan" => Ok(Self::Medinan),
            other => Err(format!(
                "unknown filter '{}', expected all, meccan or medinan",
                other
            )),
        }
    }
}

/// Client-side narrowing of the surah index. Nothing here touches the network.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SurahFilter {
    pub text: String,
    pub revelation: RevelationFilter,
}

impl SurahFilter {
    pub fn matches(&self, surah: &Surah) -> bool {
        let matches_revelation = match self.revelation {
            RevelationFilter::All => true,
            RevelationFilter::Meccan => surah.revelation == Revelation::Meccan,
            RevelationFilter::Medinan => surah.revelation == Revelation::Medinan,
        };

        matches_revelation && self.matches_text(surah)
    }

    fn matches_text(&self, surah: &Surah) -> bool {
        if self.text.is_empty() {
            return true;
        }
        let needle = self.text.to_lowercase();
        surah.transliteration.to_lowercase().contains(&needle)
            || surah.name.contains(&self.text)
            || surah.translation.to_lowercase().contains(&needle)
            || surah.id.to_string() == self.text
    }

    pub fn apply<'a>(&self, surahs: &'a [Surah]) -> Vec<&'a Surah> {
        surahs.iter().filter(|s| self.matches(s)).collect()
    }
}
