pub mod backend;
pub mod bundled;
pub mod deck_file;

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::compare;
use crate::engine::filter::CharFilter;

/// Which pronunciation a learner wants to hear. `Ai` is the synthesized voice;
/// the others are human recordings that may be missing for a given word.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccentKind {
    #[default]
    Ai,
    Fr,
    Qc,
    Other,
}

impl AccentKind {
    pub const ALL: [AccentKind; 4] = [
        AccentKind::Ai,
        AccentKind::Fr,
        AccentKind::Qc,
        AccentKind::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AccentKind::Ai => "AI",
            AccentKind::Fr => "FR",
            AccentKind::Qc => "QC",
            AccentKind::Other => "OTHER",
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|&a| a == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|&a| a == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for AccentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single word or phrase to learn. Two items are the same item when their
/// ids match, whatever their text.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VocabularyItem {
    pub id: String,
    pub french: String,
    pub english: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub class: String,
    #[serde(default)]
    pub pronunciations: BTreeMap<AccentKind, String>,
}

impl VocabularyItem {
    pub fn new(id: impl Into<String>, french: &str, english: &str) -> Self {
        Self {
            id: id.into(),
            french: clean_answer(french),
            english: english.trim().to_string(),
            unit: String::new(),
            class: String::new(),
            pronunciations: BTreeMap::new(),
        }
    }

    pub fn in_unit(mut self, class: &str, unit: &str) -> Self {
        self.class = class.to_string();
        self.unit = unit.to_string();
        self
    }

    pub fn with_pronunciation(mut self, accent: AccentKind, url: &str) -> Self {
        self.pronunciations.insert(accent, url.to_string());
        self
    }

    /// Recorded URL for `accent`, or None when that recording does not exist.
    pub fn pronunciation_url(&self, accent: AccentKind) -> Option<&str> {
        self.pronunciations
            .get(&accent)
            .map(|s| s.as_str())
            .filter(|s| !s.trim().is_empty())
    }

    /// The answer with whitespace removed; this is what the learner types.
    pub fn answer_chars(&self) -> usize {
        compare::strip_whitespace(&self.french).chars().count()
    }
}

impl PartialEq for VocabularyItem {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for VocabularyItem {}

/// Brings an answer into the shape the keyboard can produce: curly
/// apostrophes become `'`, any other whitespace a plain space, then NFC.
pub fn clean_answer(text: &str) -> String {
    let mapped: String = text
        .trim()
        .chars()
        .map(|ch| match ch {
            '\u{2019}' | '\u{2018}' | '\u{02BC}' => '\'',
            c if c.is_whitespace() => ' ',
            c => c,
        })
        .collect();
    compare::compose(&mapped)
}

/// True when every answer character can be typed, case aside.
pub fn is_typeable(french: &str, filter: &CharFilter) -> bool {
    compare::normalize(french, false)
        .chars()
        .all(|ch| filter.is_allowed(ch))
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitClass {
    pub class: String,
    #[serde(default)]
    pub units: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub class: Option<String>,
    pub unit: Option<String>,
}

impl FilterCriteria {
    pub fn new(class: Option<String>, unit: Option<String>) -> Self {
        Self { class, unit }
    }

    pub fn matches(&self, class: &str, unit: &str) -> bool {
        self.class.as_deref().is_none_or(|c| c == class)
            && self.unit.as_deref().is_none_or(|u| u == unit)
    }

    pub fn label(&self) -> String {
        match (&self.class, &self.unit) {
            (Some(c), Some(u)) => format!("{c} / {u}"),
            (Some(c), None) => c.clone(),
            (None, Some(u)) => u.clone(),
            (None, None) => "all".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("could not read vocabulary: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed vocabulary data: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("backend rejected the request: {0}")]
    Rejected(String),
    #[cfg(feature = "network")]
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("network support is disabled in this build")]
    NetworkDisabled,
}

/// Anything that can hand the app a list of words to practice.
pub trait VocabSource {
    fn describe(&self) -> String;
    fn list_classes(&self) -> Result<Vec<UnitClass>, SourceError>;
    fn fetch(&self, criteria: &FilterCriteria) -> Result<Vec<VocabularyItem>, SourceError>;
}

/// Boundary check applied to every source: items without a French answer or
/// with one nobody could type are dropped, and duplicate ids collapse to the
/// first occurrence.
pub fn validate(items: Vec<VocabularyItem>) -> Vec<VocabularyItem> {
    let filter = CharFilter::french();
    let mut seen = HashSet::new();
    items
        .into_iter()
        .map(|mut item| {
            item.french = clean_answer(&item.french);
            item
        })
        .filter(|item| {
            if compare::strip_whitespace(&item.french).is_empty() {
                log::warn!("dropping vocabulary item {} with empty french text", item.id);
                return false;
            }
            if !is_typeable(&item.french, &filter) {
                log::warn!(
                    "dropping vocabulary item {}: {:?} has characters that cannot be typed",
                    item.id,
                    item.french
                );
                return false;
            }
            if !seen.insert(item.id.clone()) {
                log::warn!("dropping duplicate vocabulary item {}", item.id);
                return false;
            }
            true
        })
        .collect()
}

/// Groups `(class, unit)` pairs into the listing shape the backend returns,
/// keeping first-seen order.
pub fn group_units<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Vec<UnitClass> {
    let mut out: Vec<UnitClass> = Vec::new();
    for (class, unit) in pairs {
        let idx = match out.iter().position(|uc| uc.class == class) {
            Some(idx) => idx,
            None => {
                out.push(UnitClass {
                    class: class.to_string(),
                    units: Vec::new(),
                });
                out.len() - 1
            }
        };
        let entry = &mut out[idx];
        if !entry.units.iter().any(|u| u == unit) {
            entry.units.push(unit.to_string());
        }
    }
    out
}
