use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::vocab::backend::BackendVocab;
use crate::vocab::{FilterCriteria, SourceError, UnitClass, VocabSource, VocabularyItem, group_units};

/// Either an exported list of backend records or the compact
/// `{ "english": "french" }` map used for hand-written decks.
#[derive(Deserialize)]
#[serde(untagged)]
enum DeckJson {
    Records(Vec<BackendVocab>),
    Pairs(serde_json::Map<String, serde_json::Value>),
}

/// Parses a deck. Compact decks take their class and unit from the caller and
/// derive stable ids from them.
pub fn parse_deck(content: &str, class: &str, unit: &str) -> Result<Vec<VocabularyItem>, SourceError> {
    let items = match serde_json::from_str::<DeckJson>(content)? {
        DeckJson::Records(records) => records
            .into_iter()
            .map(|raw| {
                let mut item: VocabularyItem = raw.into();
                if item.class.is_empty() {
                    item.class = class.to_string();
                }
                if item.unit.is_empty() {
                    item.unit = unit.to_string();
                }
                item
            })
            .collect(),
        DeckJson::Pairs(pairs) => pairs
            .into_iter()
            .filter_map(|(english, french)| {
                let french = french.as_str()?.to_string();
                let id = format!("{class}/{unit}/{english}");
                Some(VocabularyItem::new(id, &french, &english).in_unit(class, unit))
            })
            .collect(),
    };
    Ok(super::validate(items))
}

pub struct DeckFile {
    path: PathBuf,
}

impl DeckFile {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    fn default_unit(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "deck".to_string())
    }

    fn load(&self) -> Result<Vec<VocabularyItem>, SourceError> {
        let content = fs::read_to_string(&self.path)?;
        parse_deck(&content, "local", &self.default_unit())
    }
}

impl VocabSource for DeckFile {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn list_classes(&self) -> Result<Vec<UnitClass>, SourceError> {
        let items = self.load()?;
        Ok(group_units(
            items.iter().map(|i| (i.class.as_str(), i.unit.as_str())),
        ))
    }

    fn fetch(&self, criteria: &FilterCriteria) -> Result<Vec<VocabularyItem>, SourceError> {
        Ok(self
            .load()?
            .into_iter()
            .filter(|item| criteria.matches(&item.class, &item.unit))
            .collect())
    }
}
