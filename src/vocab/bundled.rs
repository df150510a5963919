use rust_embed::Embed;

use crate::vocab::deck_file::parse_deck;
use crate::vocab::{FilterCriteria, SourceError, UnitClass, VocabSource, VocabularyItem, group_units};

#[derive(Embed)]
#[folder = "assets/decks/"]
struct DeckAssets;

/// Decks shipped inside the binary, laid out as `<class>/<unit>.json`.
#[derive(Default)]
pub struct BundledDecks;

impl BundledDecks {
    fn entries() -> Vec<(String, String, String)> {
        let mut entries: Vec<(String, String, String)> = DeckAssets::iter()
            .filter_map(|path| {
                let (class, file) = path.split_once('/')?;
                let unit = file.strip_suffix(".json")?;
                Some((class.to_string(), unit.to_string(), path.to_string()))
            })
            .collect();
        entries.sort();
        entries
    }
}

impl VocabSource for BundledDecks {
    fn describe(&self) -> String {
        "bundled decks".to_string()
    }

    fn list_classes(&self) -> Result<Vec<UnitClass>, SourceError> {
        let entries = Self::entries();
        Ok(group_units(
            entries.iter().map(|(c, u, _)| (c.as_str(), u.as_str())),
        ))
    }

    fn fetch(&self, criteria: &FilterCriteria) -> Result<Vec<VocabularyItem>, SourceError> {
        let mut items = Vec::new();
        for (class, unit, path) in Self::entries() {
            if !criteria.matches(&class, &unit) {
                continue;
            }
            let Some(file) = DeckAssets::get(&path) else {
                continue;
            };
            let content = String::from_utf8_lossy(file.data.as_ref());
            items.extend(parse_deck(&content, &class, &unit)?);
        }
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_decks_are_listed() {
        let classes = BundledDecks.list_classes().unwrap();
        assert!(!classes.is_empty());
        assert!(classes.iter().all(|c| !c.units.is_empty()));
    }

    #[test]
    fn every_bundled_unit_parses_and_is_non_empty() {
        for class in BundledDecks.list_classes().unwrap() {
            for unit in &class.units {
                let criteria = FilterCriteria::new(Some(class.class.clone()), Some(unit.clone()));
                let items = BundledDecks.fetch(&criteria).unwrap();
                assert!(!items.is_empty(), "{}/{} is empty", class.class, unit);
                assert!(items.iter().all(|i| &i.unit == unit));
            }
        }
    }

    #[test]
    fn unknown_unit_yields_nothing() {
        let criteria = FilterCriteria::new(None, Some("no-such-unit".into()));
        assert!(BundledDecks.fetch(&criteria).unwrap().is_empty());
    }
}
