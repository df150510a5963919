use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::vocab::{AccentKind, FilterCriteria, SourceError, UnitClass, VocabSource, VocabularyItem};

/// Vocabulary record as the backend stores it. Recording URLs are empty
/// strings when a recording has not been made yet.
#[derive(Clone, Debug, Deserialize)]
pub struct BackendVocab {
    #[serde(rename = "_id")]
    pub id: String,
    pub french: String,
    #[serde(default)]
    pub english: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub class: String,
    #[serde(default)]
    pub mp3_url: String,
    #[serde(default)]
    pub qc_url: String,
    #[serde(default)]
    pub tmp_url: String,
}

impl From<BackendVocab> for VocabularyItem {
    fn from(raw: BackendVocab) -> Self {
        VocabularyItem::new(raw.id, &raw.french, &raw.english)
            .in_unit(&raw.class, &raw.unit)
            .with_pronunciation(AccentKind::Fr, &raw.mp3_url)
            .with_pronunciation(AccentKind::Qc, &raw.qc_url)
            .with_pronunciation(AccentKind::Other, &raw.tmp_url)
    }
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    #[serde(default)]
    message: Option<String>,
    data: Option<T>,
}

fn unwrap_envelope<T: DeserializeOwned>(body: &str) -> Result<T, SourceError> {
    let envelope: Envelope<T> = serde_json::from_str(body)?;
    match (envelope.success, envelope.data) {
        (true, Some(data)) => Ok(data),
        (true, None) => Err(SourceError::Rejected("response carried no data".to_string())),
        (false, _) => Err(SourceError::Rejected(
            envelope
                .message
                .unwrap_or_else(|| "request failed".to_string()),
        )),
    }
}

pub fn decode_vocab_response(body: &str) -> Result<Vec<VocabularyItem>, SourceError> {
    let raw: Vec<BackendVocab> = unwrap_envelope(body)?;
    Ok(super::validate(raw.into_iter().map(Into::into).collect()))
}

pub fn decode_class_units(body: &str) -> Result<Vec<UnitClass>, SourceError> {
    unwrap_envelope(body)
}

pub struct BackendClient {
    base_url: String,
    #[cfg(feature = "network")]
    client: reqwest::blocking::Client,
}

impl BackendClient {
    #[cfg(feature = "network")]
    pub fn new(base_url: &str) -> Result<Self, SourceError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    #[cfg(not(feature = "network"))]
    pub fn new(_base_url: &str) -> Result<Self, SourceError> {
        Err(SourceError::NetworkDisabled)
    }

    #[cfg(feature = "network")]
    fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<String, SourceError> {
        let url = format!("{}/{path}", self.base_url);
        log::debug!("GET {url} {query:?}");
        let response = self.client.get(&url).query(query).send()?;
        // Error statuses still carry the JSON envelope with a message.
        Ok(response.text()?)
    }

    #[cfg(not(feature = "network"))]
    fn get(&self, _path: &str, _query: &[(&str, &str)]) -> Result<String, SourceError> {
        Err(SourceError::NetworkDisabled)
    }
}

impl VocabSource for BackendClient {
    fn describe(&self) -> String {
        self.base_url.clone()
    }

    fn list_classes(&self) -> Result<Vec<UnitClass>, SourceError> {
        decode_class_units(&self.get("class-units", &[])?)
    }

    /// Only a full class and unit pair has its own endpoint. Broader decks
    /// load every word and are narrowed here.
    fn fetch(&self, criteria: &FilterCriteria) -> Result<Vec<VocabularyItem>, SourceError> {
        let body = match (criteria.class.as_deref(), criteria.unit.as_deref()) {
            (Some(class), Some(unit)) => {
                self.get("vocab-by-class-unit", &[("class", class), ("unit", unit)])?
            }
            _ => self.get("vocab", &[])?,
        };
        let items = decode_vocab_response(&body)?;
        Ok(items
            .into_iter()
            .filter(|item| criteria.matches(&item.class, &item.unit))
            .collect())
    }
}
