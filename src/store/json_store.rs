use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Serialize, de::DeserializeOwned};

use crate::session::result::SessionResult;
use crate::store::schema::{HistoryData, ProfileData};

const PROFILE_FILE: &str = "profile.json";
const HISTORY_FILE: &str = "history.json";

/// Keeps at most this many sessions in history.json.
pub const HISTORY_LIMIT: usize = 500;

pub struct JsonStore {
    base_dir: PathBuf,
}

impl JsonStore {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vocabdr");
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }

    fn load<T: DeserializeOwned + Default>(&self, name: &str) -> T {
        let path = self.file_path(name);
        if !path.exists() {
            return T::default();
        }
        match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                log::warn!("ignoring unreadable {}: {e}", path.display());
                T::default()
            }),
            Err(e) => {
                log::warn!("could not read {}: {e}", path.display());
                T::default()
            }
        }
    }

    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let path = self.file_path(name);
        let tmp_path = path.with_extension("tmp");

        let json = serde_json::to_string_pretty(data)?;
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    /// Load the profile, falling back to a fresh one when the file is
    /// missing, corrupt, or written by an older schema.
    pub fn load_profile(&self) -> ProfileData {
        let profile: ProfileData = self.load(PROFILE_FILE);
        if profile.needs_reset() {
            log::info!("profile schema changed, starting a fresh profile");
            ProfileData::default()
        } else {
            profile
        }
    }

    pub fn save_profile(&self, data: &ProfileData) -> Result<()> {
        self.save(PROFILE_FILE, data)
    }

    pub fn load_history(&self) -> HistoryData {
        self.load(HISTORY_FILE)
    }

    pub fn save_history(&self, data: &HistoryData) -> Result<()> {
        self.save(HISTORY_FILE, data)
    }

    /// Appends a finished session to history and folds it into the profile,
    /// writing both files.
    pub fn record(
        &self,
        history: &mut HistoryData,
        profile: &mut ProfileData,
        result: SessionResult,
    ) -> Result<()> {
        profile.record_session(&result);
        history.sessions.push(result);
        if history.sessions.len() > HISTORY_LIMIT {
            let overflow = history.sessions.len() - HISTORY_LIMIT;
            history.sessions.drain(..overflow);
        }
        self.save_history(history)?;
        self.save_profile(profile)?;
        Ok(())
    }
}
