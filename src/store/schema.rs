use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::session::result::SessionResult;

const SCHEMA_VERSION: u32 = 1;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProfileData {
    pub schema_version: u32,
    pub total_sessions: u32,
    pub words_mastered: u64,
    pub streak_days: u32,
    pub best_streak: u32,
    pub last_practice_date: Option<String>,
}

impl Default for ProfileData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            total_sessions: 0,
            words_mastered: 0,
            streak_days: 0,
            best_streak: 0,
            last_practice_date: None,
        }
    }
}

impl ProfileData {
    /// Check if loaded data has a stale schema version and needs reset.
    pub fn needs_reset(&self) -> bool {
        self.schema_version != SCHEMA_VERSION
    }

    /// Counts a session toward totals and the daily streak. Practising twice on
    /// the same day keeps the streak; skipping a day restarts it.
    pub fn record_session(&mut self, result: &SessionResult) {
        self.total_sessions += 1;
        self.words_mastered += result.solved as u64;

        let day = result.timestamp.date_naive();
        let last = self
            .last_practice_date
            .as_deref()
            .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok());
        match last {
            Some(last) if last == day => {}
            Some(last) if day.signed_duration_since(last).num_days() == 1 => {
                self.streak_days += 1;
            }
            _ => self.streak_days = 1,
        }
        self.best_streak = self.best_streak.max(self.streak_days);
        self.last_practice_date = Some(day.format("%Y-%m-%d").to_string());
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HistoryData {
    pub schema_version: u32,
    pub sessions: Vec<SessionResult>,
}

impl Default for HistoryData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            sessions: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::session::practice::PracticeMode;

    fn result_on(y: i32, m: u32, d: u32, solved: usize) -> SessionResult {
        SessionResult {
            mode: PracticeMode::Dictation,
            deck: "d".into(),
            total: solved,
            solved,
            attempts: solved,
            misses: 0,
            accuracy: 100.0,
            elapsed_secs: 1.0,
            timestamp: Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap(),
            completed: true,
            hardest: Vec::new(),
        }
    }

    #[test]
    fn streak_grows_on_consecutive_days_and_resets_after_gap() {
        let mut profile = ProfileData::default();
        profile.record_session(&result_on(2025, 3, 1, 4));
        profile.record_session(&result_on(2025, 3, 1, 2));
        assert_eq!(profile.streak_days, 1);
        profile.record_session(&result_on(2025, 3, 2, 1));
        assert_eq!(profile.streak_days, 2);
        profile.record_session(&result_on(2025, 3, 5, 1));
        assert_eq!(profile.streak_days, 1);
        assert_eq!(profile.best_streak, 2);
        assert_eq!(profile.total_sessions, 4);
        assert_eq!(profile.words_mastered, 8);
        assert_eq!(profile.last_practice_date.as_deref(), Some("2025-03-05"));
    }

    #[test]
    fn stale_schema_needs_reset() {
        let profile = ProfileData {
            schema_version: 0,
            ..ProfileData::default()
        };
        assert!(profile.needs_reset());
        assert!(!ProfileData::default().needs_reset());
    }
}
