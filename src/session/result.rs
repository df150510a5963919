use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::practice::{PracticeMode, PracticeSession};

const HARDEST_LIMIT: usize = 5;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionResult {
    pub mode: PracticeMode,
    pub deck: String,
    pub total: usize,
    pub solved: usize,
    pub attempts: usize,
    pub misses: usize,
    pub accuracy: f64,
    pub elapsed_secs: f64,
    pub timestamp: DateTime<Utc>,
    #[serde(default = "default_true")]
    pub completed: bool,
    /// Most-missed words, worst first.
    #[serde(default)]
    pub hardest: Vec<String>,
}

fn default_true() -> bool {
    true
}

impl SessionResult {
    pub fn from_session(session: &PracticeSession, deck: &str) -> Self {
        let misses: usize = session.misses().values().map(|&n| n as usize).sum();
        let attempts = session.attempts();
        let accuracy = if attempts > 0 {
            ((attempts - misses) as f64 / attempts as f64 * 100.0).clamp(0.0, 100.0)
        } else {
            100.0
        };

        let mut ranked: Vec<(&String, &u32)> = session.misses().iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        let hardest = ranked
            .into_iter()
            .take(HARDEST_LIMIT)
            .map(|(word, _)| word.clone())
            .collect();

        Self {
            mode: session.config().mode,
            deck: deck.to_string(),
            total: session.total_count(),
            solved: session.solved(),
            attempts,
            misses,
            accuracy,
            elapsed_secs: session.elapsed_secs(),
            timestamp: Utc::now(),
            completed: session.is_finished(),
            hardest,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::practice::PracticeConfig;
    use crate::vocab::VocabularyItem;

    fn silent_session(words: &[&str]) -> PracticeSession {
        let items = words
            .iter()
            .enumerate()
            .map(|(i, w)| VocabularyItem::new(i.to_string(), w, "en"))
            .collect();
        let config = PracticeConfig {
            audio_enabled: false,
            ..PracticeConfig::default()
        };
        PracticeSession::with_seed(items, config, 5).unwrap()
    }

    #[test]
    fn untouched_session_is_incomplete_and_perfect() {
        let session = silent_session(&["chat", "chien"]);
        let result = SessionResult::from_session(&session, "animaux");
        assert!(!result.completed);
        assert_eq!(result.solved, 0);
        assert_eq!(result.accuracy, 100.0);
        assert!(result.hardest.is_empty());
    }

    #[test]
    fn misses_lower_accuracy_and_rank_hardest() {
        let mut session = silent_session(&["chat"]);
        session.submit_or_advance("non");
        session.continue_after_reveal();
        session.submit_or_advance("non");
        session.continue_after_reveal();
        session.submit_or_advance("chat");

        let result = SessionResult::from_session(&session, "animaux");
        assert!(result.completed);
        assert_eq!(result.attempts, 3);
        assert_eq!(result.misses, 2);
        assert!((result.accuracy - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(result.hardest, vec!["chat".to_string()]);
        assert_eq!(result.mode, PracticeMode::Dictation);
    }

    #[test]
    fn result_round_trips_through_json_with_defaults() {
        let json = r#"{
            "mode": "translation", "deck": "d", "total": 3, "solved": 3, "attempts": 4,
            "misses": 1, "accuracy": 75.0, "elapsed_secs": 12.5,
            "timestamp": "2025-01-01T00:00:00Z"
        }"#;
        let result: SessionResult = serde_json::from_str(json).unwrap();
        assert!(result.completed);
        assert!(result.hardest.is_empty());
        assert_eq!(result.mode, PracticeMode::Translation);
    }
}
