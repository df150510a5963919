use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::audio::{AudioCue, FeedbackKind, PronunciationSource};
use crate::engine::{compare, shuffle};
use crate::vocab::{AccentKind, VocabularyItem};

pub const MIN_SPEED: u32 = 1;
pub const MAX_SPEED: u32 = 20;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PracticeMode {
    /// Hear the word, type it.
    #[default]
    Dictation,
    /// See the English word fall, type the French before it lands.
    Translation,
}

impl PracticeMode {
    pub fn as_str(self) -> &'static str {
        match self {
            PracticeMode::Dictation => "dictation",
            PracticeMode::Translation => "translation",
        }
    }
}

/// Settings that shape a single session. Built from the user config when the
/// session starts and never read from anywhere else.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PracticeConfig {
    pub mode: PracticeMode,
    pub ignore_accents: bool,
    pub audio_enabled: bool,
    pub speed: u32,
    pub show_translation_hint: bool,
    pub accent: AccentKind,
}

impl Default for PracticeConfig {
    fn default() -> Self {
        Self {
            mode: PracticeMode::Dictation,
            ignore_accents: false,
            audio_enabled: true,
            speed: 5,
            show_translation_hint: true,
            accent: AccentKind::Ai,
        }
    }
}

impl PracticeConfig {
    /// Time allowed per word; only translation drills are paced.
    pub fn countdown(&self) -> Option<Duration> {
        match self.mode {
            PracticeMode::Translation => Some(Duration::from_millis(
                u64::from(self.speed.clamp(MIN_SPEED, MAX_SPEED)) * 1000,
            )),
            PracticeMode::Dictation => None,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("cannot start a practice session without any vocabulary")]
    EmptyItemList,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The answer matched and the word left the working set.
    Correct { finished: bool },
    /// The answer did not match; the expected answer is now shown.
    Incorrect { expected: String },
    /// The missed word went back into the working set at `position`.
    Reinserted { position: usize },
    /// The call was dropped: finished session, wrong state, or feedback for
    /// the previous submission still playing.
    Ignored,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionUpdate {
    pub outcome: Outcome,
    /// Audio to play, in order, before the next submission is accepted.
    pub cues: Vec<AudioCue>,
}

impl SessionUpdate {
    fn ignored() -> Self {
        Self {
            outcome: Outcome::Ignored,
            cues: Vec::new(),
        }
    }

    pub fn is_ignored(&self) -> bool {
        self.outcome == Outcome::Ignored
    }
}

/// The working set of one practice screen.
///
/// Words leave `remaining` only when answered correctly. A miss reveals the
/// answer; the following "continue" moves the missed word to a uniformly
/// random slot so it comes back later in the session.
pub struct PracticeSession {
    remaining: Vec<VocabularyItem>,
    current_index: usize,
    pub(crate) typed_so_far: String,
    revealed: bool,
    total_count: usize,
    config: PracticeConfig,
    feedback_pending: bool,
    misses: BTreeMap<String, u32>,
    attempts: usize,
    started_at: Instant,
    finished_at: Option<Instant>,
    rng: SmallRng,
}

impl PracticeSession {
    pub fn new(items: Vec<VocabularyItem>, config: PracticeConfig) -> Result<Self, SessionError> {
        Self::with_rng(items, config, SmallRng::from_entropy())
    }

    pub fn with_seed(
        items: Vec<VocabularyItem>,
        config: PracticeConfig,
        seed: u64,
    ) -> Result<Self, SessionError> {
        Self::with_rng(items, config, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(
        mut items: Vec<VocabularyItem>,
        config: PracticeConfig,
        mut rng: SmallRng,
    ) -> Result<Self, SessionError> {
        if items.is_empty() {
            return Err(SessionError::EmptyItemList);
        }
        shuffle::shuffle(&mut items, &mut rng);
        log::info!(
            "starting {} session with {} words",
            config.mode.as_str(),
            items.len()
        );
        Ok(Self {
            total_count: items.len(),
            remaining: items,
            current_index: 0,
            typed_so_far: String::new(),
            revealed: false,
            config,
            feedback_pending: false,
            misses: BTreeMap::new(),
            attempts: 0,
            started_at: Instant::now(),
            finished_at: None,
            rng,
        })
    }

    pub fn remaining(&self) -> &[VocabularyItem] {
        &self.remaining
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn target(&self) -> Option<&VocabularyItem> {
        self.remaining.get(self.current_index)
    }

    pub fn typed(&self) -> &str {
        &self.typed_so_far
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    pub fn is_finished(&self) -> bool {
        self.remaining.is_empty()
    }

    pub fn feedback_pending(&self) -> bool {
        self.feedback_pending
    }

    pub fn config(&self) -> &PracticeConfig {
        &self.config
    }

    pub fn total_count(&self) -> usize {
        self.total_count
    }

    pub fn solved(&self) -> usize {
        self.total_count - self.remaining.len()
    }

    pub fn progress(&self) -> f64 {
        self.solved() as f64 / self.total_count as f64
    }

    pub fn attempts(&self) -> usize {
        self.attempts
    }

    /// Miss counts keyed by the French text of each word missed at least once.
    pub fn misses(&self) -> &BTreeMap<String, u32> {
        &self.misses
    }

    pub fn elapsed_secs(&self) -> f64 {
        match self.finished_at {
            Some(end) => end.duration_since(self.started_at).as_secs_f64(),
            None => self.started_at.elapsed().as_secs_f64(),
        }
    }

    /// Pronunciation of the first target, played when the screen opens.
    pub fn opening_cues(&self) -> Vec<AudioCue> {
        self.target()
            .and_then(|item| self.pronounce(item))
            .into_iter()
            .collect()
    }

    /// Pronunciation of the current target on demand.
    pub fn replay_cues(&self) -> Vec<AudioCue> {
        self.opening_cues()
    }

    /// Marks the feedback chain of the last submission as played. Submissions
    /// are refused until this is called.
    pub fn feedback_finished(&mut self) {
        self.feedback_pending = false;
    }

    /// Submits the answer typed so far.
    pub fn submit_typed(&mut self) -> SessionUpdate {
        let input = self.typed_so_far.clone();
        self.submit_or_advance(&input)
    }

    /// "Submit" while awaiting an answer, "Continue" while the answer is
    /// revealed (the input is then ignored).
    pub fn submit_or_advance(&mut self, input: &str) -> SessionUpdate {
        if self.is_finished() {
            return SessionUpdate::ignored();
        }
        if self.feedback_pending {
            log::debug!("dropping submission while feedback is still playing");
            return SessionUpdate::ignored();
        }
        let update = if self.revealed {
            self.reinsert_target()
        } else {
            self.check_answer(input)
        };
        self.feedback_pending = !update.cues.is_empty();
        update
    }

    /// The "Continue" transition alone. A no-op unless the answer is revealed.
    pub fn continue_after_reveal(&mut self) -> SessionUpdate {
        if !self.revealed {
            return SessionUpdate::ignored();
        }
        self.submit_or_advance("")
    }

    fn check_answer(&mut self, input: &str) -> SessionUpdate {
        let target = self.remaining[self.current_index].clone();
        self.attempts += 1;

        if compare::answers_match(input, &target.french, self.config.ignore_accents) {
            self.remaining.remove(self.current_index);
            self.typed_so_far.clear();
            let mut cues = self.feedback(FeedbackKind::Correct);
            if self.remaining.is_empty() {
                self.finished_at = Some(Instant::now());
                log::info!(
                    "session finished: {} words in {} attempts",
                    self.total_count,
                    self.attempts
                );
            } else {
                self.current_index %= self.remaining.len();
                cues.extend(self.pronounce(&self.remaining[self.current_index]));
            }
            return SessionUpdate {
                outcome: Outcome::Correct {
                    finished: self.remaining.is_empty(),
                },
                cues,
            };
        }

        let expected = compare::strip_whitespace(&target.french);
        *self.misses.entry(target.french.clone()).or_insert(0) += 1;
        self.typed_so_far = expected.clone();
        self.revealed = true;
        let mut cues = self.feedback(FeedbackKind::Incorrect);
        cues.extend(self.pronounce(&target));
        SessionUpdate {
            outcome: Outcome::Incorrect { expected },
            cues,
        }
    }

    fn reinsert_target(&mut self) -> SessionUpdate {
        let position = shuffle::reinsert(&mut self.remaining, self.current_index, &mut self.rng);
        self.typed_so_far.clear();
        self.revealed = false;
        // Wrap against the working set as it was with the missed word taken out.
        let others = self.remaining.len() - 1;
        if others > 0 {
            self.current_index %= others;
        }
        let cues = self
            .pronounce(&self.remaining[self.current_index])
            .into_iter()
            .collect();
        SessionUpdate {
            outcome: Outcome::Reinserted { position },
            cues,
        }
    }

    fn feedback(&self, kind: FeedbackKind) -> Vec<AudioCue> {
        if self.config.audio_enabled {
            vec![AudioCue::Feedback(kind)]
        } else {
            Vec::new()
        }
    }

    fn pronounce(&self, item: &VocabularyItem) -> Option<AudioCue> {
        self.config.audio_enabled.then(|| {
            AudioCue::Pronounce(PronunciationSource::resolve(item, self.config.accent))
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn items(words: &[&str]) -> Vec<VocabularyItem> {
        words
            .iter()
            .enumerate()
            .map(|(i, w)| VocabularyItem::new(i.to_string(), w, &format!("en-{w}")))
            .collect()
    }

    fn silent() -> PracticeConfig {
        PracticeConfig {
            audio_enabled: false,
            ..PracticeConfig::default()
        }
    }

    fn ids(session: &PracticeSession) -> Vec<String> {
        let mut ids: Vec<String> = session.remaining().iter().map(|i| i.id.clone()).collect();
        ids.sort();
        ids
    }

    #[test]
    fn empty_list_cannot_start() {
        assert_eq!(
            PracticeSession::new(Vec::new(), silent()).err(),
            Some(SessionError::EmptyItemList)
        );
    }

    #[test]
    fn new_session_is_awaiting_first_word() {
        let session = PracticeSession::with_seed(items(&["chat", "chien", "oiseau"]), silent(), 1)
            .unwrap();
        assert_eq!(session.total_count(), 3);
        assert_eq!(session.remaining().len(), 3);
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.typed(), "");
        assert!(!session.is_revealed());
        assert_eq!(session.solved(), 0);
    }

    #[test]
    fn correct_answer_removes_target() {
        let mut session =
            PracticeSession::with_seed(items(&["chat", "chien"]), silent(), 2).unwrap();
        assert_eq!(session.remaining().len(), 2);
        let answer = session.target().unwrap().french.clone();
        let update = session.submit_or_advance(&answer);
        assert_eq!(update.outcome, Outcome::Correct { finished: false });
        assert_eq!(session.remaining().len(), 1);
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.solved(), 1);
    }

    #[test]
    fn wrong_answer_reveals_then_continue_reinserts() {
        let mut session = PracticeSession::with_seed(items(&["chat"]), silent(), 3).unwrap();
        let update = session.submit_or_advance("chien");
        assert_eq!(
            update.outcome,
            Outcome::Incorrect {
                expected: "chat".into()
            }
        );
        assert!(session.is_revealed());
        assert_eq!(session.typed(), "chat");
        assert_eq!(session.remaining().len(), 1);

        let update = session.submit_or_advance("ignored");
        assert_eq!(update.outcome, Outcome::Reinserted { position: 0 });
        assert_eq!(session.remaining().len(), 1);
        assert!(!session.is_revealed());
        assert_eq!(session.typed(), "");
    }

    #[test]
    fn revealed_answer_is_whitespace_stripped() {
        let mut session = PracticeSession::with_seed(items(&["un chat"]), silent(), 4).unwrap();
        session.submit_or_advance("x");
        assert_eq!(session.typed(), "unchat");
    }

    #[test]
    fn revealed_state_ignores_input_even_if_correct() {
        let mut session = PracticeSession::with_seed(items(&["chat"]), silent(), 5).unwrap();
        session.submit_or_advance("non");
        let update = session.submit_or_advance("chat");
        assert!(matches!(update.outcome, Outcome::Reinserted { .. }));
        assert_eq!(session.remaining().len(), 1, "continue never removes");
    }

    #[test]
    fn continue_without_reveal_is_noop() {
        let mut session =
            PracticeSession::with_seed(items(&["chat", "chien"]), silent(), 6).unwrap();
        let before: Vec<String> = session.remaining().iter().map(|i| i.id.clone()).collect();
        let update = session.continue_after_reveal();
        assert!(update.is_ignored());
        let after: Vec<String> = session.remaining().iter().map(|i| i.id.clone()).collect();
        assert_eq!(before, after);
        assert_eq!(session.attempts(), 0);
    }

    #[test]
    fn reinsertion_keeps_the_same_three_items() {
        for seed in 0..50 {
            let mut session =
                PracticeSession::with_seed(items(&["un", "deux", "trois"]), silent(), seed)
                    .unwrap();
            session.current_index = 1;
            let missed = session.target().unwrap().id.clone();
            session.submit_or_advance("faux");
            let update = session.continue_after_reveal();
            let Outcome::Reinserted { position } = update.outcome else {
                panic!("expected reinsertion");
            };
            assert!(position <= 2);
            assert_eq!(ids(&session), vec!["0", "1", "2"]);
            assert_eq!(
                session.remaining().iter().filter(|i| i.id == missed).count(),
                1
            );
            assert!(session.current_index() < session.remaining().len());
        }
    }

    #[test]
    fn index_wraps_with_modulo_after_removal() {
        let mut session =
            PracticeSession::with_seed(items(&["un", "deux", "trois"]), silent(), 9).unwrap();
        session.current_index = 2;
        let answer = session.target().unwrap().french.clone();
        session.submit_or_advance(&answer);
        assert_eq!(session.current_index(), 0);

        let mut session =
            PracticeSession::with_seed(items(&["un", "deux", "trois"]), silent(), 9).unwrap();
        session.current_index = 1;
        let next_expected = session.remaining()[2].id.clone();
        let answer = session.target().unwrap().french.clone();
        session.submit_or_advance(&answer);
        assert_eq!(session.current_index(), 1, "position is kept, not reset");
        assert_eq!(session.target().unwrap().id, next_expected);
    }

    #[test]
    fn continue_from_last_slot_wraps_to_front() {
        let mut session =
            PracticeSession::with_seed(items(&["un", "deux", "trois"]), silent(), 10).unwrap();
        session.current_index = 2;
        session.submit_or_advance("faux");
        session.continue_after_reveal();
        assert_eq!(session.current_index(), 0);
    }

    #[test]
    fn item_leaves_only_when_matched() {
        let mut session =
            PracticeSession::with_seed(items(&["chat", "chien", "lapin"]), silent(), 11).unwrap();
        let mut removed = HashSet::new();
        let mut steps = 0;
        while !session.is_finished() {
            steps += 1;
            assert!(steps < 1000);
            let before = session.remaining().len();
            let target = session.target().unwrap().clone();
            // Miss every word once before getting it right.
            let update = if session.misses().contains_key(&target.french) {
                session.submit_or_advance(&target.french)
            } else {
                session.submit_or_advance("faux")
            };
            match update.outcome {
                Outcome::Correct { .. } => {
                    assert_eq!(session.remaining().len(), before - 1);
                    removed.insert(target.id.clone());
                }
                Outcome::Incorrect { .. } => {
                    assert_eq!(session.remaining().len(), before);
                    session.continue_after_reveal();
                    assert_eq!(session.remaining().len(), before);
                }
                other => panic!("unexpected {other:?}"),
            }
            assert!(session.remaining().len() <= session.total_count());
            for id in &removed {
                assert!(session.remaining().iter().all(|i| &i.id != id));
            }
        }
        assert_eq!(removed.len(), 3);
        assert!(session.misses().values().all(|&n| n == 1));
        assert_eq!(session.attempts(), 6);
    }

    #[test]
    fn finished_session_ignores_submissions() {
        let mut session = PracticeSession::with_seed(items(&["chat"]), silent(), 12).unwrap();
        let update = session.submit_or_advance("chat");
        assert_eq!(update.outcome, Outcome::Correct { finished: true });
        assert!(session.is_finished());
        assert!(session.target().is_none());
        assert!(session.submit_or_advance("chat").is_ignored());
        assert_eq!(session.progress(), 1.0);
    }

    #[test]
    fn accent_insensitive_mode_accepts_bare_letters() {
        let config = PracticeConfig {
            ignore_accents: true,
            ..silent()
        };
        let mut session = PracticeSession::with_seed(items(&["café"]), config, 13).unwrap();
        assert_eq!(
            session.submit_or_advance("cafe").outcome,
            Outcome::Correct { finished: true }
        );

        let mut strict = PracticeSession::with_seed(items(&["café"]), silent(), 13).unwrap();
        assert!(matches!(
            strict.submit_or_advance("cafe").outcome,
            Outcome::Incorrect { .. }
        ));
    }

    #[test]
    fn correct_cues_play_feedback_then_next_word() {
        let mut session =
            PracticeSession::with_seed(items(&["chat", "chien"]), PracticeConfig::default(), 14)
                .unwrap();
        let answer = session.target().unwrap().french.clone();
        let update = session.submit_or_advance(&answer);
        let next = session.target().unwrap().french.clone();
        assert_eq!(
            update.cues,
            vec![
                AudioCue::Feedback(FeedbackKind::Correct),
                AudioCue::Pronounce(PronunciationSource::Synthesized(next)),
            ]
        );
    }

    #[test]
    fn incorrect_cues_replay_the_missed_word() {
        let mut session =
            PracticeSession::with_seed(items(&["chat"]), PracticeConfig::default(), 15).unwrap();
        let update = session.submit_or_advance("chien");
        assert_eq!(
            update.cues,
            vec![
                AudioCue::Feedback(FeedbackKind::Incorrect),
                AudioCue::Pronounce(PronunciationSource::Synthesized("chat".into())),
            ]
        );
    }

    #[test]
    fn pending_feedback_blocks_reentrant_submission() {
        let mut session =
            PracticeSession::with_seed(items(&["chat", "chien"]), PracticeConfig::default(), 16)
                .unwrap();
        let answer = session.target().unwrap().french.clone();
        session.submit_or_advance(&answer);
        assert!(session.feedback_pending());

        let remaining = session.remaining().len();
        let second = session.target().unwrap().french.clone();
        assert!(session.submit_or_advance(&second).is_ignored());
        assert_eq!(session.remaining().len(), remaining);

        session.feedback_finished();
        assert!(!session.submit_or_advance(&second).is_ignored());
        assert!(session.is_finished());
    }

    #[test]
    fn silent_sessions_never_hold_the_guard() {
        let mut session = PracticeSession::with_seed(items(&["chat"]), silent(), 17).unwrap();
        let update = session.submit_or_advance("x");
        assert!(update.cues.is_empty());
        assert!(!session.feedback_pending());
    }

    #[test]
    fn countdown_only_for_translation() {
        let dictation = PracticeConfig::default();
        assert_eq!(dictation.countdown(), None);
        let translation = PracticeConfig {
            mode: PracticeMode::Translation,
            speed: 3,
            ..dictation
        };
        assert_eq!(translation.countdown(), Some(Duration::from_millis(3000)));
        let too_fast = PracticeConfig {
            speed: 0,
            ..translation
        };
        assert_eq!(too_fast.countdown(), Some(Duration::from_millis(1000)));
    }
}
