pub mod command;
pub mod worker;

use thiserror::Error;

use crate::vocab::{AccentKind, VocabularyItem};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FeedbackKind {
    Correct,
    Incorrect,
}

/// Where a pronunciation comes from once the learner's accent preference has
/// been applied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PronunciationSource {
    Recording(String),
    Synthesized(String),
}

impl PronunciationSource {
    /// Recorded accents fall back to the synthesized voice when the item has no
    /// recording for them.
    pub fn resolve(item: &VocabularyItem, accent: AccentKind) -> Self {
        match accent {
            AccentKind::Ai => Self::Synthesized(item.french.clone()),
            _ => match item.pronunciation_url(accent) {
                Some(url) => Self::Recording(url.to_string()),
                None => Self::Synthesized(item.french.clone()),
            },
        }
    }
}

/// One step of a feedback chain. Chains play strictly in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AudioCue {
    Feedback(FeedbackKind),
    Pronounce(PronunciationSource),
}

#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("failed to launch `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{command}` exited with {status}")]
    Failed { command: String, status: String },
    #[error("no command configured for {0}")]
    NotConfigured(&'static str),
    #[error("playback cancelled")]
    Cancelled,
}

/// Asked before and during playback; returning true aborts the current cue.
pub trait CancelCheck {
    fn is_cancelled(&self) -> bool;
}

impl CancelCheck for bool {
    fn is_cancelled(&self) -> bool {
        *self
    }
}

pub trait AudioBackend: Send {
    fn play_feedback(
        &mut self,
        kind: FeedbackKind,
        cancel: &dyn CancelCheck,
    ) -> Result<(), PlaybackError>;

    fn play_pronunciation(
        &mut self,
        source: &PronunciationSource,
        cancel: &dyn CancelCheck,
    ) -> Result<(), PlaybackError>;

    fn play(&mut self, cue: &AudioCue, cancel: &dyn CancelCheck) -> Result<(), PlaybackError> {
        match cue {
            AudioCue::Feedback(kind) => self.play_feedback(*kind, cancel),
            AudioCue::Pronounce(source) => self.play_pronunciation(source, cancel),
        }
    }
}

/// Backend that accepts every cue and plays nothing.
#[derive(Default)]
pub struct SilentAudio;

impl AudioBackend for SilentAudio {
    fn play_feedback(&mut self, _: FeedbackKind, _: &dyn CancelCheck) -> Result<(), PlaybackError> {
        Ok(())
    }

    fn play_pronunciation(
        &mut self,
        _: &PronunciationSource,
        _: &dyn CancelCheck,
    ) -> Result<(), PlaybackError> {
        Ok(())
    }
}

/// Plays a chain cue by cue. A failing cue is logged and the chain moves on;
/// only cancellation stops it early. Returns how many cues failed.
pub fn play_chain(
    backend: &mut dyn AudioBackend,
    cues: &[AudioCue],
    cancel: &dyn CancelCheck,
) -> usize {
    let mut failures = 0;
    for cue in cues {
        if cancel.is_cancelled() {
            break;
        }
        match backend.play(cue, cancel) {
            Ok(()) => {}
            Err(PlaybackError::Cancelled) => break,
            Err(err) => {
                failures += 1;
                log::warn!("audio cue {cue:?} failed: {err}");
            }
        }
    }
    failures
}
