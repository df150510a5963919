use std::time::Instant;

use crate::audio::AudioCue;
use crate::engine::filter::CharFilter;
use crate::session::countdown::Countdown;
use crate::session::input;
use crate::session::practice::{PracticeSession, SessionUpdate};

/// Drives a session from UI events. Dictation sessions advance only on
/// submit; translation sessions also carry a countdown that submits whatever
/// has been typed when it runs out.
///
/// The countdown is armed only while a fresh target awaits an answer and no
/// feedback is playing, so the timer and a manual submit can never both run
/// the comparison for the same target.
pub struct PracticeDriver {
    pub session: PracticeSession,
    countdown: Option<Countdown>,
    filter: CharFilter,
}

impl PracticeDriver {
    pub fn new(session: PracticeSession) -> Self {
        let countdown = session.config().countdown().map(Countdown::new);
        Self {
            session,
            countdown,
            filter: CharFilter::french(),
        }
    }

    /// Arms the first countdown and returns the opening pronunciation.
    pub fn start(&mut self, now: Instant) -> Vec<AudioCue> {
        self.rearm(now);
        self.session.opening_cues()
    }

    pub fn countdown(&self) -> Option<&Countdown> {
        self.countdown.as_ref()
    }

    pub fn type_char(&mut self, ch: char) -> bool {
        input::process_char(&mut self.session, &self.filter, ch)
    }

    pub fn backspace(&mut self) {
        input::process_backspace(&mut self.session);
    }

    pub fn clear_input(&mut self) {
        input::process_delete(&mut self.session);
    }

    /// Manual Enter: submit while awaiting, continue while revealed.
    pub fn submit(&mut self, now: Instant) -> SessionUpdate {
        if self.session.feedback_pending() {
            return self.session.submit_typed();
        }
        if let Some(countdown) = self.countdown.as_mut() {
            countdown.disarm();
        }
        let update = self.session.submit_typed();
        self.rearm(now);
        update
    }

    /// Timer path. Returns the update when the countdown expired on this tick.
    pub fn tick(&mut self, now: Instant) -> Option<SessionUpdate> {
        let expired = self
            .countdown
            .as_mut()
            .is_some_and(|countdown| countdown.poll_expired(now));
        if !expired {
            return None;
        }
        log::debug!("countdown expired; submitting {:?}", self.session.typed());
        let update = self.session.submit_typed();
        self.rearm(now);
        Some(update)
    }

    /// Called when the audio chain of the last submission has finished.
    pub fn feedback_finished(&mut self, now: Instant) {
        self.session.feedback_finished();
        self.rearm(now);
    }

    /// Stops the countdown for good, e.g. when leaving the screen.
    pub fn cancel(&mut self) {
        if let Some(countdown) = self.countdown.as_mut() {
            countdown.disarm();
        }
    }

    fn rearm(&mut self, now: Instant) {
        let awaiting = !self.session.is_finished()
            && !self.session.is_revealed()
            && !self.session.feedback_pending();
        if let Some(countdown) = self.countdown.as_mut()
            && awaiting
            && !countdown.is_armed()
        {
            countdown.arm(now);
        }
    }
}
