use std::time::{Duration, Instant};

/// Per-word deadline for paced drills. Once armed it expires exactly once;
/// disarming invalidates it so a late poll cannot fire.
#[derive(Clone, Debug)]
pub struct Countdown {
    duration: Duration,
    started_at: Option<Instant>,
}

impl Countdown {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            started_at: None,
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn arm(&mut self, now: Instant) {
        self.started_at = Some(now);
    }

    pub fn disarm(&mut self) {
        self.started_at = None;
    }

    pub fn is_armed(&self) -> bool {
        self.started_at.is_some()
    }

    /// True the first time it is polled at or after the deadline.
    pub fn poll_expired(&mut self, now: Instant) -> bool {
        match self.started_at {
            Some(start) if now.saturating_duration_since(start) >= self.duration => {
                self.started_at = None;
                true
            }
            _ => false,
        }
    }

    pub fn remaining(&self, now: Instant) -> Duration {
        match self.started_at {
            Some(start) => self
                .duration
                .saturating_sub(now.saturating_duration_since(start)),
            None => Duration::ZERO,
        }
    }

    /// How far the word has fallen, from 0.0 (just armed) to 1.0 (deadline).
    pub fn fraction_elapsed(&self, now: Instant) -> f64 {
        let Some(start) = self.started_at else {
            return 0.0;
        };
        if self.duration.is_zero() {
            return 1.0;
        }
        (now.saturating_duration_since(start).as_secs_f64() / self.duration.as_secs_f64())
            .clamp(0.0, 1.0)
    }
}
