use std::time::{Duration, Instant};

/// Reference-timestamp playback clock.
///
/// Elapsed time is always recomputed as `offset + (now - reference)`; it is
/// never accumulated incrementally. While not running the clock holds the
/// last computed value so a resume can continue from it.
///
/// All methods take `now` explicitly so callers with a simulated clock can
/// drive the same code paths as the real one.
#[derive(Debug, Clone)]
pub struct PlaybackClock {
    reference: Option<Instant>,
    offset: Duration,
    held: Duration,
}

impl Default for PlaybackClock {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackClock {
    pub fn new() -> Self {
        Self {
            reference: None,
            offset: Duration::ZERO,
            held: Duration::ZERO,
        }
    }

    /// Start (or restart) the clock at `offset`, with `now` as the reference.
    pub fn start_at(&mut self, now: Instant, offset: Duration) {
        self.reference = Some(now);
        self.offset = offset;
        self.held = offset;
    }

    /// Freeze the clock, holding the elapsed value computed at `now`.
    pub fn pause_at(&mut self, now: Instant) {
        self.held = self.elapsed_at(now);
        self.reference = None;
    }

    /// Back to zero, not running.
    pub fn reset(&mut self) {
        self.reference = None;
        self.offset = Duration::ZERO;
        self.held = Duration::ZERO;
    }

    pub fn is_running(&self) -> bool {
        self.reference.is_some()
    }

    /// Elapsed playback time as observed at `now`.
    pub fn elapsed_at(&self, now: Instant) -> Duration {
        match self.reference {
            Some(reference) => self.offset + now.saturating_duration_since(reference),
            None => self.held,
        }
    }
}
