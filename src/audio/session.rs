use std::error::Error;
use std::path::Path;
use std::time::{Duration, Instant};

use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, OutputStreamBuilder, Sink, Source};

use super::clock::PlaybackClock;
use super::decode;
use super::types::DecodedAudio;

/// Owner of the decoded buffer and the live playback handle.
///
/// At most one sink is alive at a time; every play/seek stops and discards
/// the previous one, because the underlying source is not repositionable.
pub struct AudioSession {
    stream: OutputStream,
    sink: Option<Sink>,
    buffer: Option<DecodedAudio>,
    clock: PlaybackClock,
    playing: bool,
    looping: bool,
    volume: f32,
}

impl AudioSession {
    pub fn new() -> Result<Self, Box<dyn Error>> {
        let mut stream = OutputStreamBuilder::open_default_stream()?;
        // rodio logs to stderr when OutputStream is dropped. That's useful in
        // debugging, but noisy for a TUI app.
        stream.log_on_drop(false);

        Ok(Self {
            stream,
            sink: None,
            buffer: None,
            clock: PlaybackClock::new(),
            playing: false,
            looping: false,
            volume: 1.0,
        })
    }

    /// Decode `path` into memory, replacing any previous buffer.
    ///
    /// Playback stops and the old buffer is dropped before decoding starts,
    /// so a failure leaves the session in the "no buffer loaded" state.
    pub fn load(&mut self, path: &Path) -> Result<(), Box<dyn Error>> {
        self.stop();
        self.buffer = None;

        let decoded = decode::decode_file(path)?;
        log::info!(
            "loaded {}: {:.2}s, {} ch @ {} Hz",
            path.display(),
            decoded.duration().as_secs_f64(),
            decoded.channels(),
            decoded.sample_rate()
        );
        self.buffer = Some(decoded);
        Ok(())
    }

    pub fn buffer(&self) -> Option<&DecodedAudio> {
        self.buffer.as_ref()
    }

    pub fn has_buffer(&self) -> bool {
        self.buffer.is_some()
    }

    pub fn duration(&self) -> Option<Duration> {
        self.buffer.as_ref().map(|b| b.duration())
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Elapsed playback time, derived from the clock reference.
    pub fn current_time(&self) -> Duration {
        self.clock.elapsed_at(Instant::now())
    }

    /// Start playback at `offset` into the buffer.
    ///
    /// A no-op without a buffer. An offset past the end wraps when looping
    /// and otherwise ends immediately at the natural end of the buffer.
    pub fn play(&mut self, offset: Duration) {
        let Some(buffer) = self.buffer.as_ref() else {
            return;
        };
        let offset = clamp_offset(offset, buffer.duration(), self.looping);

        if let Some(old) = self.sink.take() {
            old.stop();
        }

        let source = SamplesBuffer::new(
            buffer.channels(),
            buffer.sample_rate(),
            buffer.samples().to_vec(),
        )
        .skip_duration(offset);

        let sink = Sink::connect_new(self.stream.mixer());
        sink.set_volume(self.volume);
        sink.append(source);
        sink.play();

        self.sink = Some(sink);
        self.clock.start_at(Instant::now(), offset);
        self.playing = true;
    }

    /// Stop the handle, keeping the elapsed time for a later resume.
    pub fn pause(&mut self) {
        if !self.playing {
            return;
        }
        self.clock.pause_at(Instant::now());
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.playing = false;
    }

    /// Stop playback and discard the decoded buffer (a new directory was
    /// opened and the old selection no longer exists).
    pub fn unload(&mut self) {
        self.stop();
        self.buffer = None;
    }

    /// Stop playback and reset the elapsed time to zero.
    pub fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.clock.reset();
        self.playing = false;
    }

    /// Pause when playing, otherwise resume from the held time.
    pub fn toggle(&mut self) {
        if self.playing {
            self.pause();
        } else {
            let held = self.current_time();
            self.play(held);
        }
    }

    /// Restart the handle at `offset`.
    pub fn seek(&mut self, offset: Duration) {
        self.play(offset);
    }

    /// Seek relative to the current time, clamping at zero.
    pub fn seek_by(&mut self, delta_secs: i64) {
        if self.buffer.is_none() {
            return;
        }
        let target = (self.current_time().as_secs_f64() + delta_secs as f64).max(0.0);
        self.play(Duration::from_secs_f64(target));
    }

    /// Flip the loop flag. The live handle keeps playing; the wrap is
    /// applied by `tick` when the end of the buffer is reached.
    pub fn toggle_loop(&mut self) -> bool {
        self.looping = !self.looping;
        self.looping
    }

    pub fn set_looping(&mut self, on: bool) {
        self.looping = on;
    }

    /// Set gain (clamped to 0.0-1.0) on the live handle and all future ones.
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        if let Some(sink) = &self.sink {
            sink.set_volume(self.volume);
        }
    }

    /// Per-frame end-of-buffer bookkeeping.
    ///
    /// Looping wraps by resetting the clock reference (overshoot preserved
    /// modulo the duration) and restarting the handle; otherwise playback
    /// stops and the elapsed time resets to zero. Returns true while the
    /// position cursor is live.
    pub fn tick(&mut self) -> bool {
        if !self.playing {
            return false;
        }
        let Some(duration) = self.duration() else {
            return false;
        };

        let elapsed = self.clock.elapsed_at(Instant::now());
        if elapsed >= duration {
            if self.looping {
                let wrapped = wrap_elapsed(elapsed, duration);
                log::debug!("loop wrap at {:.2}s", elapsed.as_secs_f64());
                self.play(wrapped);
            } else {
                self.stop();
                return false;
            }
        }
        true
    }
}

/// Clamp a requested start offset to the buffer, wrapping when looping.
fn clamp_offset(offset: Duration, duration: Duration, looping: bool) -> Duration {
    if offset < duration {
        return offset;
    }
    if looping && !duration.is_zero() {
        wrap_elapsed(offset, duration)
    } else {
        duration
    }
}

/// Elapsed time folded back into the buffer after passing the end.
fn wrap_elapsed(elapsed: Duration, duration: Duration) -> Duration {
    if duration.is_zero() {
        return Duration::ZERO;
    }
    Duration::from_secs_f64(elapsed.as_secs_f64() % duration.as_secs_f64())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_offset_passes_in_range_offsets_through() {
        let d = Duration::from_secs(2);
        assert_eq!(clamp_offset(Duration::from_millis(500), d, false), Duration::from_millis(500));
        assert_eq!(clamp_offset(Duration::from_millis(500), d, true), Duration::from_millis(500));
    }

    #[test]
    fn clamp_offset_clamps_to_the_end_when_not_looping() {
        let d = Duration::from_secs(2);
        assert_eq!(clamp_offset(Duration::from_secs(5), d, false), d);
    }

    #[test]
    fn clamp_offset_wraps_when_looping() {
        let d = Duration::from_secs(1);
        let wrapped = clamp_offset(Duration::from_millis(1300), d, true);
        assert!((wrapped.as_secs_f64() - 0.3).abs() < 1e-6);
    }

    #[test]
    fn wrap_elapsed_preserves_the_overshoot() {
        let wrapped = wrap_elapsed(Duration::from_millis(1300), Duration::from_secs(1));
        assert!((wrapped.as_secs_f64() - 0.3).abs() < 1e-6);

        assert_eq!(
            wrap_elapsed(Duration::from_secs(3), Duration::ZERO),
            Duration::ZERO
        );
    }
}
