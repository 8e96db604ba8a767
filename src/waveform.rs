//! Static waveform trace.
//!
//! The decoded buffer is downsampled once per load/resize into a
//! bounded-width trace of signed amplitudes; playback never touches it.

use crate::audio::DecodedAudio;

/// Downsampling step: roughly one drawn sample per twenty raw samples per
/// column of width. The 0.05 ratio trades visual fidelity against draw
/// cost; lower it for more detail. Always at least 1.
pub fn downsample_step(frames: usize, width: u16) -> usize {
    let width = width.max(1) as f64;
    let step = (frames as f64 / width * 0.05).floor() as usize;
    step.max(1)
}

/// One column of the trace: horizontal position and signed amplitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TracePoint {
    pub x: f32,
    pub amplitude: f32,
}

/// Downsample `audio` into a trace bounded by `width` columns.
///
/// Stereo frames are averaged into a single signed amplitude. Empty when
/// there is nothing to draw.
pub fn render_trace(audio: &DecodedAudio, width: u16) -> Vec<TracePoint> {
    let frames = audio.frames();
    if frames == 0 || width == 0 {
        return Vec::new();
    }

    let step = downsample_step(frames, width);
    let mut trace = Vec::with_capacity(frames / step + 1);
    let mut i = 0;
    while i < frames {
        trace.push(TracePoint {
            x: (i as f32 / frames as f32) * width as f32,
            amplitude: audio.frame_amplitude(i),
        });
        i += step;
    }
    trace
}

/// Map a signed amplitude in [-1, 1] to a vertical position in [0, height]:
/// -1 maps to 0, 0 to exactly height/2 and +1 to height.
pub fn amplitude_to_y(sample: f32, height: f32) -> f32 {
    ((sample + 1.0) / 2.0) * height
}

/// Cached trace, rebuilt only when a new buffer loads or the panel width
/// changes; cleared to a no-op when no buffer is loaded.
pub struct WaveformView {
    width: u16,
    dirty: bool,
    trace: Vec<TracePoint>,
}

impl Default for WaveformView {
    fn default() -> Self {
        Self::new()
    }
}

impl WaveformView {
    pub fn new() -> Self {
        Self {
            width: 0,
            dirty: true,
            trace: Vec::new(),
        }
    }

    /// Force a rebuild on the next `ensure` (new buffer, terminal resize).
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Return the trace for `width`, rebuilding it only when needed.
    pub fn ensure(&mut self, audio: Option<&DecodedAudio>, width: u16) -> &[TracePoint] {
        match audio {
            None => {
                self.trace.clear();
                self.width = width;
            }
            Some(audio) => {
                if self.dirty || width != self.width {
                    self.trace = render_trace(audio, width);
                    self.width = width;
                    self.dirty = false;
                }
            }
        }
        &self.trace
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mono(samples: Vec<f32>) -> DecodedAudio {
        DecodedAudio::new(samples, 1, 44_100)
    }

    #[test]
    fn downsample_step_is_at_least_one_for_degenerate_widths() {
        assert_eq!(downsample_step(0, 0), 1);
        assert_eq!(downsample_step(10, 0), 1);
        assert_eq!(downsample_step(10, 1), 1);
        assert_eq!(downsample_step(1, 800), 1);
        assert!(downsample_step(10_000_000, 800) >= 1);
    }

    #[test]
    fn downsample_step_follows_the_fixed_ratio() {
        // 1_000_000 frames over 500 columns: floor(2000 * 0.05) = 100.
        assert_eq!(downsample_step(1_000_000, 500), 100);
    }

    #[test]
    fn amplitude_mapping_hits_the_exact_endpoints() {
        assert_eq!(amplitude_to_y(-1.0, 100.0), 0.0);
        assert_eq!(amplitude_to_y(0.0, 100.0), 50.0);
        assert_eq!(amplitude_to_y(1.0, 100.0), 100.0);
    }

    #[test]
    fn render_trace_is_empty_without_frames_or_width() {
        assert!(render_trace(&mono(vec![]), 80).is_empty());
        assert!(render_trace(&mono(vec![0.5; 100]), 0).is_empty());
    }

    #[test]
    fn render_trace_positions_stay_inside_the_width() {
        let audio = mono((0..10_000).map(|i| (i % 7) as f32 / 7.0).collect());
        let trace = render_trace(&audio, 80);

        assert!(!trace.is_empty());
        assert!(trace.iter().all(|p| p.x >= 0.0 && p.x < 80.0));
        assert!(trace.windows(2).all(|w| w[0].x <= w[1].x));
    }

    #[test]
    fn render_trace_averages_stereo_frames() {
        // Single frame L=1.0, R=0.0 -> amplitude 0.5.
        let audio = DecodedAudio::new(vec![1.0, 0.0], 2, 44_100);
        let trace = render_trace(&audio, 10);
        assert_eq!(trace.len(), 1);
        assert_eq!(trace[0].amplitude, 0.5);
    }

    #[test]
    fn waveform_view_rebuilds_only_on_dirty_or_resize() {
        let audio = mono(vec![0.25; 1_000]);
        let mut view = WaveformView::new();

        let first = view.ensure(Some(&audio), 40).len();
        assert!(first > 0);

        // Same width, not dirty: the cache is reused (same contents).
        assert_eq!(view.ensure(Some(&audio), 40).len(), first);

        // Resize rebuilds for the new width.
        let resized = view.ensure(Some(&audio), 80).len();
        assert!(resized > 0);

        // No buffer clears the trace.
        assert!(view.ensure(None, 80).is_empty());
    }
}
