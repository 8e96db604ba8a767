use std::time::Duration;

/// In-memory decoded audio: interleaved f32 samples for all channels plus
/// the channel count and sample rate. Replaced wholesale on every load.
pub struct DecodedAudio {
    samples: Vec<f32>,
    channels: u16,
    sample_rate: u32,
}

impl DecodedAudio {
    pub fn new(samples: Vec<f32>, channels: u16, sample_rate: u32) -> Self {
        Self {
            samples,
            channels: channels.max(1),
            sample_rate: sample_rate.max(1),
        }
    }

    /// Interleaved samples, `channels` values per frame.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of per-channel sample frames.
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.frames() as f64 / self.sample_rate as f64)
    }

    /// Signed amplitude of frame `i`, averaged across channels.
    ///
    /// Out-of-range frames read as silence.
    pub fn frame_amplitude(&self, frame: usize) -> f32 {
        let ch = self.channels as usize;
        let start = frame * ch;
        let end = (start + ch).min(self.samples.len());
        if start >= end {
            return 0.0;
        }
        let sum: f32 = self.samples[start..end].iter().sum();
        sum / (end - start) as f32
    }
}
