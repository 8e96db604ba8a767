use std::error::Error;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

use rodio::{Decoder, Source};

use super::types::DecodedAudio;

/// Files above this size get a "decoding" frame drawn before the blocking
/// decode; latency scales with file size.
pub const LOADING_HINT_BYTES: u64 = 50 * 1024 * 1024;

/// True when decoding `path` is expected to be slow enough to warrant a
/// loading frame first.
pub fn needs_loading_hint(path: &Path) -> bool {
    fs::metadata(path)
        .map(|m| m.len() > LOADING_HINT_BYTES)
        .unwrap_or(false)
}

/// Decode the whole file into memory.
///
/// Corrupt or unsupported data is an error; no partial buffer is produced.
pub fn decode_file(path: &Path) -> Result<DecodedAudio, Box<dyn Error>> {
    let file = File::open(path)?;
    let decoder = Decoder::new(BufReader::new(file))
        .map_err(|e| format!("could not decode {}: {e}", path.display()))?;

    let channels = decoder.channels();
    let sample_rate = decoder.sample_rate();
    let samples: Vec<f32> = decoder.collect();

    if samples.is_empty() {
        return Err(format!("no audio data in {}", path.display()).into());
    }

    log::debug!(
        "decoded {}: {} samples, {channels} ch @ {sample_rate} Hz",
        path.display(),
        samples.len()
    );

    Ok(DecodedAudio::new(samples, channels, sample_rate))
}
