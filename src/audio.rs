//! Audio session: decoding, playback and the playback clock.
//!
//! `AudioSession` owns the output stream, the decoded sample buffer and the
//! live playback handle. Elapsed time is derived from a reference-timestamp
//! clock rather than accumulated, so the position cursor cannot drift.

mod clock;
mod decode;
mod session;
mod types;

pub use clock::*;
pub use decode::*;
pub use session::*;
pub use types::*;
