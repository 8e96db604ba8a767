use std::path::PathBuf;
use std::time::Duration;

/// A playable file found during a scan.
///
/// `display` is derived from the path relative to the scan root (segments
/// joined, extension stripped); the tag fields are best-effort metadata for
/// the info popup and may be absent.
#[derive(Clone)]
pub struct FileEntry {
    pub path: PathBuf,
    pub display: String,
    pub title: String,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub duration: Option<Duration>,
}
