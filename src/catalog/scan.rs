use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Duration;

use lofty::{AudioFile, ItemKey, TaggedFileExt};
use walkdir::WalkDir;

use crate::config::LibrarySettings;

use super::display::display_name;
use super::model::FileEntry;

/// Cooperative cancellation flag shared with an in-flight scan.
///
/// The scan checks the token between entries; cancelling stops the walk
/// promptly and yields whatever was found so far.
#[derive(Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Scan `dir` for playable files, honoring `settings` and `cancel`.
///
/// Unreadable entries are skipped. The result is sorted ascending by
/// lowercased display name; discovery order is unspecified.
pub fn scan(dir: &Path, settings: &LibrarySettings, cancel: &CancelToken) -> Vec<FileEntry> {
    let mut entries: Vec<FileEntry> = Vec::new();

    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);
    if let Some(d) = settings.max_depth {
        walker = walker.max_depth(d);
    }

    for entry in walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
    {
        if cancel.is_cancelled() {
            log::debug!("scan of {dir:?} cancelled after {} entries", entries.len());
            break;
        }

        let path = entry.path();
        if path.is_file()
            && (settings.include_hidden || !is_hidden(path))
            && is_audio_file(path, settings)
        {
            let default_title = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("UNKNOWN")
                .to_string();

            let mut title = default_title;
            let mut artist: Option<String> = None;
            let mut album: Option<String> = None;
            let mut duration: Option<Duration> = None;

            if let Ok(tagged) = lofty::read_from_path(path) {
                duration = Some(tagged.properties().duration());

                if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
                    if let Some(v) = tag.get_string(&ItemKey::TrackTitle) {
                        if !v.trim().is_empty() {
                            title = v.to_string();
                        }
                    }
                    if let Some(v) = tag.get_string(&ItemKey::TrackArtist) {
                        let v = v.trim();
                        if !v.is_empty() {
                            artist = Some(v.to_string());
                        }
                    }
                    if let Some(v) = tag.get_string(&ItemKey::AlbumTitle) {
                        let v = v.trim();
                        if !v.is_empty() {
                            album = Some(v.to_string());
                        }
                    }
                }
            }

            let display = display_name(dir, path, &settings.display_separator);

            entries.push(FileEntry {
                path: path.to_path_buf(),
                display,
                title,
                artist,
                album,
                duration,
            });
        }
    }

    entries.sort_by(|a, b| a.display.to_lowercase().cmp(&b.display.to_lowercase()));
    entries
}

/// Run `scan` on a worker thread so the UI keeps drawing.
///
/// The full result arrives on the returned channel once the walk finishes
/// (or was cancelled early); callers decide whether a cancelled result is
/// still worth keeping.
pub fn spawn_scan(
    dir: PathBuf,
    settings: LibrarySettings,
    cancel: CancelToken,
) -> Receiver<Vec<FileEntry>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let entries = scan(&dir, &settings, &cancel);
        log::debug!("scan of {dir:?} finished with {} entries", entries.len());
        let _ = tx.send(entries);
    });
    rx
}
