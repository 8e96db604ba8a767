//! Application model types: `App` and `PlaybackState`.
//!
//! The `App` struct holds the current file list, selected entry and the
//! playback-related flags used by the UI and runtime. It mirrors the audio
//! session's observable state; it never owns the buffer or the handle.

use std::time::{Duration, Instant};

use crate::catalog::FileEntry;

/// The playback state of the application.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    Stopped,
    Playing,
    Paused,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::Stopped
    }
}

/// How long a transient notice stays on screen.
const NOTICE_TTL: Duration = Duration::from_secs(4);

/// The main application model.
pub struct App {
    pub entries: Vec<FileEntry>,
    pub selected: usize,
    pub playback: PlaybackState,

    lower_names: Option<Vec<String>>,

    /// Mirror of the session loop flag.
    pub loop_enabled: bool,
    /// Mirror of the session volume (0.0 - 1.0).
    pub volume: f32,
    /// Mirror of the session elapsed time.
    pub current_time: Duration,

    pub filter_mode: bool,
    pub filter_query: String,

    /// Directory prompt ("open dir") input state.
    pub prompt_mode: bool,
    pub prompt_input: String,

    /// A directory scan is in flight.
    pub scanning: bool,
    pub current_dir: Option<String>,
    pub metadata_window: bool,

    /// Transient user-facing message (decode errors, empty scans...).
    pub notice: Option<String>,
    notice_since: Option<Instant>,
}

impl App {
    /// Create a new `App` with the provided list of `entries`.
    pub fn new(entries: Vec<FileEntry>) -> Self {
        let lower_names = Self::precompute_lower_names(&entries);

        Self {
            entries,
            selected: 0,
            playback: PlaybackState::Stopped,

            lower_names,

            loop_enabled: false,
            volume: 1.0,
            current_time: Duration::ZERO,

            filter_mode: false,
            filter_query: String::new(),

            prompt_mode: false,
            prompt_input: String::new(),

            scanning: false,
            current_dir: None,
            metadata_window: false,

            notice: None,
            notice_since: None,
        }
    }

    // Optimization: for larger lists, precompute lowercase names to speed up
    // fuzzy filtering (avoid per-char lowercase conversions on every redraw).
    fn precompute_lower_names(entries: &[FileEntry]) -> Option<Vec<String>> {
        if entries.len() > 100 {
            Some(
                entries
                    .iter()
                    .map(|e| e.display.to_ascii_lowercase())
                    .collect(),
            )
        } else {
            None
        }
    }

    /// Replace the file list wholesale (a new directory was opened) and
    /// reset the view state that belonged to the old list.
    pub fn replace_entries(&mut self, entries: Vec<FileEntry>) {
        self.lower_names = Self::precompute_lower_names(&entries);
        self.entries = entries;
        self.selected = 0;
        self.filter_query.clear();
        self.filter_mode = false;
        self.metadata_window = false;
        self.playback = PlaybackState::Stopped;
        self.current_time = Duration::ZERO;
    }

    /// Record the current directory in the app state.
    pub fn set_current_dir(&mut self, dir: String) {
        self.current_dir = Some(dir);
    }

    pub fn toggle_metadata_window(&mut self) {
        self.metadata_window = !self.metadata_window;
    }

    /// Return true if the catalog contains any entries.
    pub fn has_entries(&self) -> bool {
        !self.entries.is_empty()
    }

    /// The entry under the cursor, if any.
    pub fn selected_entry(&self) -> Option<&FileEntry> {
        self.entries.get(self.selected)
    }

    /// Show a transient message; it expires after a few seconds.
    pub fn set_notice(&mut self, message: impl Into<String>, now: Instant) {
        self.notice = Some(message.into());
        self.notice_since = Some(now);
    }

    /// Expire a stale notice.
    pub fn tick_notice(&mut self, now: Instant) {
        if let Some(since) = self.notice_since {
            if now.saturating_duration_since(since) >= NOTICE_TTL {
                self.notice = None;
                self.notice_since = None;
            }
        }
    }

    /// Return the display order of entry indices, taking the active filter
    /// into account.
    pub fn display_indices(&self) -> Vec<usize> {
        let base: Vec<usize> = (0..self.entries.len()).collect();

        let query = self.filter_query.trim();
        if query.is_empty() {
            base
        } else {
            match self.lower_names.as_deref() {
                Some(lower_names) => {
                    let query_lower = query.to_ascii_lowercase();
                    base.into_iter()
                        .filter(|&i| {
                            Self::fuzzy_match_positions_lower(&lower_names[i], &query_lower)
                                .is_some()
                        })
                        .collect()
                }
                None => base
                    .into_iter()
                    .filter(|&i| {
                        Self::fuzzy_match_positions(&self.entries[i].display, query).is_some()
                    })
                    .collect(),
            }
        }
    }

    /// Return true if this `App` uses precomputed lowercase names.
    pub fn uses_lower_names(&self) -> bool {
        self.lower_names.is_some()
    }

    /// Fuzzy-match `query_lower` against a specific entry by index.
    ///
    /// Returns the character positions that match, or `None` when there is no match.
    pub fn fuzzy_match_positions_for_entry_lower(
        &self,
        entry_index: usize,
        query_lower: &str,
    ) -> Option<Vec<usize>> {
        if query_lower.is_empty() {
            return Some(Vec::new());
        }

        match self.lower_names.as_deref() {
            Some(lower_names) => {
                Self::fuzzy_match_positions_lower(&lower_names[entry_index], query_lower)
            }
            None => Self::fuzzy_match_positions(&self.entries[entry_index].display, query_lower),
        }
    }

    /// Return the next visible index in the current display order after `current`.
    /// Wraps around to the first element.
    pub fn next_in_view_from(&self, current: usize) -> Option<usize> {
        let display = self.display_indices();
        if display.is_empty() {
            return None;
        }

        let pos = display.iter().position(|&i| i == current);
        match pos {
            Some(p) => Some(display[(p + 1) % display.len()]),
            None => Some(display[0]),
        }
    }

    /// Return the previous visible index in the current display order before `current`.
    /// Wraps around to the last element.
    pub fn prev_in_view_from(&self, current: usize) -> Option<usize> {
        let display = self.display_indices();
        if display.is_empty() {
            return None;
        }

        let pos = display.iter().position(|&i| i == current);
        match pos {
            Some(0) => Some(display[display.len() - 1]),
            Some(p) => Some(display[p - 1]),
            None => Some(display[display.len() - 1]),
        }
    }

    /// Set the selected entry index and ensure it is visible in the display.
    pub fn set_selected(&mut self, idx: usize) {
        self.selected = idx;
        self.ensure_selected_visible();
    }

    /// Fuzzy/subsequence match: return the character positions in `name`
    /// that match `query`, or `None` if not matched.
    pub fn fuzzy_match_positions(name: &str, query: &str) -> Option<Vec<usize>> {
        if query.is_empty() {
            return Some(Vec::new());
        }

        let mut positions: Vec<usize> = Vec::new();
        let mut name_iter = name.chars().enumerate();

        for qc in query.chars() {
            let qc_low = qc.to_ascii_lowercase();
            loop {
                match name_iter.next() {
                    Some((ni, nc)) if nc.to_ascii_lowercase() == qc_low => {
                        positions.push(ni);
                        break;
                    }
                    Some(_) => continue,
                    None => return None,
                }
            }
        }

        Some(positions)
    }

    fn fuzzy_match_positions_lower(name_lower: &str, query_lower: &str) -> Option<Vec<usize>> {
        if query_lower.is_empty() {
            return Some(Vec::new());
        }

        let mut positions: Vec<usize> = Vec::new();
        let mut name_iter = name_lower.chars().enumerate();

        for qc in query_lower.chars() {
            loop {
                match name_iter.next() {
                    Some((ni, nc)) if nc == qc => {
                        positions.push(ni);
                        break;
                    }
                    Some(_) => continue,
                    None => return None,
                }
            }
        }

        Some(positions)
    }

    /// Enter filter mode.
    pub fn enter_filter_mode(&mut self) {
        self.filter_mode = true;
        self.ensure_selected_visible();
    }
    /// Exit filter mode, keeping the query applied.
    pub fn exit_filter_mode(&mut self) {
        self.filter_mode = false;
    }
    /// Clear the active filter and restore selection visibility.
    pub fn clear_filter(&mut self) {
        self.filter_query.clear();
        self.filter_mode = false;
        self.ensure_selected_visible();
    }
    /// Append a character to the filter query and refresh the view.
    pub fn push_filter_char(&mut self, c: char) {
        self.filter_query.push(c);
        self.ensure_selected_visible();
    }
    /// Remove the last character from the filter query and refresh the view.
    pub fn pop_filter_char(&mut self) {
        self.filter_query.pop();
        self.ensure_selected_visible();
    }

    /// Enter the open-directory prompt.
    pub fn enter_prompt_mode(&mut self) {
        self.prompt_mode = true;
        self.prompt_input.clear();
    }
    /// Leave the prompt without opening anything (prior state preserved).
    pub fn cancel_prompt(&mut self) {
        self.prompt_mode = false;
        self.prompt_input.clear();
    }
    /// Take the typed path and leave prompt mode.
    pub fn take_prompt_input(&mut self) -> String {
        self.prompt_mode = false;
        std::mem::take(&mut self.prompt_input)
    }

    /// Ensure that `selected` is part of the current filtered view,
    /// otherwise move selection to the first visible entry.
    fn ensure_selected_visible(&mut self) {
        let display = self.display_indices();
        if display.is_empty() {
            self.selected = 0;
            return;
        }

        if !display.contains(&self.selected) {
            self.selected = display[0];
        }
    }

    /// Move selection to the next visible entry.
    pub fn next(&mut self) {
        if let Some(next) = self.next_in_view_from(self.selected) {
            self.selected = next;
        }
    }

    /// Move selection to the previous visible entry.
    pub fn prev(&mut self) {
        if let Some(prev) = self.prev_in_view_from(self.selected) {
            self.selected = prev;
        }
    }
}
