use super::*;
use crate::catalog::FileEntry;
use std::time::{Duration, Instant};

fn e(display: &str) -> FileEntry {
    FileEntry {
        path: std::path::PathBuf::new(),
        display: display.into(),
        title: display.into(),
        artist: None,
        album: None,
        duration: None,
    }
}

#[test]
fn fuzzy_match_simple() {
    let name = "Hello World";
    assert!(App::fuzzy_match_positions(name, "hw").is_some());
    assert!(App::fuzzy_match_positions(name, "ello").is_some());
    assert!(App::fuzzy_match_positions(name, "xyz").is_none());
}

#[test]
fn display_indices_respects_filter_query() {
    let entries = vec![e("Alpha"), e("Beta"), e("Gamma")];
    let mut app = App::new(entries);
    app.push_filter_char('a');
    let visible = app.display_indices();
    assert!(!visible.is_empty());
}

#[test]
fn display_indices_uses_fuzzy_not_substring_only() {
    let entries = vec![e("drums / kick one"), e("synth / pad two")];

    let mut app = App::new(entries);
    // Fuzzy query: letters appear in order but not necessarily contiguously
    app.filter_query = "dko".into();

    let disp = app.display_indices();
    assert_eq!(disp, vec![0]);
}

#[test]
fn trimming_filter_query_affects_matching() {
    let entries = vec![e("field recording")];

    let mut app = App::new(entries);
    app.filter_query = "field ".into();
    assert_eq!(app.display_indices(), vec![0]);

    app.filter_query = "   ".into();
    assert_eq!(app.display_indices(), vec![0]);
}

#[test]
fn next_prev_in_view_helpers_work() {
    let entries = vec![e("Alpha"), e("Beta"), e("Gamma")];

    let mut app = App::new(entries);
    app.filter_query = "et".into(); // only Beta is visible

    assert_eq!(app.next_in_view_from(0), Some(1));
    assert_eq!(app.prev_in_view_from(0), Some(1));
    assert_eq!(app.next_in_view_from(1), Some(1));
    assert_eq!(app.prev_in_view_from(1), Some(1));
}

#[test]
fn selection_wraps_around_the_visible_list() {
    let entries = vec![e("a"), e("b"), e("c")];
    let mut app = App::new(entries);

    assert_eq!(app.selected, 0);
    app.next();
    app.next();
    assert_eq!(app.selected, 2);
    app.next();
    assert_eq!(app.selected, 0);
    app.prev();
    assert_eq!(app.selected, 2);
}

#[test]
fn replace_entries_resets_view_state() {
    let mut app = App::new(vec![e("a"), e("b")]);
    app.set_selected(1);
    app.filter_query = "b".into();
    app.filter_mode = true;
    app.playback = PlaybackState::Playing;
    app.current_time = Duration::from_secs(3);
    app.metadata_window = true;

    app.replace_entries(vec![e("x")]);

    assert_eq!(app.selected, 0);
    assert!(app.filter_query.is_empty());
    assert!(!app.filter_mode);
    assert!(!app.metadata_window);
    assert_eq!(app.playback, PlaybackState::Stopped);
    assert_eq!(app.current_time, Duration::ZERO);
    assert_eq!(app.entries.len(), 1);
}

#[test]
fn lower_name_precompute_kicks_in_for_large_lists() {
    let small = App::new(vec![e("a")]);
    assert!(!small.uses_lower_names());

    let entries: Vec<FileEntry> = (0..200).map(|i| e(&format!("track {i:03}"))).collect();
    let mut app = App::new(entries);
    assert!(app.uses_lower_names());

    app.filter_query = "track 150".into();
    assert_eq!(app.display_indices(), vec![150]);
    assert_eq!(
        app.fuzzy_match_positions_for_entry_lower(150, "track"),
        Some(vec![0, 1, 2, 3, 4])
    );
}

#[test]
fn prompt_mode_round_trip() {
    let mut app = App::new(vec![]);

    app.enter_prompt_mode();
    assert!(app.prompt_mode);
    app.prompt_input.push_str("/music");

    let taken = app.take_prompt_input();
    assert_eq!(taken, "/music");
    assert!(!app.prompt_mode);
    assert!(app.prompt_input.is_empty());

    app.enter_prompt_mode();
    app.prompt_input.push('x');
    app.cancel_prompt();
    assert!(!app.prompt_mode);
    assert!(app.prompt_input.is_empty());
}

#[test]
fn notices_expire_after_their_ttl() {
    let t0 = Instant::now();
    let mut app = App::new(vec![]);

    app.set_notice("decode failed", t0);
    assert!(app.notice.is_some());

    app.tick_notice(t0 + Duration::from_secs(1));
    assert!(app.notice.is_some());

    app.tick_notice(t0 + Duration::from_secs(10));
    assert!(app.notice.is_none());
}

#[test]
fn selected_entry_follows_the_cursor() {
    let mut app = App::new(vec![e("a"), e("b")]);
    assert_eq!(app.selected_entry().unwrap().display, "a");
    app.set_selected(1);
    assert_eq!(app.selected_entry().unwrap().display, "b");

    let empty = App::new(vec![]);
    assert!(empty.selected_entry().is_none());
}
