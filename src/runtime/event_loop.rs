use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::{Duration, Instant};

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use ratatui::layout::Rect;
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::{App, PlaybackState};
use crate::audio::{self, AudioSession};
use crate::catalog::{self, CancelToken, FileEntry};
use crate::config;
use crate::ui;
use crate::waveform::WaveformView;

/// State tracked by the runtime event loop across iterations.
pub struct EventLoopState {
    /// Internal two-key prefix state used for `gg` handling.
    pub pending_gg: bool,
    /// Decode deferred by one frame so the "decoding" notice is on screen
    /// while the blocking decode runs.
    pub pending_load: Option<PathBuf>,
    /// Channel for the in-flight directory scan, if any.
    scan_rx: Option<Receiver<Vec<FileEntry>>>,
    /// Token for the in-flight scan; cancelled when a newer scan starts.
    scan_token: Option<CancelToken>,
}

impl EventLoopState {
    pub fn new() -> Self {
        Self {
            pending_gg: false,
            pending_load: None,
            scan_rx: None,
            scan_token: None,
        }
    }
}

/// Main terminal event loop: draws the UI, mirrors audio session state,
/// collects background scans and dispatches key/mouse input. Returns
/// `Ok(())` when shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    session: &mut AudioSession,
    wave_view: &mut WaveformView,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        poll_scan(app, state);

        // End-of-buffer bookkeeping: loop wrap or stop at the natural end.
        session.tick();

        // Mirror observable session state for display.
        app.current_time = session.current_time();
        app.loop_enabled = session.is_looping();
        app.volume = session.volume();
        app.playback = if session.is_playing() {
            PlaybackState::Playing
        } else if app.current_time > Duration::ZERO {
            PlaybackState::Paused
        } else {
            PlaybackState::Stopped
        };
        app.tick_notice(Instant::now());

        let display = app.display_indices();
        terminal.draw(|f| {
            ui::draw(
                f,
                app,
                session,
                wave_view,
                &display,
                &settings.ui,
                &settings.controls,
            )
        })?;

        // The notice frame above is on screen now; run the deferred decode.
        if let Some(path) = state.pending_load.take() {
            load_and_play(app, session, wave_view, &path);
            continue;
        }

        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if handle_key_event(key, settings, app, session, state)? {
                        break;
                    }
                }
                Event::Mouse(mouse) => {
                    let size = terminal.size()?;
                    let area = Rect::new(0, 0, size.width, size.height);
                    handle_mouse_event(mouse, area, app, session);
                }
                Event::Resize(_, _) => wave_view.mark_dirty(),
                _ => {}
            }
        }
    }

    Ok(())
}

/// Collect a finished background scan, discarding superseded results.
fn poll_scan(app: &mut App, state: &mut EventLoopState) {
    let Some(rx) = &state.scan_rx else {
        return;
    };

    match rx.try_recv() {
        Ok(entries) => {
            let cancelled = state
                .scan_token
                .as_ref()
                .map(|t| t.is_cancelled())
                .unwrap_or(false);
            state.scan_rx = None;
            state.scan_token = None;
            app.scanning = false;

            if cancelled {
                // A newer open superseded this scan; its partial results
                // must not replace the list.
                return;
            }

            let count = entries.len();
            app.replace_entries(entries);
            if count == 0 {
                app.set_notice("no audio files found", Instant::now());
            }
        }
        Err(TryRecvError::Empty) => {}
        Err(TryRecvError::Disconnected) => {
            state.scan_rx = None;
            state.scan_token = None;
            app.scanning = false;
        }
    }
}

/// Reset the view, cancel any in-flight scan and start a fresh one.
fn open_directory(
    input: String,
    settings: &config::Settings,
    app: &mut App,
    session: &mut AudioSession,
    state: &mut EventLoopState,
) {
    let dir = PathBuf::from(input.trim());
    if !dir.is_dir() {
        app.set_notice(
            format!("not a directory: {}", dir.display()),
            Instant::now(),
        );
        return;
    }

    if let Some(token) = &state.scan_token {
        token.cancel();
    }

    session.unload();
    app.replace_entries(Vec::new());
    app.set_current_dir(dir.display().to_string());
    app.scanning = true;

    let token = CancelToken::new();
    state.scan_rx = Some(catalog::spawn_scan(
        dir,
        settings.library.clone(),
        token.clone(),
    ));
    state.scan_token = Some(token);
}

/// Queue the selected entry for decoding on the next frame.
fn request_load(app: &mut App, state: &mut EventLoopState) {
    let Some((path, display)) = app
        .selected_entry()
        .map(|e| (e.path.clone(), e.display.clone()))
    else {
        return;
    };

    if audio::needs_loading_hint(&path) {
        app.set_notice(format!("decoding {display} (large file)..."), Instant::now());
    }
    state.pending_load = Some(path);
}

/// Decode `path` into the session and start playback from the top.
fn load_and_play(app: &mut App, session: &mut AudioSession, wave_view: &mut WaveformView, path: &Path) {
    match session.load(path) {
        Ok(()) => {
            wave_view.mark_dirty();
            session.play(Duration::ZERO);
            app.playback = PlaybackState::Playing;
        }
        Err(e) => {
            log::warn!("load of {path:?} failed: {e}");
            app.set_notice(format!("decode failed: {e}"), Instant::now());
        }
    }
}

fn handle_key_event(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    session: &mut AudioSession,
    state: &mut EventLoopState,
) -> Result<bool, Box<dyn std::error::Error>> {
    if app.prompt_mode {
        match key.code {
            // Declining the prompt is a no-op; prior state is preserved.
            KeyCode::Esc => app.cancel_prompt(),
            KeyCode::Enter => {
                let input = app.take_prompt_input();
                if !input.trim().is_empty() {
                    open_directory(input, settings, app, session, state);
                }
            }
            KeyCode::Backspace => {
                app.prompt_input.pop();
            }
            KeyCode::Char(c) => {
                if !c.is_control() {
                    app.prompt_input.push(c);
                }
            }
            _ => {}
        }

        return Ok(false);
    }

    if app.filter_mode {
        state.pending_gg = false;
        match key.code {
            KeyCode::Esc => app.clear_filter(),
            KeyCode::Backspace => app.pop_filter_char(),
            KeyCode::Char('j') if key.modifiers.contains(KeyModifiers::CONTROL) => app.next(),
            KeyCode::Char('k') if key.modifiers.contains(KeyModifiers::CONTROL) => app.prev(),
            KeyCode::Char('n') if key.modifiers.contains(KeyModifiers::CONTROL) => app.next(),
            KeyCode::Char('p') if key.modifiers.contains(KeyModifiers::CONTROL) => app.prev(),
            KeyCode::Char(c) => {
                if !c.is_control() {
                    app.push_filter_char(c);
                }
            }
            KeyCode::Enter => {
                if app.display_indices().is_empty() {
                    return Ok(false);
                }

                app.exit_filter_mode();
                request_load(app, state);
            }
            _ => {}
        }

        return Ok(false);
    }

    match key.code {
        KeyCode::Char('q') => {
            state.pending_gg = false;
            session.stop();
            return Ok(true);
        }
        KeyCode::Char('/') => {
            state.pending_gg = false;
            app.enter_filter_mode();
        }
        KeyCode::Char('o') => {
            state.pending_gg = false;
            app.enter_prompt_mode();
        }
        KeyCode::Char('r') => {
            state.pending_gg = false;
            // Applies to the live handle without interrupting playback.
            app.loop_enabled = session.toggle_loop();
        }
        KeyCode::Char('g') => {
            if state.pending_gg {
                state.pending_gg = false;
                let display = app.display_indices();
                if let Some(&first) = display.first() {
                    app.set_selected(first);
                }
            } else {
                state.pending_gg = true;
            }
        }
        KeyCode::Char('G') => {
            state.pending_gg = false;
            let display = app.display_indices();
            if let Some(&last) = display.last() {
                app.set_selected(last);
            }
        }
        KeyCode::Char('j') | KeyCode::Down => {
            state.pending_gg = false;
            app.next();
        }
        KeyCode::Char('k') | KeyCode::Up => {
            state.pending_gg = false;
            app.prev();
        }
        KeyCode::Enter => {
            state.pending_gg = false;
            if app.has_entries() {
                request_load(app, state);
            }
        }
        KeyCode::Char('p') | KeyCode::Char(' ') => {
            state.pending_gg = false;
            if session.has_buffer() {
                session.toggle();
            }
        }
        KeyCode::Char('x') => {
            state.pending_gg = false;
            session.stop();
        }
        KeyCode::Char('L') => {
            state.pending_gg = false;
            let secs = settings.controls.seek_seconds.min(i64::MAX as u64) as i64;
            session.seek_by(secs);
        }
        KeyCode::Char('H') => {
            state.pending_gg = false;
            let secs = settings.controls.seek_seconds.min(i64::MAX as u64) as i64;
            session.seek_by(-secs);
        }
        KeyCode::Char('+') | KeyCode::Char('=') => {
            state.pending_gg = false;
            session.set_volume(session.volume() + settings.controls.volume_step);
        }
        KeyCode::Char('-') => {
            state.pending_gg = false;
            session.set_volume(session.volume() - settings.controls.volume_step);
        }
        KeyCode::Char('K') => {
            state.pending_gg = false;
            app.toggle_metadata_window();
        }
        KeyCode::Char(_) => {
            // g pending should clear on any other printable char
            state.pending_gg = false;
        }
        _ => {}
    }

    Ok(false)
}

/// Click-to-seek: a left click inside the waveform panel maps the column to
/// a proportional offset into the buffer.
fn handle_mouse_event(mouse: MouseEvent, area: Rect, app: &mut App, session: &mut AudioSession) {
    if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
        return;
    }
    let Some(duration) = session.duration() else {
        return;
    };

    let inner = ui::waveform_inner(area);
    if inner.width == 0 {
        return;
    }
    let inside = mouse.column >= inner.x
        && mouse.column < inner.x + inner.width
        && mouse.row >= inner.y
        && mouse.row < inner.y + inner.height;
    if !inside {
        return;
    }

    let frac = (mouse.column - inner.x) as f64 / inner.width as f64;
    session.seek(Duration::from_secs_f64(duration.as_secs_f64() * frac));
    app.playback = PlaybackState::Playing;
}
