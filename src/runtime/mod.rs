use std::env;
use std::error::Error;
use std::path::Path;
use std::time::Instant;

use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::audio::AudioSession;
use crate::catalog::{self, CancelToken};
use crate::waveform::WaveformView;

mod event_loop;
mod settings;
mod startup;

pub fn run() -> Result<(), Box<dyn Error>> {
    init_logging()?;
    let settings = settings::load_settings();

    let dir = env::args().nth(1).unwrap_or_else(|| {
        std::env::current_dir()
            .ok()
            .and_then(|p| p.to_str().map(|s| s.to_string()))
            .unwrap_or_else(|| ".".to_string())
    });

    let entries = catalog::scan(Path::new(&dir), &settings.library, &CancelToken::new());

    let mut session = AudioSession::new()
        .map_err(|e| format!("could not open an audio output device: {e}"))?;
    let mut app = App::new(entries);
    app.set_current_dir(dir.clone());
    if !app.has_entries() {
        app.set_notice("no audio files found", Instant::now());
    }

    startup::apply_playback_defaults(&mut app, &mut session, &settings);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result: Result<(), Box<dyn Error>> = (|| {
        let mut wave_view = WaveformView::new();
        let mut state = event_loop::EventLoopState::new();
        event_loop::run(
            &mut terminal,
            &settings,
            &mut app,
            &mut session,
            &mut wave_view,
            &mut state,
        )
    })();

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    run_result
}

/// A TUI cannot log to its own terminal; write to a file when `VIVACE_LOG`
/// names one, otherwise stay silent.
fn init_logging() -> Result<(), Box<dyn Error>> {
    use simplelog::{Config, LevelFilter, WriteLogger};
    use std::fs::File;

    let Some(path) = env::var_os("VIVACE_LOG") else {
        return Ok(());
    };
    WriteLogger::init(LevelFilter::Debug, Config::default(), File::create(path)?)?;
    Ok(())
}
