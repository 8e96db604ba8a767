mod app;
mod audio;
mod catalog;
mod config;
mod overlay;
mod runtime;
mod ui;
mod waveform;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
