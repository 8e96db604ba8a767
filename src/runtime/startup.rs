use crate::app::App;
use crate::audio::AudioSession;
use crate::config;

/// Apply configured playback defaults to the session and mirror them into
/// the app model for display.
pub fn apply_playback_defaults(
    app: &mut App,
    session: &mut AudioSession,
    settings: &config::Settings,
) {
    session.set_looping(settings.playback.loop_enabled);
    session.set_volume(settings.playback.volume);

    app.loop_enabled = session.is_looping();
    app.volume = session.volume();
}
