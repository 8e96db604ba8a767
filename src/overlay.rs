//! Position cursor geometry.
//!
//! Pure mapping from the playback clock to panel coordinates; the draw code
//! in `ui` paints the cursor only while the session reports playing, and the
//! end-of-buffer policy (loop wrap / stop) lives in the audio session tick.

use std::time::Duration;

/// Horizontal cursor position for `elapsed` of `duration` across `width`.
pub fn cursor_x(elapsed: Duration, duration: Duration, width: u16) -> f32 {
    if duration.is_zero() || width == 0 {
        return 0.0;
    }
    ((elapsed.as_secs_f64() / duration.as_secs_f64()) * width as f64) as f32
}

/// Elapsed seconds with two decimals, e.g. `7.41`.
pub fn label_text(elapsed: Duration) -> String {
    format!("{:.2}", elapsed.as_secs_f64())
}

/// Column where the time label starts: right of the cursor with one cell of
/// padding, flipped to the left side when it would overflow the panel edge.
pub fn label_col(cursor_col: u16, label_len: u16, width: u16) -> u16 {
    let right = cursor_col.saturating_add(1);
    if right.saturating_add(label_len) <= width {
        right
    } else {
        cursor_col.saturating_sub(label_len.saturating_add(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::PlaybackClock;
    use std::time::Instant;

    #[test]
    fn cursor_sits_at_half_width_halfway_through() {
        let x = cursor_x(Duration::from_secs(1), Duration::from_secs(2), 80);
        assert_eq!(x, 40.0);
    }

    #[test]
    fn cursor_handles_degenerate_inputs() {
        assert_eq!(cursor_x(Duration::from_secs(1), Duration::ZERO, 80), 0.0);
        assert_eq!(cursor_x(Duration::from_secs(1), Duration::from_secs(2), 0), 0.0);
    }

    #[test]
    fn label_shows_two_decimal_places() {
        assert_eq!(label_text(Duration::from_millis(1234)), "1.23");
        assert_eq!(label_text(Duration::ZERO), "0.00");
    }

    #[test]
    fn label_flips_to_the_left_near_the_edge() {
        // Plenty of room: label sits right of the cursor.
        assert_eq!(label_col(10, 5, 80), 11);
        // Would overflow: label moves to the left side.
        assert_eq!(label_col(78, 5, 80), 72);
    }

    #[test]
    fn one_simulated_second_into_a_two_second_buffer_lands_mid_panel() {
        let t0 = Instant::now();
        let mut clock = PlaybackClock::new();
        clock.start_at(t0, Duration::ZERO);

        let elapsed = clock.elapsed_at(t0 + Duration::from_secs(1));
        assert_eq!(elapsed, Duration::from_secs(1));

        let x = cursor_x(elapsed, Duration::from_secs(2), 120);
        assert_eq!(x, 60.0);
    }
}
