//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`: the
//! file list on the left, the waveform panel with the moving position
//! cursor on the right, plus header, status and controls boxes.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Margin, Rect},
    style::{Color, Modifier, Style},
    widgets::{
        Block, Borders, Clear, List, ListItem, Padding, Paragraph, Wrap,
        canvas::{Canvas, Line as CanvasLine},
    },
};
use std::{collections::BTreeMap, sync::LazyLock, time::Duration};

use crate::app::{App, PlaybackState};
use crate::audio::AudioSession;
use crate::config::{ControlsSettings, UiSettings};
use crate::overlay;
use crate::waveform::{self, WaveformView};

const TRACE_COLOR: Color = Color::Rgb(30, 211, 30);
const CURSOR_COLOR: Color = Color::Rgb(255, 166, 0);
const CENTER_LINE_COLOR: Color = Color::Rgb(0, 100, 50);

static CONTROLS_MAP: LazyLock<BTreeMap<String, String>> = LazyLock::new(|| {
    let mut map: BTreeMap<String, String> = BTreeMap::new();
    map.insert("j/k".to_string(), "up/down".to_string());
    map.insert("gg/G".to_string(), "top/bottom".to_string());
    map.insert("enter".to_string(), "play selected file".to_string());
    map.insert("space/p".to_string(), "play/pause".to_string());
    map.insert("x".to_string(), "stop".to_string());
    // H/L is filled dynamically from config.
    map.insert("click".to_string(), "seek".to_string());
    map.insert("r".to_string(), "loop".to_string());
    map.insert("-/+".to_string(), "volume".to_string());
    map.insert("/".to_string(), "filter".to_string());
    map.insert("o".to_string(), "open dir".to_string());
    map.insert("K".to_string(), "metadata".to_string());
    map.insert("q".to_string(), "quit".to_string());
    map
});

/// Render the controls help text, incorporating scrub seconds.
fn controls_text(seek_seconds: u64) -> String {
    // Keep the rendered order stable and human-friendly.
    let order = [
        "j/k", "enter", "space/p", "x", "H/L", "click", "r", "-/+", "gg/G", "/", "o", "K", "q",
    ];
    order
        .iter()
        .filter_map(|k| {
            if *k == "H/L" {
                Some(format!("[H/L] scrub -/+{}s", seek_seconds))
            } else {
                CONTROLS_MAP.get(*k).map(|v| format!("[{}] {}", k, v))
            }
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Format a `Duration` as `MM:SS`.
fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Format an optional duration, rounding up partial seconds, showing total seconds.
fn format_duration_mmss_ceil(d: Option<Duration>) -> String {
    let Some(d) = d else {
        return "-".to_string();
    };

    let mut total_secs = d.as_secs();
    if d.subsec_nanos() > 0 {
        total_secs = total_secs.saturating_add(1);
    }

    let minutes = total_secs / 60;
    let seconds = total_secs % 60;
    format!("{}:{:02} ({}s)", minutes, seconds, total_secs)
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    // Keep the popup smaller and avoid covering the entire UI.
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(3);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

/// The main screen regions, derived deterministically from the frame area so
/// the mouse handler can map clicks without a draw pass.
pub struct Areas {
    pub header: Rect,
    pub status: Rect,
    pub list: Rect,
    pub wave: Rect,
    pub footer: Rect,
}

pub fn layout(area: Rect) -> Areas {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(area);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(38), Constraint::Percentage(62)])
        .split(rows[2]);

    Areas {
        header: rows[0],
        status: rows[1],
        list: cols[0],
        wave: cols[1],
        footer: rows[3],
    }
}

/// The drawable interior of the waveform panel (inside the borders).
pub fn waveform_inner(area: Rect) -> Rect {
    layout(area).wave.inner(Margin {
        horizontal: 1,
        vertical: 1,
    })
}

/// Render the entire UI into the provided `frame` using `app` state and settings.
pub fn draw(
    frame: &mut Frame,
    app: &App,
    session: &AudioSession,
    wave_view: &mut WaveformView,
    display: &[usize],
    ui_settings: &UiSettings,
    controls_settings: &ControlsSettings,
) {
    let areas = layout(frame.area());

    // Header
    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" vivace ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, areas.header);

    draw_status(frame, areas.status, app, session);
    draw_list(frame, areas.list, app, display);
    draw_waveform_panel(frame, areas.wave, app, session, wave_view);

    // Overlay metadata popup (keeps list visible under it)
    if app.metadata_window {
        draw_metadata_popup(frame, areas.list.union(areas.wave), app, session);
    }

    if app.prompt_mode {
        draw_dir_prompt(frame, areas.list.union(areas.wave), app);
    }

    let footer_text = controls_text(controls_settings.seek_seconds);
    let footer = Paragraph::new(footer_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(footer, areas.footer);
}

fn draw_status(frame: &mut Frame, area: Rect, app: &App, session: &AudioSession) {
    let mut parts: Vec<String> = Vec::new();

    let state = match app.playback {
        PlaybackState::Playing => "Playing",
        PlaybackState::Paused => "Paused",
        PlaybackState::Stopped => "Stopped",
    };
    parts.push(state.to_string());

    if let Some(entry) = app.selected_entry() {
        if session.has_buffer() {
            let time = format!(
                "{} / {}",
                format_mmss(app.current_time),
                session
                    .duration()
                    .map(format_mmss)
                    .unwrap_or_else(|| "--:--".to_string())
            );
            parts.push(format!("File: {} [{}]", entry.display, time));
        }
    }

    if let Some(buffer) = session.buffer() {
        parts.push(format!(
            "{}ch {}Hz {:.2}s",
            buffer.channels(),
            buffer.sample_rate(),
            buffer.duration().as_secs_f64()
        ));
    }

    parts.push(if app.loop_enabled {
        "Loop: ON".to_string()
    } else {
        "Loop: OFF".to_string()
    });

    parts.push(format!("Vol: {:3.0}%", app.volume * 100.0));

    let q = app.filter_query.trim();
    if app.filter_mode || !q.is_empty() {
        let mut filter_part = String::from("FILTER:");
        if !q.is_empty() {
            filter_part.push(' ');
            filter_part.push_str(q);
        }
        parts.push(filter_part);
    }

    if app.scanning {
        parts.push("Scanning...".to_string());
    }

    if let Some(notice) = &app.notice {
        parts.push(format!("! {notice}"));
    }

    if let Some(dir) = &app.current_dir {
        parts.push(format!("Dir: {}", dir));
    }

    let status_par = Paragraph::new(parts.join(" • "))
        .block(
            Block::bordered()
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .title(" status "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(status_par, area);
}

fn draw_list(frame: &mut Frame, area: Rect, app: &App, display: &[usize]) {
    let q = app.filter_query.trim();
    let query_lower = if q.is_empty() {
        None
    } else if app.uses_lower_names() {
        Some(q.to_ascii_lowercase())
    } else {
        None
    };

    // Center the selected item when possible by creating a visible window.
    // Important: only build ListItems for the visible window (avoid allocating the entire list).
    let total = display.len();
    let list_height = area.height.saturating_sub(2) as usize;
    let sel_pos = display.iter().position(|&i| i == app.selected).unwrap_or(0);
    let (start, end, selected_pos_in_visible) = if total <= list_height || list_height == 0 {
        (0, total, sel_pos)
    } else {
        let half = list_height / 2;
        let mut start = if sel_pos > half { sel_pos - half } else { 0 };
        if start + list_height > total {
            start = total - list_height;
        }
        (start, start + list_height, sel_pos - start)
    };

    let visible_items: Vec<ListItem> = display[start..end]
        .iter()
        .map(|&i| {
            let name = &app.entries[i].display;
            if q.is_empty() {
                ListItem::new(name.as_str())
            } else {
                let positions = match query_lower.as_deref() {
                    Some(ql) => app.fuzzy_match_positions_for_entry_lower(i, ql),
                    None => App::fuzzy_match_positions(name, q),
                };

                if let Some(positions) = positions {
                    let mut rendered = String::new();
                    let mut pos_iter = positions.into_iter();
                    let mut next_pos = pos_iter.next();

                    for (ci, ch) in name.chars().enumerate() {
                        if next_pos == Some(ci) {
                            for up in ch.to_uppercase() {
                                rendered.push(up);
                            }
                            next_pos = pos_iter.next();
                        } else {
                            rendered.push(ch);
                        }
                    }
                    ListItem::new(rendered)
                } else {
                    ListItem::new(name.as_str())
                }
            }
        })
        .collect();

    let title = if app.scanning { " files (scanning...) " } else { " files " };
    let list = List::new(visible_items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ratatui::widgets::ListState::default();
    if total > 0 {
        state.select(Some(selected_pos_in_visible));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_waveform_panel(
    frame: &mut Frame,
    area: Rect,
    app: &App,
    session: &AudioSession,
    wave_view: &mut WaveformView,
) {
    let block = Block::default().borders(Borders::ALL).title(" waveform ");
    frame.render_widget(block, area);

    let inner = area.inner(Margin {
        horizontal: 1,
        vertical: 1,
    });
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let Some(buffer) = session.buffer() else {
        wave_view.ensure(None, inner.width);
        let placeholder = Paragraph::new("no file loaded")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        frame.render_widget(placeholder, inner);
        return;
    };

    let trace = wave_view.ensure(Some(buffer), inner.width);

    let width = inner.width as f64;
    let height = inner.height as f64;
    let playing = app.playback == PlaybackState::Playing;
    let cursor = playing.then(|| {
        overlay::cursor_x(app.current_time, buffer.duration(), inner.width) as f64
    });

    let canvas = Canvas::default()
        .x_bounds([0.0, width])
        .y_bounds([0.0, height])
        .paint(|ctx| {
            // Center reference line.
            ctx.draw(&CanvasLine {
                x1: 0.0,
                y1: height / 2.0,
                x2: width,
                y2: height / 2.0,
                color: CENTER_LINE_COLOR,
            });

            // Static trace: vertical segments from the center to the sample.
            for point in trace {
                let y = waveform::amplitude_to_y(point.amplitude, inner.height as f32) as f64;
                ctx.draw(&CanvasLine {
                    x1: point.x as f64,
                    y1: height / 2.0,
                    x2: point.x as f64,
                    y2: y,
                    color: TRACE_COLOR,
                });
            }

            // Moving position cursor, only while playing.
            if let Some(x) = cursor {
                ctx.draw(&CanvasLine {
                    x1: x,
                    y1: 0.0,
                    x2: x,
                    y2: height,
                    color: CURSOR_COLOR,
                });
            }
        });
    frame.render_widget(canvas, inner);

    // Elapsed-seconds label next to the cursor, flipped away from the edge.
    if playing {
        let text = overlay::label_text(app.current_time);
        let len = text.len() as u16;
        let cursor_col = overlay::cursor_x(app.current_time, buffer.duration(), inner.width) as u16;
        let col = overlay::label_col(cursor_col.min(inner.width.saturating_sub(1)), len, inner.width);
        let label_area = Rect {
            x: inner.x + col.min(inner.width.saturating_sub(len)),
            y: inner.y,
            width: len.min(inner.width),
            height: 1,
        };
        let label = Paragraph::new(text).style(Style::default().fg(CURSOR_COLOR));
        frame.render_widget(label, label_area);
    }
}

fn draw_metadata_popup(frame: &mut Frame, area: Rect, app: &App, session: &AudioSession) {
    let popup_area = centered_rect_sized(72, 9, area);
    frame.render_widget(Clear, popup_area);

    let meta = if let Some(entry) = app.selected_entry() {
        let dur = format_duration_mmss_ceil(entry.duration);
        let decoded = session
            .buffer()
            .map(|b| format!("{}ch @ {} Hz", b.channels(), b.sample_rate()))
            .unwrap_or_else(|| "-".to_string());
        format!(
            "Title: {}\nArtist: {}\nAlbum: {}\nDuration: {}\nDecoded: {}\nPath: {}",
            entry.title,
            entry.artist.as_deref().unwrap_or("-"),
            entry.album.as_deref().unwrap_or("-"),
            dur,
            decoded,
            entry.path.display()
        )
    } else {
        "No file selected".to_string()
    };
    let meta_paragraph = Paragraph::new(meta)
        .block(
            Block::default()
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .borders(Borders::ALL)
                .title(" metadata (K closes) "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(meta_paragraph, popup_area);
}

fn draw_dir_prompt(frame: &mut Frame, area: Rect, app: &App) {
    let popup_area = centered_rect_sized(60, 3, area);
    frame.render_widget(Clear, popup_area);

    let prompt = Paragraph::new(format!("{}█", app.prompt_input)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" open directory (enter opens, esc cancels) ")
            .padding(Padding {
                left: 1,
                right: 0,
                top: 0,
                bottom: 0,
            }),
    );
    frame.render_widget(prompt, popup_area);
}
