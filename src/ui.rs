//! UI rendering helpers for the terminal user interface.
//!
//! This module renders the `App` model (and the engine snapshot it holds)
//! using `ratatui`. It only reads state.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, Padding, Paragraph, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock};

use crate::app::App;
use crate::config::{ControlsSettings, TimeField, UiSettings};
use crate::engine::{PlaybackState, TransportState};
use crate::queue::RepeatMode;
use crate::track::Track;

static CONTROLS_MAP: LazyLock<BTreeMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut map = BTreeMap::new();
    map.insert("j/k", "up/down");
    map.insert("gg/G", "top/bottom");
    map.insert("enter", "play selected");
    map.insert("space/p", "play/pause");
    map.insert("x", "stop");
    map.insert("h/l", "prev/next");
    // H/L is filled dynamically from config.
    map.insert("+/-", "volume");
    map.insert("s", "shuffle");
    map.insert("r", "repeat");
    map.insert("d", "remove");
    map.insert("C", "clear queue");
    map.insert("K", "metadata");
    map.insert("q", "quit");
    map
});

/// Render the controls help text, incorporating scrub seconds.
fn controls_text(scrub_seconds: u64) -> String {
    // Keep the rendered order stable and human-friendly.
    let order = [
        "j/k", "h/l", "H/L", "enter", "space/p", "x", "+/-", "s", "r", "d", "C", "gg/G", "K",
        "q",
    ];
    order
        .iter()
        .filter_map(|k| {
            if *k == "H/L" {
                Some(format!("[H/L] seek -/+{}s", scrub_seconds))
            } else {
                CONTROLS_MAP.get(*k).map(|v| format!("[{}] {}", k, v))
            }
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Format seconds as `MM:SS`.
pub(crate) fn format_mmss(secs: f64) -> String {
    let secs = if secs.is_finite() { secs.max(0.0) as u64 } else { 0 };
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Build the now-playing time text (elapsed/total/remaining) per `UiSettings`.
pub(crate) fn now_playing_time_text(state: &PlaybackState, ui: &UiSettings) -> Option<String> {
    let total = (state.duration_sec > 0.0).then_some(state.duration_sec);

    let parts: Vec<String> = ui
        .now_playing_time_fields
        .iter()
        .filter_map(|f| match f {
            TimeField::Elapsed => Some(format_mmss(state.current_time_sec)),
            TimeField::Total => total.map(format_mmss),
            TimeField::Remaining => {
                total.map(|t| format!("-{}", format_mmss(t - state.current_time_sec)))
            }
        })
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(&ui.now_playing_time_separator))
    }
}

/// Body of the metadata popup for `track`.
fn metadata_text(track: &Track) -> String {
    format!(
        "Title: {}\nArtist: {}\nDuration: {}\nArtwork: {}\nURL: {}",
        track.title,
        if track.artist_name.is_empty() { "-" } else { track.artist_name.as_str() },
        track.duration_sec.map(format_mmss).unwrap_or_else(|| "-".to_string()),
        track.artwork_url.as_deref().unwrap_or("-"),
        track.file_url.as_deref().unwrap_or("-"),
    )
}

fn repeat_text(mode: RepeatMode) -> &'static str {
    match mode {
        RepeatMode::None => "REPEAT: Off",
        RepeatMode::All => "REPEAT: All",
        RepeatMode::One => "REPEAT: One",
    }
}

fn transport_text(transport: TransportState) -> &'static str {
    match transport {
        TransportState::Idle => "Stopped",
        TransportState::Loading => "Loading",
        TransportState::Playing => "Playing",
        TransportState::Paused => "Paused",
        TransportState::Ended => "Ended",
    }
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(5);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

fn left_padded(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .padding(Padding {
            left: 1,
            right: 0,
            top: 0,
            bottom: 0,
        })
}

/// Render the entire UI into the provided `frame` using `app` state and settings.
pub fn draw(
    frame: &mut Frame,
    app: &App,
    ui_settings: &UiSettings,
    controls_settings: &ControlsSettings,
) {
    let state = &app.state;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(4),
        ])
        .split(frame.area());

    // Header
    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" cadenza ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    // Status box
    let status = {
        let mut parts: Vec<String> = Vec::new();

        match &state.current_track {
            Some(track) => match now_playing_time_text(state, ui_settings) {
                Some(time) => parts.push(format!("Song: {} [{}]", track.display(), time)),
                None => parts.push(format!("Song: {}", track.display())),
            },
            None => parts.push("Song: -".to_string()),
        }
        parts.push(transport_text(state.transport).to_string());
        parts.push(repeat_text(state.repeat_mode).to_string());
        parts.push(if state.shuffle_enabled {
            "Shuffle: ON".to_string()
        } else {
            "Shuffle: OFF".to_string()
        });
        parts.push(format!("Vol: {:.0}%", state.volume * 100.0));
        if let Some(dir) = &app.current_dir {
            parts.push(format!("Dir: {}", dir));
        }

        parts.join(" • ")
    };
    let status_par = Paragraph::new(status)
        .block(left_padded(" status "))
        .wrap(Wrap { trim: true });
    frame.render_widget(status_par, chunks[1]);

    // Progress
    let ratio = (state.progress_pct / 100.0).clamp(0.0, 1.0);
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(" progress "))
        .ratio(ratio)
        .label(format!("{:.0}%", state.progress_pct));
    frame.render_widget(gauge, chunks[2]);

    // Queue list
    {
        // Only build ListItems for the visible window, centered on the selection.
        let total = state.queue.len();
        let list_height = chunks[3].height.saturating_sub(2) as usize;
        let sel_pos = app.selected.min(total.saturating_sub(1));
        let (start, end, selected_pos_in_visible) = if total <= list_height || list_height == 0 {
            (0, total, sel_pos)
        } else {
            let half = list_height / 2;
            let mut start = sel_pos.saturating_sub(half);
            if start + list_height > total {
                start = total - list_height;
            }
            (start, start + list_height, sel_pos - start)
        };

        let visible_items: Vec<ListItem> = state.queue[start..end]
            .iter()
            .enumerate()
            .map(|(offset, track)| {
                let marker = if state.cursor == Some(start + offset) { "♪ " } else { "  " };
                ListItem::new(format!("{marker}{}", track.display()))
            })
            .collect();

        let title = format!(" queue ({}) ", total);
        let list = List::new(visible_items)
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut list_state = ratatui::widgets::ListState::default();
        if total > 0 {
            list_state.select(Some(selected_pos_in_visible));
        }
        frame.render_stateful_widget(list, chunks[3], &mut list_state);
    }

    // Overlay metadata popup (keeps list visible under it)
    if app.metadata_window {
        let popup_area = centered_rect_sized(72, 9, chunks[3]);
        frame.render_widget(Clear, popup_area);

        let meta = app
            .selected_track()
            .map(metadata_text)
            .unwrap_or_else(|| "No track selected".to_string());
        let meta_paragraph = Paragraph::new(meta)
            .block(left_padded(" metadata (K closes) "))
            .wrap(Wrap { trim: true });
        frame.render_widget(meta_paragraph, popup_area);
    }

    // Footer: a pending notice replaces the controls help until dismissed.
    let (footer_title, footer_text) = match &app.notice {
        Some(notice) => (" notice (esc dismisses) ", notice.message.clone()),
        None => (" controls ", controls_text(controls_settings.scrub_seconds)),
    };
    let footer = Paragraph::new(footer_text)
        .block(left_padded(footer_title))
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[4]);
}
