//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, Padding, Paragraph, Wrap},
};
use std::{collections::BTreeMap, rc::Rc, sync::LazyLock};

use crate::app::{App, InputMode, Notice};
use crate::config::{PlaybackSettings, UiSettings};
use crate::library::leading_number;
use crate::playback::{ItemPlayer, Phase, PlaybackState, VolumeIcon, format_time};

static CONTROLS_MAP: LazyLock<BTreeMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut map = BTreeMap::new();
    map.insert("j/k", "up/down");
    map.insert("gg/G", "top/bottom");
    map.insert("enter/space", "play/pause");
    map.insert("r", "restart");
    map.insert("0-9", "seek to n/10");
    // H/L is filled dynamically from config.
    map.insert("+/-", "volume");
    map.insert("m", "mute");
    map.insert("R", "retry");
    map.insert("s", "stop all");
    map.insert("o", "open files/folder");
    map.insert("C", "clear all");
    map.insert("f", "follow");
    map.insert("K", "details");
    map.insert("q", "quit");
    map
});

/// Render the controls help text, incorporating scrub seconds.
fn controls_text(scrub_seconds: u64) -> String {
    // Keep the rendered order stable and human-friendly.
    let order = [
        "j/k",
        "enter/space",
        "r",
        "s",
        "H/L",
        "0-9",
        "+/-",
        "m",
        "R",
        "o",
        "C",
        "gg/G",
        "f",
        "K",
        "q",
    ];
    order
        .iter()
        .filter_map(|k| {
            if *k == "H/L" {
                Some(format!("[H/L] scrub -/+{}s", scrub_seconds))
            } else {
                CONTROLS_MAP.get(*k).map(|v| format!("[{}] {}", k, v))
            }
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

fn time_text(state: &PlaybackState) -> String {
    format!(
        "{} / {}",
        format_time(state.current_time_seconds),
        format_time(state.duration_seconds)
    )
}

fn volume_text(item: &ItemPlayer) -> String {
    let state = item.state();
    let icon = VolumeIcon::for_volume(state.volume).glyph();
    if item.is_muted() {
        return format!("{icon} mute");
    }
    format!("{} {:>3}%", icon, (state.volume * 100.0).round() as u32)
}

fn phase_marker(phase: &Phase) -> &'static str {
    match phase {
        Phase::Playing => "▶",
        Phase::Paused => "⏸",
        Phase::Loading => "…",
        Phase::Error(_) => "!",
        Phase::Idle | Phase::Ready => " ",
    }
}

fn size_text(bytes: u64) -> String {
    const MIB: f64 = 1024.0 * 1024.0;
    if bytes as f64 >= MIB {
        format!("{:.1} MiB", bytes as f64 / MIB)
    } else {
        format!("{:.1} KiB", bytes as f64 / 1024.0)
    }
}

/// Split the frame into header, status, list, progress and footer areas.
fn layout(area: Rect) -> Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(1),
            Constraint::Length(3),
            Constraint::Length(4),
        ])
        .split(area)
}

/// Inner area of the progress bar for a frame of size `area`.
pub fn progress_area(area: Rect) -> Rect {
    Block::bordered().inner(layout(area)[3])
}

/// Map a click at (`column`, `row`) to a fraction of the progress bar.
pub fn progress_fraction(area: Rect, column: u16, row: u16) -> Option<f64> {
    let bar = progress_area(area);
    if bar.width == 0
        || column < bar.x
        || column >= bar.x + bar.width
        || row < bar.y
        || row >= bar.y + bar.height
    {
        return None;
    }
    let offset = f64::from(column - bar.x);
    let span = f64::from(bar.width.saturating_sub(1).max(1));
    Some((offset / span).clamp(0.0, 1.0))
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    // Keep the popup smaller and avoid covering the entire UI.
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

fn status_text(app: &App) -> String {
    let mut parts: Vec<String> = Vec::new();

    match app.deck.active().and_then(|i| app.deck.item(i).map(|it| (i, it))) {
        Some((i, item)) => {
            let name = &app.deck.playlist()[i].name;
            parts.push(format!(
                "ACTIVE: {} [{}] {}",
                name,
                time_text(item.state()),
                item.phase().label()
            ));
        }
        None => parts.push("ACTIVE: none".to_string()),
    }

    parts.push(format!("{} item(s)", app.deck.len()));

    if app.follow_active {
        parts.push("CURSOR: Follow".to_string());
    } else {
        parts.push("CURSOR: Free-roam".to_string());
    }

    if let Some(src) = &app.source_label {
        parts.push(format!("From: {}", src));
    }

    parts.join(" • ")
}

fn list_item(app: &App, item: &ItemPlayer) -> ListItem<'static> {
    let name = &app.deck.playlist()[item.index()].name;
    let state = item.state();
    let line = format!(
        "{} {:<40} {:>13}  {}",
        phase_marker(item.phase()),
        name,
        time_text(state),
        volume_text(item)
    );
    let style = if state.has_error {
        Style::default().fg(Color::Red)
    } else if state.is_loading {
        Style::default().add_modifier(Modifier::DIM)
    } else if state.is_playing {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    ListItem::new(line).style(style)
}

/// Render the entire UI into the provided `frame` using `app` state and settings.
pub fn draw(
    frame: &mut Frame,
    app: &App,
    ui_settings: &UiSettings,
    playback_settings: &PlaybackSettings,
) {
    let chunks = layout(frame.area());

    // Header
    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" cueloop ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    // Status box, notice on its own line
    let mut status = status_text(app);
    let mut status_style = Style::default();
    match &app.notice {
        Some(Notice::Info(msg)) => {
            status.push('\n');
            status.push_str(msg);
        }
        Some(Notice::Warning(msg)) => {
            status.push_str("\nWARNING: ");
            status.push_str(msg);
            status_style = status_style.fg(Color::Yellow);
        }
        None => {}
    }
    let status_par = Paragraph::new(status)
        .style(status_style)
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
    frame.render_widget(status_par, chunks[1]);

    // Main list
    {
        // Only build ListItems for the visible window, centered on the selection.
        let total = app.deck.len();
        let list_height = chunks[2].height.saturating_sub(2) as usize;
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

        let visible_items: Vec<ListItem> = app.deck.items()[start..end]
            .iter()
            .map(|item| list_item(app, item))
            .collect();

        let title = if !app.has_items() {
            " cues (press o to open files, or drop them here) "
        } else {
            " cues "
        };
        let list = List::new(visible_items)
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ratatui::widgets::ListState::default();
        if total > 0 {
            state.select(Some(selected_pos_in_visible));
        }
        frame.render_stateful_widget(list, chunks[2], &mut state);
    }

    // Progress of the selected item
    match app.selected_item() {
        Some(item) if item.has_error() => {
            let msg = match item.phase() {
                Phase::Error(e) => format!("{e} (press R to retry)"),
                _ => String::new(),
            };
            let p = Paragraph::new(msg)
                .style(Style::default().fg(Color::Red))
                .block(Block::bordered().title(" progress "));
            frame.render_widget(p, chunks[3]);
        }
        Some(item) => {
            let state = item.state();
            let gauge = Gauge::default()
                .block(Block::bordered().title(" progress (click to seek) "))
                .gauge_style(Style::default().add_modifier(Modifier::BOLD))
                .ratio(state.progress())
                .label(format!("{}  {}", time_text(state), volume_text(item)));
            frame.render_widget(gauge, chunks[3]);
        }
        None => {
            frame.render_widget(Block::bordered().title(" progress "), chunks[3]);
        }
    }

    // Overlay details popup (keeps list visible under it)
    if app.metadata_window {
        let popup_area = centered_rect_sized(72, 10, chunks[2]);
        frame.render_widget(Clear, popup_area);

        let meta = match (app.selected_item(), app.deck.playlist().get(app.selected)) {
            (Some(item), Some(media)) => format!(
                "Name: {}\nCue: {}\nSize: {}\nType: {}\nDuration: {}\nState: {}\nPath: {}",
                media.name,
                leading_number(&media.name).map_or("-".to_string(), |n| n.to_string()),
                size_text(media.size_bytes),
                media.declared_type.as_deref().unwrap_or("-"),
                format_time(item.state().duration_seconds),
                item.phase().label(),
                media.path.display()
            ),
            _ => "No item selected".to_string(),
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
                    .title(" details (K closes) "),
            )
            .wrap(Wrap { trim: true });
        frame.render_widget(meta_paragraph, popup_area);
    }

    let (footer_title, footer_text) = match app.mode {
        InputMode::Open => (
            " open (enter loads, esc cancels) ",
            format!("path(s): {}_", app.path_input),
        ),
        InputMode::Normal => (" controls ", controls_text(playback_settings.scrub_seconds)),
    };
    let footer = Paragraph::new(footer_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(footer_title)
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(footer, chunks[4]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_fraction_maps_columns_across_the_bar() {
        let area = Rect::new(0, 0, 102, 40);
        let bar = progress_area(area);
        assert_eq!(bar.width, 100);

        assert_eq!(progress_fraction(area, bar.x, bar.y), Some(0.0));
        assert_eq!(progress_fraction(area, bar.x + bar.width - 1, bar.y), Some(1.0));
        let mid = progress_fraction(area, bar.x + 33, bar.y).unwrap();
        assert!((mid - 33.0 / 99.0).abs() < 1e-9);
    }

    #[test]
    fn progress_fraction_ignores_clicks_outside_the_bar() {
        let area = Rect::new(0, 0, 80, 30);
        let bar = progress_area(area);
        assert_eq!(progress_fraction(area, bar.x, bar.y - 1), None);
        assert_eq!(progress_fraction(area, 0, bar.y), None);
        assert_eq!(progress_fraction(area, bar.x + bar.width, bar.y), None);
    }

    #[test]
    fn controls_text_includes_scrub_seconds() {
        let text = controls_text(7);
        assert!(text.contains("[H/L] scrub -/+7s"));
        assert!(text.starts_with("[j/k] up/down"));
    }
}
