use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::Rect;
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::debug;

use crate::app::{App, InputMode};
use crate::audio::AudioPlayer;
use crate::config;
use crate::ui;

/// Longest time the loop blocks waiting for input.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// State tracked by the runtime event loop across iterations.
#[derive(Debug, Default)]
pub struct EventLoopState {
    /// Internal two-key prefix state used for `gg` handling.
    pub pending_gg: bool,
}

/// Main terminal event loop: handles input, UI drawing and the exchange with
/// the audio thread. Returns `Ok(())` when shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    audio_player: &AudioPlayer,
    state: &mut EventLoopState,
) -> Result<()> {
    loop {
        // Engine reports first, then any start whose settle delay ran out.
        for ev in audio_player.drain_events() {
            app.deck.handle_event(ev);
        }
        let now = Instant::now();
        app.deck.tick(now);
        audio_player.dispatch(app.deck.take_commands());
        app.follow();
        debug_assert!(app.deck.playing_count() <= 1);

        terminal.draw(|f| ui::draw(f, app, &settings.ui, &settings.playback))?;

        let timeout = app
            .deck
            .next_deadline()
            .map(|due| due.saturating_duration_since(Instant::now()))
            .map_or(POLL_INTERVAL, |left| left.min(POLL_INTERVAL));

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if handle_key_event(key, settings, app, audio_player, state)? {
                        break;
                    }
                }
                Event::Paste(text) => {
                    state.pending_gg = false;
                    app.paste(&text);
                }
                Event::Mouse(mouse) => {
                    let size = terminal.size()?;
                    handle_mouse_event(mouse, Rect::new(0, 0, size.width, size.height), app);
                }
                _ => {}
            }
            audio_player.dispatch(app.deck.take_commands());
        }
    }

    Ok(())
}

/// A left click on the progress bar seeks the selected item.
fn handle_mouse_event(mouse: MouseEvent, area: Rect, app: &mut App) {
    if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
        return;
    }
    if let Some(p) = ui::progress_fraction(area, mouse.column, mouse.row) {
        debug!(p, index = app.selected, "seek by click");
        let selected = app.selected;
        app.deck.seek_normalized(selected, p);
    }
}

fn handle_open_key(key: KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Esc => app.cancel_open_mode(),
        KeyCode::Backspace => app.pop_input_char(),
        KeyCode::Enter => {
            // Failures end up in the status box.
            let _ = app.submit_open();
        }
        KeyCode::Char(c) => {
            if !c.is_control() {
                app.push_input_char(c);
            }
        }
        _ => {}
    }
}

fn handle_key_event(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    audio_player: &AudioPlayer,
    state: &mut EventLoopState,
) -> Result<bool> {
    if app.mode == InputMode::Open {
        state.pending_gg = false;
        handle_open_key(key, app);
        return Ok(false);
    }

    let selected = app.selected;
    let now = Instant::now();

    if key.code != KeyCode::Char('g') {
        state.pending_gg = false;
    }

    match key.code {
        KeyCode::Char('q') => {
            audio_player.quit_softly(Duration::from_millis(settings.audio.quit_fade_out_ms));
            return Ok(true);
        }
        KeyCode::Char('g') => {
            if state.pending_gg {
                state.pending_gg = false;
                app.first();
            } else {
                state.pending_gg = true;
            }
        }
        KeyCode::Char('G') => app.last(),
        KeyCode::Char('j') | KeyCode::Down => app.next(),
        KeyCode::Char('k') | KeyCode::Up => app.prev(),
        KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('p') => {
            app.deck.toggle(selected, now);
        }
        KeyCode::Char('r') => app.deck.restart(selected, now),
        KeyCode::Char('s') => app.deck.stop_all(),
        KeyCode::Char(c @ '0'..='9') => {
            let tenths = c.to_digit(10).map_or(0.0, f64::from);
            app.deck.seek_normalized(selected, tenths / 10.0);
        }
        KeyCode::Char('L') | KeyCode::Right => {
            app.deck
                .seek_by(selected, settings.playback.scrub_seconds as f64);
        }
        KeyCode::Char('H') | KeyCode::Left => {
            app.deck
                .seek_by(selected, -(settings.playback.scrub_seconds as f64));
        }
        KeyCode::Char('+') | KeyCode::Char('=') => {
            app.deck
                .adjust_volume(selected, settings.playback.volume_step);
        }
        KeyCode::Char('-') => {
            app.deck
                .adjust_volume(selected, -settings.playback.volume_step);
        }
        KeyCode::Char('m') => app.deck.toggle_mute(selected),
        KeyCode::Char('R') => app.deck.retry(selected),
        KeyCode::Char('o') => app.enter_open_mode(),
        KeyCode::Char('C') => app.clear_all(),
        KeyCode::Char('f') => app.follow_active = !app.follow_active,
        KeyCode::Char('K') => app.toggle_metadata_window(),
        KeyCode::Esc => {
            app.metadata_window = false;
            app.notice = None;
        }
        _ => {}
    }

    Ok(false)
}
