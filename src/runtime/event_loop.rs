use std::sync::mpsc::Receiver;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::config;
use crate::engine::{EngineEvent, TransportState};
use crate::media::MediaEvent;
use crate::ui;

use super::startup::Engine;

/// State tracked by the runtime event loop across iterations.
#[derive(Debug, Default)]
pub struct EventLoopState {
    /// Internal two-key prefix state used for `gg` handling.
    pub pending_gg: bool,
}

/// Main terminal event loop: feeds media events to the engine, engine events
/// to the model, draws, and dispatches keys. Returns `Ok(())` on quit.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    engine: &mut Engine,
    app: &mut App,
    media_rx: &Receiver<MediaEvent>,
    engine_rx: &Receiver<EngineEvent>,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        while let Ok(ev) = media_rx.try_recv() {
            engine.handle_media_event(ev);
        }
        while let Ok(ev) = engine_rx.try_recv() {
            app.apply(ev);
        }

        terminal.draw(|f| ui::draw(f, app, &settings.ui, &settings.controls))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, engine, app, state) {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Apply one key press. Returns `true` when the user asked to quit.
fn handle_key_event(
    key: KeyEvent,
    settings: &config::Settings,
    engine: &mut Engine,
    app: &mut App,
    state: &mut EventLoopState,
) -> bool {
    if key.code != KeyCode::Char('g') {
        state.pending_gg = false;
    }

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Esc => app.dismiss_notice(),
        KeyCode::Char('g') => {
            if state.pending_gg {
                state.pending_gg = false;
                app.follow_playback_off();
                app.select_first();
            } else {
                state.pending_gg = true;
            }
        }
        KeyCode::Char('G') => {
            app.follow_playback_off();
            app.select_last();
        }
        KeyCode::Char('j') => {
            app.follow_playback_off();
            app.next();
        }
        KeyCode::Char('k') => {
            app.follow_playback_off();
            app.prev();
        }
        KeyCode::Enter => {
            if app.has_tracks() {
                app.follow_playback_on();
                engine.play_at(app.selected);
            }
        }
        KeyCode::Char('p') | KeyCode::Char(' ') => {
            app.follow_playback_on();
            if engine.snapshot().is_playing {
                engine.pause();
            } else if let Err(e) = engine.play(None) {
                app.show_message(e.to_string());
            }
        }
        KeyCode::Char('x') => engine.stop(),
        KeyCode::Char('l') => {
            app.follow_playback_on();
            engine.next();
        }
        KeyCode::Char('h') => {
            app.follow_playback_on();
            engine.previous();
        }
        KeyCode::Char('L') => seek_by(engine, app, settings.controls.scrub_seconds as f64),
        KeyCode::Char('H') => seek_by(engine, app, -(settings.controls.scrub_seconds as f64)),
        KeyCode::Char('+') | KeyCode::Char('=') => {
            let v = engine.snapshot().volume + settings.controls.volume_step;
            engine.set_volume(v);
        }
        KeyCode::Char('-') => {
            let v = engine.snapshot().volume - settings.controls.volume_step;
            engine.set_volume(v);
        }
        KeyCode::Char('s') => engine.toggle_shuffle(),
        KeyCode::Char('r') => engine.toggle_repeat(),
        KeyCode::Char('d') => {
            if app.has_tracks() {
                engine.remove_from_queue(app.selected);
            }
        }
        KeyCode::Char('C') => engine.clear_queue(),
        KeyCode::Char('K') => app.toggle_metadata_window(),
        _ => {}
    }

    false
}

fn seek_by(engine: &mut Engine, app: &mut App, delta: f64) {
    let snapshot = engine.snapshot();
    if snapshot.transport == TransportState::Idle {
        return;
    }
    let target = snapshot.current_time_sec + delta;
    if let Err(e) = engine.seek(target) {
        app.show_message(e.to_string());
    }
}
