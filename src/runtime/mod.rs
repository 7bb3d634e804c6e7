use std::env;
use std::path::Path;
use std::sync::mpsc;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{info, warn};

use crate::app::App;
use crate::config::Settings;
use crate::library::scan;
use crate::media::MediaEvent;

mod event_loop;
mod logging;
mod settings;
mod startup;

pub use startup::Engine;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let arg = env::args().nth(1);
    if arg.as_deref() == Some("--print-config") {
        print!("{}", Settings::default().to_toml()?);
        return Ok(());
    }

    let (settings, config_warning) = settings::load_settings();
    let _log_guard = logging::init_logging(&settings.logging);
    if let Some(msg) = config_warning {
        warn!("{msg}");
    }

    let dir = arg.unwrap_or_else(|| {
        env::current_dir()
            .ok()
            .and_then(|p| p.to_str().map(|s| s.to_string()))
            .unwrap_or_else(|| ".".to_string())
    });
    info!(dir = %dir, "starting cadenza");

    let tracks = scan(Path::new(&dir), &settings.library);

    let (media_tx, media_rx) = mpsc::channel::<MediaEvent>();
    let mut engine = startup::build_engine(&settings, media_tx, tracks);
    let engine_rx = engine.subscribe();

    let mut app = App::new(engine.snapshot().clone());
    app.set_current_dir(dir);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut state = event_loop::EventLoopState::default();
    let run_result = event_loop::run(
        &mut terminal,
        &settings,
        &mut engine,
        &mut app,
        &media_rx,
        &engine_rx,
        &mut state,
    );

    engine.dispose();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run_result
}
