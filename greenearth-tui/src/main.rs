//! Terminal front end for the Green Earth site: scroll through animated pages,
//! jump between routes and send the contact form.

mod app;
mod config;
mod input;
mod pages;
mod ui;

use std::{
    fs::File,
    io,
    path::Path,
    sync::Mutex,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event as CEvent},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use greenearth_core::{routes::Route, service::ContactService};
use ratatui::{Terminal, backend::CrosstermBackend};
use reqwest::Client;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::app::App;
use crate::config::Args;
use crate::input::Action;

/// Input poll timeout; one frame at roughly 60 fps.
const FRAME: Duration = Duration::from_millis(16);

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(path) = &args.log_file {
        init_logging(path)?;
    }

    // HTTP + service setup
    let client = Client::builder().user_agent("greenearth/0.1").build()?;
    let service = ContactService::new(greenearth_contact::port(client, &args.backend_url));
    info!(backend = %args.backend_url, "contact backend configured");

    let route = Route::from_path(&args.route).unwrap_or_else(|| {
        warn!(path = %args.route, "unknown route, starting at home");
        Route::Home
    });

    // Terminal init
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // App state
    let rows = ui::viewport_rows(terminal.size()?.height);
    let app = App::new(service, route, rows);

    // Run event loop
    let res = run(&mut terminal, app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res
}

fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("cannot create log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|err| anyhow::anyhow!(err))
}

async fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, mut app: App) -> Result<()> {
    let started = Instant::now();

    loop {
        app.set_viewport_rows(ui::viewport_rows(terminal.size()?.height));
        app.tick(started.elapsed());

        // Draw current UI
        terminal.draw(|frame| ui::draw(frame, &app))?;

        // Poll for input; the timeout doubles as the frame ticker
        if event::poll(FRAME)?
            && let CEvent::Key(key) = event::read()?
        {
            match input::handle_key_event(key, &mut app) {
                Action::Quit => break,
                Action::None => {}
                Action::Submit => {
                    app.is_submitting = true;
                    app.notification = None;
                    terminal.draw(|frame| ui::draw(frame, &app))?;

                    let notification = app.service.submit(&mut app.form).await;

                    app.is_submitting = false;
                    app.notification = Some(notification);
                }
            }
        }
    }

    info!("shutting down");
    Ok(())
}
