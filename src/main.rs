mod app;
mod view;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use faunadex::auth::InMemoryAuth;
use faunadex::config::Config;
use faunadex::controller::{ArAvailability, SimulatedAr};
use faunadex::error::Error;
use faunadex::logging;
use faunadex::model::EducationLevel;
use faunadex::operations::Operations;
use faunadex::playback::{PlaybackManager, SimulatedEngine};
use faunadex::store::{seed, InMemoryStore};

use app::App;
use view::AppView;

const DEMO_EMAIL: &str = "penjelajah@faunadex.id";
const DEMO_PASSWORD: &str = "komodo123";
const DEMO_USERNAME: &str = "Penjelajah";

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load(None)?;

    // Keep the guard alive so buffered log lines are flushed on exit
    let _log_guard = match logging::init_logging(&config) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: Failed to initialize logging: {}", e);
            None
        }
    };

    tracing::info!("=== FaunaDex Starting ===");

    let store = Arc::new(InMemoryStore::new());
    let seeded = seed::seed_from(&*store, config.seed_path.as_deref()).await?;
    tracing::info!(count = seeded, "Animal catalogue seeded");

    let ops = Operations::new(store, Arc::new(InMemoryAuth::new()));
    create_demo_account(&ops).await?;

    let (engine, events) = SimulatedEngine::new(config.simulated_track_ms);
    let playback = Arc::new(PlaybackManager::new(engine, events, config.poll_interval()));

    let availability = if config.ar_supported {
        ArAvailability::Supported
    } else {
        ArAvailability::Unsupported
    };
    let ar_engine = Arc::new(SimulatedAr::new(availability, false));

    let mut app = App::new(ops, playback.clone(), ar_engine);
    app.login.on_email_change(DEMO_EMAIL);

    tracing::info!("Starting TUI...");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app).await;
    app.close_ar();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    playback.shutdown();

    if let Err(err) = res {
        tracing::error!(error = ?err, "Application error");
    }

    tracing::info!("FaunaDex shutting down");
    Ok(())
}

/// Register the demo explorer, then leave the session signed out
async fn create_demo_account(ops: &Operations) -> Result<()> {
    match ops
        .sign_up(DEMO_EMAIL, DEMO_PASSWORD, DEMO_USERNAME, EducationLevel::Smp)
        .await
    {
        Ok(profile) => tracing::info!(uid = %profile.uid, "Demo account created"),
        Err(Error::AccountExists(email)) => tracing::debug!(%email, "Demo account already present"),
        Err(e) => return Err(e.into()),
    }
    ops.sign_out().await;
    Ok(())
}

async fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| {
            AppView::render(f, app);
        })?;

        // Short poll keeps the narration progress moving
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if let Err(e) = app.handle_key_event(key).await {
                    tracing::warn!(error = %e, "Key handling failed");
                    app.notice = Some(e.to_string());
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
