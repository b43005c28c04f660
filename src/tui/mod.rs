//! Interactive TUI and headless event loops.

mod app;
mod draw;
mod input;

pub use app::{App, Control, ControlFeedback, DownloadView, StatusView};

use std::io;
use std::time::{Duration, Instant};

use crossterm::event::Event;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc;

use crate::client::TrackerClient;
use crate::config::MonitorConfig;
use crate::connectivity::TcpProbe;
use crate::poll::{PollEvent, spawn_lanes};

use self::draw::draw;
use self::input::handle_input;

/// RAII guard that ensures terminal cleanup on drop.
/// Restores terminal to normal mode even if a panic occurs.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> io::Result<Self> {
        enable_raw_mode()?;
        crossterm::execute!(io::stdout(), EnterAlternateScreen)?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = crossterm::execute!(io::stdout(), LeaveAlternateScreen);
    }
}

fn build_probe(config: &MonitorConfig) -> crate::Result<TcpProbe> {
    TcpProbe::from_base_url(&config.base_url).ok_or_else(|| {
        crate::Error::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("no probe address derivable from {}", config.base_url),
        ))
    })
}

/// Run the interactive TUI against the tracker in `config`.
///
/// # Errors
/// Returns an error if terminal setup fails, the HTTP client cannot be
/// built, or the tracker address yields no probe target.
pub async fn run(config: MonitorConfig) -> crate::Result<()> {
    let client = TrackerClient::new(&config.base_url)?;
    let probe = build_probe(&config)?;

    // Initialize terminal with RAII guard for automatic cleanup
    let _terminal_guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<PollEvent>();
    let lanes = spawn_lanes(client.clone(), probe, &config.timings, event_tx.clone());
    let mut app = App::new(client, config.timings, event_tx);

    loop {
        let now = Instant::now();
        terminal.draw(|f| draw(f, &app, now))?;

        // Poll for input with 100ms timeout
        if crossterm::event::poll(Duration::from_millis(100))?
            && let Event::Key(key) = crossterm::event::read()?
        {
            handle_input(&mut app, key, Instant::now());
        }

        // Drain lane events (non-blocking)
        while let Ok(event) = event_rx.try_recv() {
            app.handle_event(event, Instant::now());
        }

        if app.reload_requested {
            app.reload_requested = false;
            lanes.refresh_status();
        }

        app.tick(Instant::now());

        if app.should_quit {
            break;
        }
    }

    lanes.shutdown();

    // Show cursor before exit (terminal cleanup handled by RAII guard)
    terminal.show_cursor()?;

    Ok(())
}

/// Run without a terminal: poll the tracker and log what the TUI would
/// have drawn, until SIGINT/SIGTERM.
///
/// # Errors
/// Returns an error if the HTTP client cannot be built or the tracker
/// address yields no probe target.
///
/// # Panics
/// Panics if SIGTERM signal handler registration fails on Unix platforms.
pub async fn run_headless(config: MonitorConfig) -> crate::Result<()> {
    let client = TrackerClient::new(&config.base_url)?;
    let probe = build_probe(&config)?;
    log::info!("Monitoring {} (headless)", config.base_url);

    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<PollEvent>();
    let lanes = spawn_lanes(client.clone(), probe, &config.timings, event_tx.clone());
    let mut app = App::new(client, config.timings, event_tx);

    // Shutdown future: resolves on SIGINT or SIGTERM (systemd sends SIGTERM)
    #[cfg(unix)]
    let shutdown = async {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to register SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => log::info!("Received SIGINT"),
            _ = sigterm.recv() => log::info!("Received SIGTERM"),
        }
    };

    #[cfg(not(unix))]
    let shutdown = async {
        tokio::signal::ctrl_c().await.ok();
        log::info!("Received SIGINT");
    };

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            () = &mut shutdown => break,
            event = event_rx.recv() => {
                let Some(event) = event else {
                    log::warn!("Event channel closed");
                    break;
                };
                log_event(&event);
                app.handle_event(event, Instant::now());
            }
        }

        // Drain any remaining buffered events
        while let Ok(event) = event_rx.try_recv() {
            log_event(&event);
            app.handle_event(event, Instant::now());
        }

        app.tick(Instant::now());
    }

    lanes.shutdown();
    log::info!("Shutdown complete");
    Ok(())
}

fn log_event(event: &PollEvent) {
    match event {
        PollEvent::StatusFetched { seq, html } => {
            let lines = crate::fragment::fragment_lines(html);
            log::info!("[status #{seq}] {}", lines.join(" | "));
        }
        PollEvent::StatusFailed { seq, error } => {
            log::warn!("[status #{seq}] offline: {error}");
        }
        PollEvent::DownloadsFetched { seq, html } => {
            match crate::fragment::extract_download_list(html) {
                Some(inner) => {
                    let entries = crate::fragment::list_entries(&inner);
                    log::info!("[downloads #{seq}] {} file(s)", entries.len());
                }
                None => log::debug!("[downloads #{seq}] no download-list section"),
            }
        }
        PollEvent::DownloadsFailed { seq, error } => {
            log::warn!("[downloads #{seq}] unavailable: {error}");
        }
        PollEvent::LinkChanged { online } => {
            log::info!("link changed: {}", if *online { "online" } else { "offline" });
        }
        PollEvent::TripResult { action, error } => match error {
            None => log::info!("trip {} acknowledged", action.label()),
            Some(e) => log::warn!("trip {} failed: {e}", action.label()),
        },
    }
}
