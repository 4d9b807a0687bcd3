use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::io::stdout;
use std::panic;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use vaultboard::app::DashboardApp;
use vaultboard::channel::UpdateChannel;
use vaultboard::error::{Result, VaultboardError};
use vaultboard::event::{Event, EventHandler};
use vaultboard::locale::LocaleTable;
use vaultboard::ui;

#[derive(Parser, Debug)]
#[command(name = "vaultboard")]
#[command(author, version, about = "Terminal progress dashboard for Vault provisioning runs")]
struct Args {
    /// Provisioning backend address to stream updates from
    #[arg(long, default_value = "127.0.0.1:4000")]
    endpoint: String,

    /// Path to a TOML file overriding the built-in step text
    #[arg(long)]
    locale_file: Option<String>,

    /// Replay a scripted provisioning run instead of connecting
    #[arg(long)]
    demo: bool,

    /// Log file path (logging disabled if not specified)
    #[arg(long)]
    log_file: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging only if log file is specified; stdout belongs to the TUI
    if let Some(ref log_path) = args.log_file {
        match open_log_file(log_path) {
            Ok(file) => {
                let filter =
                    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

                tracing_subscriber::fmt()
                    .with_env_filter(filter)
                    .with_writer(file)
                    .with_ansi(false)
                    .init();

                info!("Starting vaultboard");
            }
            Err(e) => {
                // The TUI has not taken the terminal yet, so this stays visible
                eprintln!("vaultboard: cannot open log file {}: {}", log_path, e);
            }
        }
    }

    let locale = match args.locale_file {
        Some(ref path) => LocaleTable::load_from(path)?,
        None => LocaleTable::english(),
    };

    // Open the channel before touching the terminal so a refused connection
    // fails with a readable error
    let channel = if args.demo {
        UpdateChannel::demo()
    } else {
        match UpdateChannel::connect(&args.endpoint).await {
            Ok(c) => c,
            Err(e) => {
                error!(
                    "Failed to connect to {}: {}. Use --demo to run without a backend.",
                    args.endpoint, e
                );
                return Err(e);
            }
        }
    };

    // Set up panic handler to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        original_hook(panic_info);
    }));

    let mut terminal = setup_terminal()?;
    let mut app = DashboardApp::new(locale);

    let result = run(&mut terminal, &mut app, channel).await;

    restore_terminal()?;

    if let Err(ref e) = result {
        error!("Application error: {}", e);
    }

    result
}

fn open_log_file(path: &str) -> std::io::Result<std::fs::File> {
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<std::io::Stdout>>> {
    enable_raw_mode().map_err(|e| VaultboardError::Terminal(e.to_string()))?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen).map_err(|e| VaultboardError::Terminal(e.to_string()))?;
    let backend = CrosstermBackend::new(stdout);
    let terminal =
        Terminal::new(backend).map_err(|e| VaultboardError::Terminal(e.to_string()))?;
    Ok(terminal)
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode().map_err(|e| VaultboardError::Terminal(e.to_string()))?;
    execute!(stdout(), LeaveAlternateScreen)
        .map_err(|e| VaultboardError::Terminal(e.to_string()))?;
    Ok(())
}

async fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut DashboardApp,
    mut channel: UpdateChannel,
) -> Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut events = EventHandler::new(tick_rate);
    let mut channel_open = true;

    loop {
        terminal
            .draw(|frame| ui::draw(frame, app))
            .map_err(|e| VaultboardError::Terminal(e.to_string()))?;

        tokio::select! {
            event = events.next() => match event {
                Some(Event::Key(key)) => app.handle_key(key),
                Some(Event::Tick) => app.tick(),
                Some(Event::Resize) => {
                    // Terminal redraws on the next loop iteration
                }
                None => break,
            },
            channel_event = channel.next(), if channel_open => match channel_event {
                Some(event) => app.handle_channel_event(event),
                None => {
                    // Drained after Closed/TransportError; keep showing the
                    // last good snapshot
                    channel_open = false;
                }
            },
        }

        if app.should_exit {
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_file_is_created_next_to_existing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vaultboard.log");
        assert!(open_log_file(path.to_str().unwrap()).is_ok());
        assert!(path.exists());
    }

    #[test]
    fn unopenable_log_file_surfaces_an_error() {
        // A missing parent directory must come back as an error the caller
        // can report, not be swallowed.
        let result = open_log_file("/nonexistent-dir/vaultboard.log");
        assert!(result.is_err());
    }
}
