//! wipdeck: terminal dashboard over in-progress agent task files.
//!
//! Usage:
//!   wipdeck [--wiki-path PATH] [--interval SECONDS] [--stale-minutes MINUTES]
//!           [--no-notifications]
//!
//! Reads `<wiki-path>/wip/*.wiki` every interval, classifies each task against
//! the tmux window set, raises one desktop notification per new issue, and
//! switches tmux windows on demand.

mod app;
mod logging;
mod terminal;
mod ui;

use clap::Parser;
use std::io::{self, IsTerminal};
use std::sync::Arc;
use std::time::Duration;
use wipdeck_core::config::{expand_home, load_settings};
use wipdeck_core::liveness::inside_tmux;
use wipdeck_core::{
    CommandTmuxAdapter, DesktopNotifier, Monitor, MonitorConfig, Notifier, NullNotifier,
    SystemLivenessProvider, TmuxAdapter, WipdeckError,
};

#[derive(Parser, Debug)]
#[command(name = "wipdeck", version, about = "Monitor in-progress agent tasks from the terminal")]
struct Cli {
    /// Wiki root; task files are read from <PATH>/wip
    #[arg(long, value_name = "PATH")]
    wiki_path: Option<String>,

    /// Seconds between refreshes [default: 30]
    #[arg(long, value_name = "SECONDS", value_parser = clap::value_parser!(u64).range(1..))]
    interval: Option<u64>,

    /// Minutes without an update before a task is stale [default: 10]
    #[arg(long, value_name = "MINUTES")]
    stale_minutes: Option<u64>,

    /// Disable desktop notifications
    #[arg(long)]
    no_notifications: bool,
}

impl Cli {
    /// Flags win over the settings file.
    fn apply(&self, mut config: MonitorConfig) -> MonitorConfig {
        if let Some(path) = &self.wiki_path {
            config.wiki_path = expand_home(path);
        }
        if let Some(secs) = self.interval {
            config.interval = Duration::from_secs(secs);
        }
        if let Some(minutes) = self.stale_minutes {
            config.stale_threshold = Duration::from_secs(minutes.saturating_mul(60));
        }
        if self.no_notifications {
            config.notifications = false;
        }
        config
    }
}

fn main() {
    let cli = Cli::parse();
    let _log_guard = logging::init();

    let config = cli.apply(MonitorConfig::from_settings(load_settings()));
    if let Err(err) = preflight(&config) {
        tracing::error!(error = %err, "Startup check failed");
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }

    tracing::info!(
        wip_dir = %config.wip_dir().display(),
        interval_secs = config.interval.as_secs(),
        stale_secs = config.stale_threshold.as_secs(),
        notifications = config.notifications,
        "wipdeck starting"
    );

    if !inside_tmux() {
        tracing::warn!("Not inside tmux; window switching disabled");
        eprintln!("Warning: not inside tmux; window switching disabled");
    }

    if let Err(err) = run(config) {
        tracing::error!(error = %err, "Dashboard failed");
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }

    tracing::info!("wipdeck exiting");
    println!("Goodbye.");
}

fn preflight(config: &MonitorConfig) -> Result<(), WipdeckError> {
    config.validate()?;
    which::which("tmux").map_err(|_| WipdeckError::ToolMissing("tmux".to_string()))?;
    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        return Err(WipdeckError::NotInteractive);
    }
    Ok(())
}

fn run(config: MonitorConfig) -> io::Result<()> {
    let tmux: Arc<dyn TmuxAdapter> = Arc::new(CommandTmuxAdapter::new(config.command_timeout));
    let liveness = SystemLivenessProvider::new(Arc::clone(&tmux), config.process_pattern.clone());
    let notifier: Box<dyn Notifier> = if config.notifications {
        Box::new(DesktopNotifier::new(config.command_timeout))
    } else {
        Box::new(NullNotifier)
    };
    let monitor = Monitor::new(config, Box::new(liveness), tmux, notifier);

    let shutdown = terminal::register_shutdown_signals()?;
    let mut guard = terminal::TerminalGuard::enter()?;
    let mut app = app::App::new(monitor);
    // Terminal is restored when `guard` drops, before main prints "Goodbye.".
    app::run(guard.terminal_mut(), &mut app, &shutdown)
}
