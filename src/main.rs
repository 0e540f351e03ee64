use anyhow::Result;
use clap::Parser;
use cosmix::app::App;
use cosmix::cli::Cli;
use cosmix::config::Config;
use cosmix::styles::{init_theme, ThemeType};

/// Set up panic hook to restore terminal state on panic
fn setup_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        // Restore terminal state before handling panic
        // This ensures the terminal is usable after a panic
        let _ = crossterm::terminal::disable_raw_mode();
        let _ = crossterm::execute!(
            std::io::stdout(),
            crossterm::terminal::LeaveAlternateScreen,
            crossterm::event::DisableMouseCapture
        );
        // Call the original panic hook to show the panic message
        original_hook(panic_info);
    }));
}

fn main() -> Result<()> {
    // Set up panic hook to restore terminal on panic
    setup_panic_hook();

    let cli = Cli::parse();

    // Theme: explicit flag and NO_COLOR win over the configured theme.
    if cli.no_colors || std::env::var("NO_COLOR").is_ok_and(|v| !v.is_empty()) {
        init_theme(ThemeType::NoColor);
    } else if let Ok(theme) = std::env::var("COSMIX_THEME") {
        init_theme(theme.parse().unwrap_or_default());
    }

    // Set up logging directory
    let log_dir = Config::log_dir();
    std::fs::create_dir_all(&log_dir)?;
    let log_file = log_dir.join("cosmix.log");

    // Initialize tracing with file logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // Write to file
    let file_appender = tracing_appender::rolling::never(&log_dir, "cosmix.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(non_blocking)
        .with_ansi(false) // Disable ANSI colors in file
        .init();

    // Missing production domain outside development fails here, before
    // any screen or command runs.
    let config = Config::from_env()?;

    let result = if let Some(command) = cli.command {
        command.execute(&config)
    } else {
        // Print log location before TUI starts (this will be visible briefly)
        eprintln!("Logs are being written to: {:?}", log_file);
        eprintln!("View logs in real-time: tail -f {:?}", log_file);

        let mut app = App::new(config)?;
        app.run()
    };

    // Flush file logging on exit
    // (panic hook handles terminal restore on panics)
    drop(guard);

    result
}
