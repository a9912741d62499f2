// Application entry point for the Battery Status GUI

// Command-line and environment configuration
mod config;
// Acquisition error kinds
mod error;
// Import the GUI module containing the main application state
mod gui;
// Data models for raw attributes and battery snapshots
mod models;
// Published battery state and refresh handoff
mod monitor;
// Raw attribute normalization
mod normalize;
// Power source strategies
mod source;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::Config;
use monitor::BatteryMonitor;

/// Entry point for the application.
/// Selects the power source, then either prints one reading (`--once`) or
/// launches the fixed-size eframe window.
fn main() -> eframe::Result<()> {
    // Logs go to stderr so `--once` output stays clean on stdout
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let config = Config::parse();
    let source = config.power_source();
    info!(source = %config.source, reader = source.name(), "battery source selected");

    let monitor = BatteryMonitor::new(source);

    if config.once {
        std::process::exit(print_once(monitor));
    }

    // Configure window options with a fixed size of 420x600 pixels
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([420.0, 600.0])
            .with_resizable(false),
        ..Default::default()
    };

    // Start the native eframe application with the configured options
    eframe::run_native(
        "Battery Status",
        options,
        Box::new(move |cc| Ok(Box::new(gui::AppState::new(cc, monitor)))),
    )
}

/// Runs a single blocking refresh and prints the readings. Returns the exit code.
fn print_once(mut monitor: BatteryMonitor) -> i32 {
    monitor.refresh();
    monitor.wait();

    match (monitor.snapshot(), monitor.error_message()) {
        (Some(snapshot), None) => {
            for (label, value) in snapshot.report_rows() {
                println!("{:<22}{}", label, value);
            }
            0
        }
        (_, message) => {
            eprintln!("{}", message.unwrap_or(error::USER_MESSAGE));
            1
        }
    }
}
