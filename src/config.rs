use std::sync::Arc;

use clap::Parser;

use crate::source::{PowerSource, SourceKind, StructuredServiceSource, TextCommandSource};

/// Startup configuration, read from the command line and environment.
#[derive(Debug, Parser)]
#[command(
    name = "battery_status",
    version,
    about = "Shows macOS battery capacity, health and charging state"
)]
pub struct Config {
    /// Where battery attributes are read from
    #[arg(long, value_enum, default_value_t = SourceKind::Text, env = "BATTERY_STATUS_SOURCE")]
    pub source: SourceKind,

    /// Program printing the battery registry entry, for the text source [default: ioreg]
    #[arg(long, env = "BATTERY_STATUS_COMMAND")]
    pub command: Option<String>,

    /// Argument passed to --command, may be repeated [default: -rn AppleSmartBattery]
    #[arg(long = "command-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub command_args: Vec<String>,

    /// Refresh once, print the readings to stdout and exit
    #[arg(long)]
    pub once: bool,
}

impl Config {
    pub fn power_source(&self) -> Arc<dyn PowerSource> {
        match self.source {
            SourceKind::Structured => Arc::new(StructuredServiceSource),
            SourceKind::Text => match (&self.command, self.command_args.is_empty()) {
                (None, true) => Arc::new(TextCommandSource::ioreg()),
                (program, _) => Arc::new(TextCommandSource::new(
                    program.as_deref().unwrap_or("ioreg"),
                    self.command_args.clone(),
                )),
            },
        }
    }
}
