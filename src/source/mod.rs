//! Acquisition of raw power-source attributes from the OS.
//!
//! Two interchangeable strategies exist: parsing the text dump of the battery
//! registry entry ([`TextCommandSource`]) or reading the power-source and registry
//! property dictionaries directly ([`StructuredServiceSource`]). One is chosen at
//! startup and used for every refresh.

#[cfg(target_os = "macos")]
mod io_kit;
mod structured;
mod text_command;

use std::fmt;

use clap::ValueEnum;

use crate::error::AcquireResult;
use crate::models::RawAttributes;

pub use structured::StructuredServiceSource;
pub use text_command::TextCommandSource;

/// Anything that can produce the raw attributes of one power source.
pub trait PowerSource: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Queries the OS once. Read-only.
    fn fetch(&self) -> AcquireResult<RawAttributes>;
}

/// Which acquisition strategy to use.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    /// Parse `ioreg` style `"Key" = value` text output
    #[default]
    Text,
    /// Query the power-source list and the battery registry entry
    Structured,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Text => write!(f, "text"),
            SourceKind::Structured => write!(f, "structured"),
        }
    }
}
