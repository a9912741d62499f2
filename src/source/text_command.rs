use std::process::Command;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::PowerSource;
use crate::error::{AcquireError, AcquireResult};
use crate::models::{AttrValue, RawAttributes, keys};

/// Matches a top-level `"Key" = value` line, allowing ioreg's tree prefix.
static LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^[\s|]*"([^"]+)"\s*=\s*(.*?)\s*$"#).unwrap());

/// Runs an external diagnostic command and parses its registry dump.
#[derive(Clone, Debug)]
pub struct TextCommandSource {
    program: String,
    args: Vec<String>,
}

impl TextCommandSource {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// `ioreg -rn AppleSmartBattery`
    pub fn ioreg() -> Self {
        Self::new("ioreg", vec!["-rn".into(), keys::BATTERY_SERVICE.into()])
    }
}

impl PowerSource for TextCommandSource {
    fn name(&self) -> &str {
        &self.program
    }

    fn fetch(&self) -> AcquireResult<RawAttributes> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .output()
            .map_err(|e| {
                AcquireError::unavailable(format!("failed to run {}: {}", self.program, e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AcquireError::unavailable(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let raw = parse_registry_dump(&stdout);
        if raw.is_empty() {
            debug!(program = %self.program, "no battery keys in command output");
        }
        debug!(program = %self.program, attributes = raw.len(), "parsed registry dump");
        Ok(raw)
    }
}

/// Extracts the known battery keys from line-oriented `"Key" = value` text.
/// Unknown keys and nested dictionaries are skipped; the first occurrence of a key wins.
pub fn parse_registry_dump(text: &str) -> RawAttributes {
    let mut raw = RawAttributes::new();

    for line in text.lines() {
        let Some(cap) = LINE_RE.captures(line) else {
            continue;
        };
        let key = &cap[1];
        if !keys::is_known(key) {
            continue;
        }
        raw.insert_missing(key, parse_value(&cap[2]));
    }

    raw
}

fn parse_value(value: &str) -> AttrValue {
    if let Some(inner) = value
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    {
        return AttrValue::Str(inner.to_string());
    }

    match value {
        "Yes" => AttrValue::Bool(true),
        "No" => AttrValue::Bool(false),
        _ => match value.parse::<i64>() {
            Ok(v) => AttrValue::Int(v),
            Err(_) => AttrValue::Str(value.to_string()),
        },
    }
}
