use tracing::debug;

use super::PowerSource;
use crate::error::AcquireResult;
use crate::models::RawAttributes;

/// Reads the first entry of the OS power-source list, then fills in extended
/// attributes (design capacity, cycle count, temperature, raw counters) from the
/// battery's registry entry.
#[derive(Clone, Copy, Debug, Default)]
pub struct StructuredServiceSource;

impl PowerSource for StructuredServiceSource {
    fn name(&self) -> &str {
        "IOPowerSources"
    }

    #[cfg(target_os = "macos")]
    fn fetch(&self) -> AcquireResult<RawAttributes> {
        let power_source = super::io_kit::power_source_attributes()?;
        let registry = super::io_kit::battery_registry_attributes();
        debug!(
            power_source = power_source.len(),
            registry = registry.len(),
            "read power source services"
        );
        Ok(merge(power_source, registry))
    }

    #[cfg(not(target_os = "macos"))]
    fn fetch(&self) -> AcquireResult<RawAttributes> {
        debug!("power source services requested on an unsupported platform");
        Err(crate::error::AcquireError::unavailable(
            "power source services are only available on macOS",
        ))
    }
}

/// The power-source entry wins; the registry only supplies keys it lacks.
#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
pub fn merge(mut power_source: RawAttributes, registry: RawAttributes) -> RawAttributes {
    for (key, value) in registry {
        power_source.insert_missing(key, value);
    }
    power_source
}
