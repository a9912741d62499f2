// Property names read from the power-source and battery registry services

pub const CURRENT_CAPACITY: &str = "CurrentCapacity";
pub const MAX_CAPACITY: &str = "MaxCapacity";
pub const DESIGN_CAPACITY: &str = "DesignCapacity";
pub const IS_CHARGING: &str = "IsCharging";
pub const CYCLE_COUNT: &str = "CycleCount";
pub const TEMPERATURE: &str = "Temperature";
pub const AVG_TIME_TO_FULL: &str = "AvgTimeToFull";
pub const AVG_TIME_TO_EMPTY: &str = "AvgTimeToEmpty";
pub const EXTERNAL_CONNECTED: &str = "ExternalConnected";
pub const TIME_REMAINING: &str = "TimeRemaining";
pub const INSTANT_TIME_TO_EMPTY: &str = "InstantTimeToEmpty";
pub const INSTANT_TIME_TO_FULL: &str = "InstantTimeToFull";
pub const RAW_MAX_CAPACITY: &str = "AppleRawMaxCapacity";
pub const RAW_CURRENT_CAPACITY: &str = "AppleRawCurrentCapacity";

/// Keys published by the power-source list (note the spaces).
pub const POWER_SOURCE_STATE: &str = "Power Source State";
pub const PS_IS_CHARGING: &str = "Is Charging";
pub const TIME_TO_FULL_CHARGE: &str = "Time to Full Charge";
pub const TIME_TO_EMPTY: &str = "Time to Empty";

/// Values of [`POWER_SOURCE_STATE`].
pub const AC_POWER: &str = "AC Power";
pub const BATTERY_POWER: &str = "Battery Power";

/// The IOKit service holding the extended battery attributes.
pub const BATTERY_SERVICE: &str = "AppleSmartBattery";

/// Every key either source is allowed to contribute.
pub const ALL: &[&str] = &[
    CURRENT_CAPACITY,
    MAX_CAPACITY,
    DESIGN_CAPACITY,
    IS_CHARGING,
    CYCLE_COUNT,
    TEMPERATURE,
    AVG_TIME_TO_FULL,
    AVG_TIME_TO_EMPTY,
    EXTERNAL_CONNECTED,
    POWER_SOURCE_STATE,
    PS_IS_CHARGING,
    TIME_TO_FULL_CHARGE,
    TIME_TO_EMPTY,
    TIME_REMAINING,
    INSTANT_TIME_TO_EMPTY,
    INSTANT_TIME_TO_FULL,
    RAW_MAX_CAPACITY,
    RAW_CURRENT_CAPACITY,
];

pub fn is_known(key: &str) -> bool {
    ALL.contains(&key)
}
