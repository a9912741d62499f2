// Data models for raw power-source attributes and normalized battery readings

pub mod keys;

use std::collections::HashMap;
use std::fmt;

/// A single untyped value as reported by the OS for one attribute.
#[derive(Clone, Debug, PartialEq)]
pub enum AttrValue {
    /// Numeric value (capacities, counters, minutes, centi-degrees)
    Int(i64),
    /// Boolean flag (`Yes`/`No` in registry dumps)
    Bool(bool),
    /// Anything else, e.g. `"AC Power"`
    Str(String),
}

impl AttrValue {
    /// Reads the value as an integer. Strings are parsed leniently, booleans never count.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttrValue::Int(v) => Some(*v),
            AttrValue::Str(s) => s.trim().parse().ok(),
            AttrValue::Bool(_) => None,
        }
    }

    /// Reads the value as a boolean flag.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(b) => Some(*b),
            AttrValue::Int(v) => Some(*v != 0),
            AttrValue::Str(s) => match s.trim() {
                "Yes" | "true" => Some(true),
                "No" | "false" => Some(false),
                _ => None,
            },
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

/// Attribute name to value mapping for one power source, valid for a single refresh.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawAttributes(HashMap<String, AttrValue>);

impl RawAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.0.get(key)
    }

    /// Inserts only if the key has not been seen yet. Returns whether it was stored.
    pub fn insert_missing(&mut self, key: impl Into<String>, value: AttrValue) -> bool {
        let mut stored = false;
        self.0.entry(key.into()).or_insert_with(|| {
            stored = true;
            value
        });
        stored
    }

    pub fn int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(AttrValue::as_int)
    }

    pub fn flag(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(AttrValue::as_bool)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(AttrValue::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl IntoIterator for RawAttributes {
    type Item = (String, AttrValue);
    type IntoIter = std::collections::hash_map::IntoIter<String, AttrValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<K: Into<String>> FromIterator<(K, AttrValue)> for RawAttributes {
    fn from_iter<I: IntoIterator<Item = (K, AttrValue)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Remaining time in minutes, or unknown when the OS reports nothing usable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TimeRemaining {
    Minutes(u32),
    #[default]
    Unknown,
}

impl TimeRemaining {
    /// Integer form, `-1` when unknown.
    pub fn as_raw(&self) -> i64 {
        match self {
            TimeRemaining::Minutes(m) => i64::from(*m),
            TimeRemaining::Unknown => -1,
        }
    }
}

impl fmt::Display for TimeRemaining {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeRemaining::Unknown => write!(f, "unknown"),
            TimeRemaining::Minutes(m) if *m < 60 => write!(f, "{} minutes", m),
            TimeRemaining::Minutes(m) if m % 60 == 0 => write!(f, "{} hours", m / 60),
            TimeRemaining::Minutes(m) => write!(f, "{} hours {} minutes", m / 60, m % 60),
        }
    }
}

/// User-facing charge state derived from the two independent power flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChargeState {
    /// Battery is actively charging
    Charging,
    /// Adapter connected but the battery is not taking charge
    OnExternalPower,
    /// Running on battery
    Discharging,
}

impl ChargeState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChargeState::Charging => "charging",
            ChargeState::OnExternalPower => "on external power",
            ChargeState::Discharging => "discharging",
        }
    }
}

/// One normalized set of battery readings.
/// Built fresh on every refresh and never mutated afterwards.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BatterySnapshot {
    /// Instantaneous charge in mAh
    pub current_capacity: u32,
    /// Present full-charge capacity in mAh
    pub max_capacity: u32,
    /// Factory-rated full capacity in mAh
    pub design_capacity: u32,
    /// Battery is actively charging
    pub is_charging: bool,
    /// External power is connected
    pub is_on_ac_power: bool,
    /// Number of charge cycles
    pub cycle_count: u32,
    /// Cell temperature in Celsius
    pub temperature: f64,
    /// Time until full, only meaningful while charging
    pub avg_time_to_full: TimeRemaining,
    /// Time until empty, only meaningful while discharging
    pub avg_time_to_empty: TimeRemaining,
}

impl BatterySnapshot {
    /// Charge level relative to the present full-charge capacity, e.g. `"80.00%"`.
    pub fn percentage(&self) -> String {
        if self.max_capacity == 0 {
            return "0.00%".to_string();
        }
        let percent = f64::from(self.current_capacity) / f64::from(self.max_capacity) * 100.0;
        format!("{:.2}%", percent)
    }

    /// Present full-charge capacity as a whole percentage of design capacity.
    pub fn health(&self) -> u32 {
        if self.design_capacity == 0 {
            return 0;
        }
        let health = u64::from(self.max_capacity) * 100 / u64::from(self.design_capacity);
        u32::try_from(health).unwrap_or(u32::MAX)
    }

    pub fn charge_state(&self) -> ChargeState {
        if self.is_charging {
            ChargeState::Charging
        } else if self.is_on_ac_power {
            ChargeState::OnExternalPower
        } else {
            ChargeState::Discharging
        }
    }

    pub fn charging_status_description(&self) -> &'static str {
        self.charge_state().as_str()
    }

    pub fn time_remaining_description(&self) -> String {
        if self.is_on_ac_power && !self.is_charging {
            return "on external power".to_string();
        }
        if self.is_charging {
            match self.avg_time_to_full {
                TimeRemaining::Unknown => "charging, time unknown".to_string(),
                known => known.to_string(),
            }
        } else {
            match self.avg_time_to_empty {
                TimeRemaining::Unknown => "discharging, time unknown".to_string(),
                known => known.to_string(),
            }
        }
    }

    /// Label/value pairs in display order, shared by the window and headless output.
    pub fn report_rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Current charge", format!("{} mAh", self.current_capacity)),
            ("Full charge capacity", format!("{} mAh", self.max_capacity)),
            ("Design capacity", format!("{} mAh", self.design_capacity)),
            ("Health", format!("{}%", self.health())),
            ("Charge level", self.percentage()),
            ("Power status", self.charging_status_description().to_string()),
            ("Time remaining", self.time_remaining_description()),
            ("Cycle count", self.cycle_count.to_string()),
            ("Temperature", format!("{:.1}°C", self.temperature)),
        ]
    }
}
