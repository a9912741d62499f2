//! Turns raw power-source attributes into a [`BatterySnapshot`].
//!
//! Every field is resolved through an ordered table of [`FieldRule`]s: the first
//! rule whose key is present and whose transform accepts the value wins. Sentinel
//! filtering lives in the transforms, so a rejected value simply falls through to
//! the next rule.

use tracing::debug;

use crate::error::{AcquireError, AcquireResult};
use crate::models::{AttrValue, BatterySnapshot, RawAttributes, TimeRemaining, keys};
use crate::source::PowerSource;

/// Minute values at or above this are the OS saying "not available".
pub const TIME_SENTINEL: u32 = 65534;

/// Raw counters above this replace capacities below it.
pub const RAW_CAPACITY_THRESHOLD: u32 = 1000;

/// One step of a fallback chain: where to look and how to read what is found there.
#[derive(Clone, Copy)]
pub struct FieldRule<T> {
    pub key: &'static str,
    pub transform: fn(&AttrValue) -> Option<T>,
}

impl<T> FieldRule<T> {
    pub const fn new(key: &'static str, transform: fn(&AttrValue) -> Option<T>) -> Self {
        Self { key, transform }
    }
}

pub const CURRENT_CAPACITY_RULES: &[FieldRule<u32>] =
    &[FieldRule::new(keys::CURRENT_CAPACITY, count)];
pub const MAX_CAPACITY_RULES: &[FieldRule<u32>] = &[FieldRule::new(keys::MAX_CAPACITY, count)];
pub const DESIGN_CAPACITY_RULES: &[FieldRule<u32>] =
    &[FieldRule::new(keys::DESIGN_CAPACITY, count)];
pub const CYCLE_COUNT_RULES: &[FieldRule<u32>] = &[FieldRule::new(keys::CYCLE_COUNT, count)];
pub const TEMPERATURE_RULES: &[FieldRule<f64>] =
    &[FieldRule::new(keys::TEMPERATURE, centi_degrees)];

pub const RAW_CURRENT_CAPACITY_RULES: &[FieldRule<u32>] =
    &[FieldRule::new(keys::RAW_CURRENT_CAPACITY, raw_counter)];
pub const RAW_MAX_CAPACITY_RULES: &[FieldRule<u32>] =
    &[FieldRule::new(keys::RAW_MAX_CAPACITY, raw_counter)];
/// Raw current counter once max capacity is already in raw units; any count goes.
pub const PAIRED_RAW_CURRENT_RULES: &[FieldRule<u32>] =
    &[FieldRule::new(keys::RAW_CURRENT_CAPACITY, count)];

/// Explicit charging flag consulted when the combined state says "AC Power".
pub const CHARGING_FLAG_RULES: &[FieldRule<bool>] = &[
    FieldRule::new(keys::PS_IS_CHARGING, AttrValue::as_bool),
    FieldRule::new(keys::IS_CHARGING, AttrValue::as_bool),
];

pub const TIME_TO_FULL_RULES: &[FieldRule<u32>] = &[
    FieldRule::new(keys::TIME_TO_FULL_CHARGE, minutes),
    FieldRule::new(keys::AVG_TIME_TO_FULL, minutes),
    FieldRule::new(keys::TIME_REMAINING, minutes),
    FieldRule::new(keys::INSTANT_TIME_TO_FULL, minutes),
];

pub const TIME_TO_EMPTY_RULES: &[FieldRule<u32>] = &[
    FieldRule::new(keys::TIME_TO_EMPTY, minutes),
    FieldRule::new(keys::AVG_TIME_TO_EMPTY, minutes),
    FieldRule::new(keys::TIME_REMAINING, minutes),
    FieldRule::new(keys::INSTANT_TIME_TO_EMPTY, minutes),
];

/// Evaluates `rules` top to bottom and returns the first accepted value.
pub fn resolve<T>(raw: &RawAttributes, rules: &[FieldRule<T>]) -> Option<T> {
    rules
        .iter()
        .find_map(|rule| raw.get(rule.key).and_then(rule.transform))
}

fn count(value: &AttrValue) -> Option<u32> {
    value.as_int().and_then(|v| u32::try_from(v).ok())
}

fn centi_degrees(value: &AttrValue) -> Option<f64> {
    value.as_int().map(|v| v as f64 / 100.0)
}

fn raw_counter(value: &AttrValue) -> Option<u32> {
    count(value).filter(|v| *v > RAW_CAPACITY_THRESHOLD)
}

fn minutes(value: &AttrValue) -> Option<u32> {
    count(value).filter(|v| (1..TIME_SENTINEL).contains(v))
}

/// Resolves `(is_charging, is_on_ac_power)`.
fn power_flags(raw: &RawAttributes) -> (bool, bool) {
    let (mut is_charging, is_on_ac_power) = match raw.text(keys::POWER_SOURCE_STATE) {
        Some(keys::AC_POWER) => (resolve(raw, CHARGING_FLAG_RULES).unwrap_or(false), true),
        Some(keys::BATTERY_POWER) => (false, false),
        _ => (
            raw.flag(keys::IS_CHARGING).unwrap_or(false),
            raw.flag(keys::EXTERNAL_CONNECTED).unwrap_or(false),
        ),
    };

    // Zero minutes to full means topped off on AC, whatever the flags claim.
    if raw.int(keys::TIME_TO_FULL_CHARGE) == Some(0) {
        is_charging = false;
    }

    (is_charging, is_on_ac_power)
}

fn with_raw_override(assigned: u32, raw_counter: Option<u32>) -> u32 {
    match raw_counter {
        Some(counter) if assigned < RAW_CAPACITY_THRESHOLD => counter,
        _ => assigned,
    }
}

/// Resolves `(current_capacity, max_capacity)` so both end up in the same unit.
fn capacities(raw: &RawAttributes) -> (u32, u32) {
    let current = resolve(raw, CURRENT_CAPACITY_RULES).unwrap_or(0);
    let max = resolve(raw, MAX_CAPACITY_RULES).unwrap_or(0);

    match resolve(raw, RAW_MAX_CAPACITY_RULES) {
        Some(raw_max) if max < RAW_CAPACITY_THRESHOLD => {
            // Max is now in mAh; a percent-scaled current would be meaningless next to it.
            let current = resolve(raw, PAIRED_RAW_CURRENT_RULES).unwrap_or(current);
            (current, raw_max)
        }
        _ => (
            with_raw_override(current, resolve(raw, RAW_CURRENT_CAPACITY_RULES)),
            max,
        ),
    }
}

/// Builds a snapshot from whatever the source reported. Never fails; see
/// [`check_usable`] for the validity rule.
pub fn normalize(raw: &RawAttributes) -> BatterySnapshot {
    let (is_charging, is_on_ac_power) = power_flags(raw);

    let (current_capacity, max_capacity) = capacities(raw);

    let (avg_time_to_full, avg_time_to_empty) = if is_charging {
        (resolve(raw, TIME_TO_FULL_RULES), None)
    } else if !is_on_ac_power {
        (None, resolve(raw, TIME_TO_EMPTY_RULES))
    } else {
        (None, None)
    };

    BatterySnapshot {
        current_capacity,
        max_capacity,
        design_capacity: resolve(raw, DESIGN_CAPACITY_RULES).unwrap_or(0),
        is_charging,
        is_on_ac_power,
        cycle_count: resolve(raw, CYCLE_COUNT_RULES).unwrap_or(0),
        temperature: resolve(raw, TEMPERATURE_RULES).unwrap_or(0.0),
        avg_time_to_full: avg_time_to_full.map_or(TimeRemaining::Unknown, TimeRemaining::Minutes),
        avg_time_to_empty: avg_time_to_empty
            .map_or(TimeRemaining::Unknown, TimeRemaining::Minutes),
    }
}

/// A snapshot without a design capacity means there is no battery to report on.
pub fn check_usable(snapshot: BatterySnapshot) -> AcquireResult<BatterySnapshot> {
    if snapshot.design_capacity == 0 {
        return Err(AcquireError::NoBatteryDetected);
    }
    Ok(snapshot)
}

/// One full acquisition: fetch, normalize, validate.
pub fn acquire(source: &dyn PowerSource) -> AcquireResult<BatterySnapshot> {
    let raw = source.fetch()?;
    let snapshot = check_usable(normalize(&raw))?;
    debug!(
        source = source.name(),
        charge = %snapshot.percentage(),
        health = snapshot.health(),
        state = snapshot.charging_status_description(),
        time_to_full = snapshot.avg_time_to_full.as_raw(),
        time_to_empty = snapshot.avg_time_to_empty.as_raw(),
        "normalized battery snapshot"
    );
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::TextCommandSource;

    fn attrs(pairs: &[(&str, AttrValue)]) -> RawAttributes {
        pairs.iter().cloned().collect()
    }

    fn int(v: i64) -> AttrValue {
        AttrValue::Int(v)
    }

    fn discharging_with_time(key: &str, value: i64) -> BatterySnapshot {
        normalize(&attrs(&[
            (keys::DESIGN_CAPACITY, int(5000)),
            (keys::EXTERNAL_CONNECTED, AttrValue::Bool(false)),
            (key, int(value)),
        ]))
    }

    #[test]
    fn copies_direct_fields_with_defaults() {
        let snapshot = normalize(&attrs(&[
            (keys::CURRENT_CAPACITY, int(3000)),
            (keys::MAX_CAPACITY, int(4500)),
            (keys::DESIGN_CAPACITY, int(5000)),
            (keys::CYCLE_COUNT, AttrValue::Str("nope".into())),
            (keys::TEMPERATURE, int(3012)),
        ]));

        assert_eq!(snapshot.current_capacity, 3000);
        assert_eq!(snapshot.max_capacity, 4500);
        assert_eq!(snapshot.design_capacity, 5000);
        assert_eq!(snapshot.cycle_count, 0);
        assert!((snapshot.temperature - 30.12).abs() < 1e-9);
    }

    #[test]
    fn empty_input_normalizes_to_zeroes() {
        let snapshot = normalize(&RawAttributes::new());
        assert_eq!(snapshot, BatterySnapshot::default());
        assert_eq!(snapshot.percentage(), "0.00%");
        assert_eq!(snapshot.health(), 0);
    }

    #[test]
    fn sentinel_times_are_unknown() {
        for value in [0, -1, -300, 65534, 65535, 70000] {
            let snapshot = discharging_with_time(keys::AVG_TIME_TO_EMPTY, value);
            assert_eq!(snapshot.avg_time_to_empty, TimeRemaining::Unknown, "value {value}");
            assert_eq!(snapshot.avg_time_to_empty.as_raw(), -1);
        }

        let snapshot = discharging_with_time(keys::AVG_TIME_TO_EMPTY, 65533);
        assert_eq!(snapshot.avg_time_to_empty, TimeRemaining::Minutes(65533));
    }

    fn charging(pairs: &[(&str, AttrValue)]) -> BatterySnapshot {
        let mut all = vec![
            (keys::IS_CHARGING, AttrValue::Bool(true)),
            (keys::EXTERNAL_CONNECTED, AttrValue::Bool(true)),
        ];
        all.extend_from_slice(pairs);
        let snapshot = normalize(&attrs(&all));
        assert!(snapshot.is_charging);
        snapshot
    }

    fn discharging(pairs: &[(&str, AttrValue)]) -> BatterySnapshot {
        let mut all = vec![(keys::EXTERNAL_CONNECTED, AttrValue::Bool(false))];
        all.extend_from_slice(pairs);
        normalize(&attrs(&all))
    }

    #[test]
    fn time_to_full_chain_order() {
        let snapshot = charging(&[
            (keys::TIME_TO_FULL_CHARGE, int(40)),
            (keys::AVG_TIME_TO_FULL, int(55)),
            (keys::TIME_REMAINING, int(70)),
        ]);
        assert_eq!(snapshot.avg_time_to_full, TimeRemaining::Minutes(40));

        let snapshot = charging(&[
            (keys::TIME_TO_FULL_CHARGE, int(65535)),
            (keys::AVG_TIME_TO_FULL, int(55)),
            (keys::TIME_REMAINING, int(70)),
        ]);
        assert_eq!(snapshot.avg_time_to_full, TimeRemaining::Minutes(55));

        let snapshot = charging(&[
            (keys::AVG_TIME_TO_FULL, int(55)),
            (keys::TIME_REMAINING, int(70)),
            (keys::INSTANT_TIME_TO_FULL, int(80)),
        ]);
        assert_eq!(snapshot.avg_time_to_full, TimeRemaining::Minutes(55));

        let snapshot = charging(&[
            (keys::AVG_TIME_TO_FULL, int(65535)),
            (keys::TIME_REMAINING, int(70)),
            (keys::INSTANT_TIME_TO_FULL, int(80)),
        ]);
        assert_eq!(snapshot.avg_time_to_full, TimeRemaining::Minutes(70));
        assert_eq!(snapshot.avg_time_to_empty, TimeRemaining::Unknown);
    }

    #[test]
    fn time_to_empty_chain_order() {
        let snapshot = discharging(&[
            (keys::TIME_TO_EMPTY, int(300)),
            (keys::AVG_TIME_TO_EMPTY, int(250)),
        ]);
        assert_eq!(snapshot.avg_time_to_empty, TimeRemaining::Minutes(300));

        let snapshot = discharging(&[
            (keys::AVG_TIME_TO_EMPTY, int(250)),
            (keys::TIME_REMAINING, int(180)),
            (keys::INSTANT_TIME_TO_EMPTY, int(150)),
        ]);
        assert_eq!(snapshot.avg_time_to_empty, TimeRemaining::Minutes(250));

        let snapshot = discharging(&[
            (keys::AVG_TIME_TO_EMPTY, int(65535)),
            (keys::TIME_REMAINING, int(180)),
            (keys::INSTANT_TIME_TO_EMPTY, int(150)),
        ]);
        assert_eq!(snapshot.avg_time_to_empty, TimeRemaining::Minutes(180));

        let snapshot = discharging(&[
            (keys::TIME_REMAINING, int(0)),
            (keys::INSTANT_TIME_TO_EMPTY, int(150)),
        ]);
        assert_eq!(snapshot.avg_time_to_empty, TimeRemaining::Minutes(150));
        assert_eq!(snapshot.avg_time_to_full, TimeRemaining::Unknown);
    }

    #[test]
    fn primary_time_source_wins() {
        let snapshot = normalize(&attrs(&[
            (keys::TIME_TO_EMPTY, int(200)),
            (keys::TIME_REMAINING, int(180)),
            (keys::INSTANT_TIME_TO_EMPTY, int(150)),
        ]));
        assert_eq!(snapshot.avg_time_to_empty, TimeRemaining::Minutes(200));
    }

    #[test]
    fn falls_back_when_primary_invalid_or_absent() {
        let snapshot = normalize(&attrs(&[
            (keys::TIME_TO_EMPTY, int(65535)),
            (keys::INSTANT_TIME_TO_EMPTY, int(150)),
        ]));
        assert_eq!(snapshot.avg_time_to_empty, TimeRemaining::Minutes(150));

        let snapshot = normalize(&attrs(&[
            (keys::IS_CHARGING, AttrValue::Bool(true)),
            (keys::EXTERNAL_CONNECTED, AttrValue::Bool(true)),
            (keys::INSTANT_TIME_TO_FULL, int(42)),
            (keys::INSTANT_TIME_TO_EMPTY, int(999)),
        ]));
        assert_eq!(snapshot.avg_time_to_full, TimeRemaining::Minutes(42));
        assert_eq!(snapshot.avg_time_to_empty, TimeRemaining::Unknown);
    }

    #[test]
    fn no_times_on_ac_without_charging() {
        let snapshot = normalize(&attrs(&[
            (keys::EXTERNAL_CONNECTED, AttrValue::Bool(true)),
            (keys::TIME_REMAINING, int(120)),
        ]));
        assert!(snapshot.is_on_ac_power);
        assert!(!snapshot.is_charging);
        assert_eq!(snapshot.avg_time_to_full, TimeRemaining::Unknown);
        assert_eq!(snapshot.avg_time_to_empty, TimeRemaining::Unknown);
        assert_eq!(snapshot.time_remaining_description(), "on external power");
    }

    #[test]
    fn raw_capacity_override_only_below_threshold() {
        let snapshot = normalize(&attrs(&[
            (keys::MAX_CAPACITY, int(500)),
            (keys::RAW_MAX_CAPACITY, int(1200)),
        ]));
        assert_eq!(snapshot.max_capacity, 1200);

        let snapshot = normalize(&attrs(&[
            (keys::MAX_CAPACITY, int(1200)),
            (keys::RAW_MAX_CAPACITY, int(1500)),
        ]));
        assert_eq!(snapshot.max_capacity, 1200);

        let snapshot = normalize(&attrs(&[
            (keys::CURRENT_CAPACITY, int(80)),
            (keys::RAW_CURRENT_CAPACITY, int(900)),
        ]));
        assert_eq!(snapshot.current_capacity, 80);
    }

    #[test]
    fn raw_max_override_takes_raw_current_too() {
        let snapshot = normalize(&attrs(&[
            (keys::CURRENT_CAPACITY, int(14)),
            (keys::MAX_CAPACITY, int(100)),
            (keys::RAW_CURRENT_CAPACITY, int(600)),
            (keys::RAW_MAX_CAPACITY, int(4382)),
        ]));
        assert_eq!(snapshot.current_capacity, 600);
        assert_eq!(snapshot.max_capacity, 4382);
        assert_eq!(snapshot.percentage(), "13.69%");

        // No raw current reported: keep what we have
        let snapshot = normalize(&attrs(&[
            (keys::CURRENT_CAPACITY, int(14)),
            (keys::MAX_CAPACITY, int(100)),
            (keys::RAW_MAX_CAPACITY, int(4382)),
        ]));
        assert_eq!(snapshot.current_capacity, 14);
        assert_eq!(snapshot.max_capacity, 4382);

        // Max already in mAh: raw current below the threshold is ignored
        let snapshot = normalize(&attrs(&[
            (keys::CURRENT_CAPACITY, int(3100)),
            (keys::MAX_CAPACITY, int(4300)),
            (keys::RAW_CURRENT_CAPACITY, int(600)),
            (keys::RAW_MAX_CAPACITY, int(4382)),
        ]));
        assert_eq!(snapshot.current_capacity, 3100);
        assert_eq!(snapshot.max_capacity, 4300);
    }

    #[test]
    fn combined_state_takes_priority() {
        let snapshot = normalize(&attrs(&[
            (keys::POWER_SOURCE_STATE, AttrValue::Str("AC Power".into())),
            (keys::PS_IS_CHARGING, AttrValue::Bool(true)),
            (keys::EXTERNAL_CONNECTED, AttrValue::Bool(false)),
        ]));
        assert!(snapshot.is_on_ac_power);
        assert!(snapshot.is_charging);

        let snapshot = normalize(&attrs(&[
            (keys::POWER_SOURCE_STATE, AttrValue::Str("Battery Power".into())),
            (keys::IS_CHARGING, AttrValue::Bool(true)),
            (keys::EXTERNAL_CONNECTED, AttrValue::Bool(true)),
        ]));
        assert!(!snapshot.is_on_ac_power);
        assert!(!snapshot.is_charging);
        assert_eq!(snapshot.charging_status_description(), "discharging");
    }

    #[test]
    fn unknown_combined_state_falls_back_to_flags() {
        let snapshot = normalize(&attrs(&[
            (keys::POWER_SOURCE_STATE, AttrValue::Str("UPS Power".into())),
            (keys::EXTERNAL_CONNECTED, AttrValue::Bool(true)),
        ]));
        assert!(snapshot.is_on_ac_power);
        assert!(!snapshot.is_charging);
    }

    #[test]
    fn zero_time_to_full_forces_not_charging() {
        let snapshot = normalize(&attrs(&[
            (keys::POWER_SOURCE_STATE, AttrValue::Str("AC Power".into())),
            (keys::PS_IS_CHARGING, AttrValue::Bool(true)),
            (keys::TIME_TO_FULL_CHARGE, int(0)),
        ]));
        assert!(!snapshot.is_charging);
        assert_eq!(snapshot.charging_status_description(), "on external power");

        let snapshot = normalize(&attrs(&[
            (keys::IS_CHARGING, AttrValue::Bool(true)),
            (keys::EXTERNAL_CONNECTED, AttrValue::Bool(true)),
            (keys::TIME_TO_FULL_CHARGE, int(0)),
        ]));
        assert!(!snapshot.is_charging);
    }

    #[test]
    fn end_to_end_from_registry_text() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(
            &mut file,
            b"\"CurrentCapacity\" = 80\n\"MaxCapacity\" = 100\n\
              \"DesignCapacity\" = 120\n\"IsCharging\" = Yes\n",
        )
        .unwrap();
        let source = TextCommandSource::new("cat", vec![file.path().display().to_string()]);

        let snapshot = acquire(&source).unwrap();
        assert_eq!(snapshot.percentage(), "80.00%");
        assert_eq!(snapshot.health(), 83);
        assert_eq!(snapshot.charging_status_description(), "charging");
    }

    #[test]
    fn missing_design_capacity_is_no_battery() {
        let snapshot = normalize(&attrs(&[
            (keys::CURRENT_CAPACITY, int(80)),
            (keys::MAX_CAPACITY, int(100)),
        ]));
        assert_eq!(snapshot.health(), 0);
        assert_eq!(check_usable(snapshot), Err(AcquireError::NoBatteryDetected));
    }
}
