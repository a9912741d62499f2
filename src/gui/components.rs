// Reusable UI pieces for the battery view

use eframe::egui;

use crate::models::{BatterySnapshot, ChargeState, TimeRemaining};

/// White card with a small label, a large coloured value and an optional grey caption.
pub fn stat_card(
    ui: &mut egui::Ui,
    width: f32,
    height: f32,
    label: &str,
    value: &str,
    caption: Option<&str>,
    color: egui::Color32,
) {
    egui::Frame::none()
        .fill(egui::Color32::WHITE)
        .stroke(egui::Stroke::new(1.0, egui::Color32::from_gray(230)))
        .rounding(10.0)
        .inner_margin(12.0)
        .show(ui, |ui| {
            ui.set_width(width);
            ui.set_height(height);
            ui.vertical(|ui| {
                ui.label(
                    egui::RichText::new(label)
                        .size(11.0)
                        .color(egui::Color32::from_gray(120)),
                );
                ui.add_space(4.0);
                ui.label(egui::RichText::new(value).size(18.0).color(color).strong());
                if let Some(caption) = caption {
                    ui.label(
                        egui::RichText::new(caption)
                            .size(10.0)
                            .color(egui::Color32::from_gray(140)),
                    );
                }
            });
        });
}

/// Colour and verdict for a health percentage.
pub fn health_style(health: u32) -> (egui::Color32, &'static str) {
    match health {
        h if h > 84 => (egui::Color32::from_rgb(16, 185, 129), "Good"),
        h if h >= 50 => (egui::Color32::from_rgb(245, 158, 11), "Fair"),
        _ => (egui::Color32::from_rgb(239, 68, 68), "Poor"),
    }
}

/// Solid badge showing the health verdict above the percentage.
pub fn health_badge(ui: &mut egui::Ui, health: u32) {
    let (color, verdict) = health_style(health);

    egui::Frame::none()
        .fill(color)
        .rounding(8.0)
        .inner_margin(egui::vec2(16.0, 8.0))
        .show(ui, |ui| {
            ui.vertical_centered(|ui| {
                ui.label(
                    egui::RichText::new(verdict)
                        .color(egui::Color32::WHITE)
                        .size(12.0)
                        .strong(),
                );
                ui.label(
                    egui::RichText::new(format!("{}%", health))
                        .color(egui::Color32::WHITE)
                        .size(22.0)
                        .strong(),
                );
            });
        });
}

/// Which way the remaining time counts, when a time is known at all.
pub fn time_caption(snapshot: &BatterySnapshot) -> Option<&'static str> {
    match snapshot.charge_state() {
        ChargeState::Charging if snapshot.avg_time_to_full != TimeRemaining::Unknown => {
            Some("until full")
        }
        ChargeState::Discharging if snapshot.avg_time_to_empty != TimeRemaining::Unknown => {
            Some("until empty")
        }
        _ => None,
    }
}

pub fn charge_state_color(state: ChargeState) -> egui::Color32 {
    match state {
        ChargeState::Charging => egui::Color32::from_rgb(34, 197, 94),
        ChargeState::OnExternalPower => egui::Color32::from_rgb(59, 130, 246),
        ChargeState::Discharging => egui::Color32::from_rgb(251, 146, 60),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_thresholds() {
        assert_eq!(health_style(100).1, "Good");
        assert_eq!(health_style(85).1, "Good");
        assert_eq!(health_style(84).1, "Fair");
        assert_eq!(health_style(50).1, "Fair");
        assert_eq!(health_style(49).1, "Poor");
        assert_eq!(health_style(0).1, "Poor");
    }

    #[test]
    fn time_caption_only_for_known_times() {
        let mut snapshot = BatterySnapshot {
            avg_time_to_empty: TimeRemaining::Minutes(90),
            ..Default::default()
        };
        assert_eq!(time_caption(&snapshot), Some("until empty"));

        snapshot.is_charging = true;
        snapshot.is_on_ac_power = true;
        assert_eq!(time_caption(&snapshot), None);

        snapshot.avg_time_to_full = TimeRemaining::Minutes(30);
        assert_eq!(time_caption(&snapshot), Some("until full"));

        snapshot.is_charging = false;
        assert_eq!(time_caption(&snapshot), None);
    }
}
