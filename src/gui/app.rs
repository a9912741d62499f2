// Main application state and UI rendering logic for the Battery Status window

// Reusable card and badge components
use crate::gui::{charge_state_color, health_badge, stat_card, time_caption};
// Battery readings and the refresh handoff
use crate::models::BatterySnapshot;
use crate::monitor::BatteryMonitor;
// Import egui for UI rendering
use eframe::egui;
// Repaint cadence while a refresh is running
use std::time::Duration;

/// Main application state for the eframe app.
/// Owns the battery monitor; all published readings are read from it.
pub struct AppState {
    /// Current snapshot, last error and the in-flight refresh
    monitor: BatteryMonitor,
}

impl AppState {
    /// Creates a new application state instance.
    /// Sets light theme, wires repaint notifications and starts the first refresh.
    ///
    /// # Arguments
    /// * `cc` - eframe creation context containing egui context
    /// * `monitor` - battery monitor configured with the startup source
    pub fn new(cc: &eframe::CreationContext<'_>, mut monitor: BatteryMonitor) -> Self {
        // Configure light theme for consistent appearance
        cc.egui_ctx.set_visuals(egui::Visuals::light());

        // Wake the event loop as soon as a refresh result is ready
        let ctx = cc.egui_ctx.clone();
        monitor.set_notifier(move || ctx.request_repaint());

        // Initial reading at startup
        monitor.refresh();

        Self { monitor }
    }

    /// Header row with title, progress spinner and the manual refresh button.
    fn header(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading(egui::RichText::new("Battery").size(20.0).strong());
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let refresh_btn =
                    egui::Button::new(egui::RichText::new("🔄").size(16.0)).frame(false);

                if ui.add(refresh_btn).on_hover_text("Refresh").clicked() {
                    self.monitor.refresh();
                }

                if self.monitor.is_refreshing() {
                    ui.spinner();
                }
            });
        });
    }

    /// Red banner for the last failed refresh; hovering shows the underlying cause.
    fn error_banner(&self, ui: &mut egui::Ui) {
        let (Some(message), Some(err)) =
            (self.monitor.error_message(), self.monitor.last_error())
        else {
            return;
        };

        egui::Frame::none()
            .fill(egui::Color32::from_rgb(254, 226, 226))
            .stroke(egui::Stroke::new(1.0, egui::Color32::from_rgb(239, 68, 68)))
            .rounding(8.0)
            .inner_margin(10.0)
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.colored_label(egui::Color32::from_rgb(185, 28, 28), message)
                    .on_hover_text(err.to_string());
            });
        ui.add_space(10.0);
    }
}

/// Charge level card with the health badge on the right.
fn summary_card(ui: &mut egui::Ui, snapshot: &BatterySnapshot) {
    egui::Frame::none()
        .fill(egui::Color32::WHITE)
        .stroke(egui::Stroke::new(1.0, egui::Color32::from_gray(230)))
        .rounding(12.0)
        .inner_margin(12.0)
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.horizontal(|ui| {
                ui.vertical(|ui| {
                    ui.label(
                        egui::RichText::new("Charge level")
                            .size(11.0)
                            .color(egui::Color32::from_gray(120)),
                    );
                    ui.label(egui::RichText::new(snapshot.percentage()).size(30.0).strong());
                    ui.label(
                        egui::RichText::new(snapshot.charging_status_description())
                            .size(13.0)
                            .color(charge_state_color(snapshot.charge_state())),
                    );
                });

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    health_badge(ui, snapshot.health());
                });
            });
        });
}

/// Striped grid with capacities in mAh.
fn capacity_grid(ui: &mut egui::Ui, snapshot: &BatterySnapshot) {
    egui::Frame::none()
        .fill(egui::Color32::WHITE)
        .stroke(egui::Stroke::new(1.0, egui::Color32::from_gray(220)))
        .rounding(10.0)
        .inner_margin(12.0)
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(egui::RichText::new("Capacity").size(14.0).strong());
            ui.add_space(6.0);

            egui::Grid::new("capacity_grid")
                .striped(true)
                .num_columns(2)
                .spacing([40.0, 6.0])
                .show(ui, |ui| {
                    // First three report rows are the capacities
                    for (label, value) in snapshot.report_rows().into_iter().take(3) {
                        ui.label(egui::RichText::new(label).size(12.0));
                        ui.label(egui::RichText::new(value).size(12.0).monospace());
                        ui.end_row();
                    }
                });
        });
}

impl eframe::App for AppState {
    /// Main UI update function called every frame.
    /// Picks up finished refreshes and renders the fixed battery layout.
    ///
    /// # Arguments
    /// * `ctx` - egui context for rendering
    /// * `_frame` - eframe frame (unused)
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Apply a finished refresh, if any
        self.monitor.poll();

        // Keep the spinner moving until the worker reports back
        if self.monitor.is_refreshing() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        egui::CentralPanel::default()
            .frame(
                egui::Frame::none()
                    .fill(egui::Color32::from_rgb(245, 247, 250))
                    .inner_margin(16.0),
            )
            .show(ctx, |ui| {
                self.header(ui);
                ui.add_space(8.0);
                ui.separator();
                ui.add_space(8.0);

                self.error_banner(ui);

                // Nothing read successfully yet
                let Some(snapshot) = self.monitor.snapshot().cloned() else {
                    ui.vertical_centered(|ui| {
                        ui.add_space(40.0);
                        if self.monitor.is_refreshing() {
                            ui.label("Reading battery information…");
                        } else {
                            ui.heading("No battery information");
                            ui.add_space(6.0);
                            ui.label("Press refresh to try again");
                        }
                    });
                    return;
                };

                summary_card(ui, &snapshot);
                ui.add_space(10.0);

                // Statistics cards in a 2-column grid
                let card_width = (ui.available_width() - 10.0) / 2.0 - 24.0;
                let card_height = 60.0;

                ui.horizontal(|ui| {
                    stat_card(
                        ui,
                        card_width,
                        card_height,
                        "Time remaining",
                        &snapshot.time_remaining_description(),
                        time_caption(&snapshot),
                        egui::Color32::from_rgb(59, 130, 246),
                    );
                    ui.add_space(10.0);
                    stat_card(
                        ui,
                        card_width,
                        card_height,
                        "Cycle count",
                        &snapshot.cycle_count.to_string(),
                        Some("charge cycles"),
                        egui::Color32::from_rgb(168, 85, 247),
                    );
                });

                ui.add_space(10.0);

                ui.horizontal(|ui| {
                    stat_card(
                        ui,
                        card_width,
                        card_height,
                        "Temperature",
                        &format!("{:.1}°C", snapshot.temperature),
                        None,
                        egui::Color32::from_rgb(236, 72, 153),
                    );
                    ui.add_space(10.0);
                    stat_card(
                        ui,
                        card_width,
                        card_height,
                        "Power source",
                        if snapshot.is_on_ac_power { "Power adapter" } else { "Battery" },
                        Some(snapshot.charging_status_description()),
                        egui::Color32::from_rgb(16, 185, 129),
                    );
                });

                ui.add_space(10.0);
                capacity_grid(ui, &snapshot);
            });
    }
}
