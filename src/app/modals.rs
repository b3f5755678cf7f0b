//! Settings modal (explanation endpoint and input defaults)

use super::App;
use crate::constants::{API_KEY_ENV, DEFAULT_API_BASE_URL};
use crate::settings::Settings;
use crate::theme;
use eframe::egui;
use tracing::info;

impl App {
    pub fn open_settings(&mut self) {
        self.settings_draft = self.settings.clone();
        self.show_settings = true;
    }

    pub fn render_settings_modal(&mut self, ctx: &egui::Context) {
        if !self.show_settings {
            return;
        }

        let mut save = false;
        let mut cancel = false;

        let modal = egui::Modal::new(egui::Id::new("settings_modal"))
            .frame(theme::modal_frame())
            .show(ctx, |ui| {
                ui.set_width(420.0);
                ui.label(
                    egui::RichText::new(format!("{}  Settings", egui_phosphor::regular::GEAR))
                        .size(theme::FONT_TITLE)
                        .color(theme::TEXT_PRIMARY),
                );
                ui.add_space(theme::SPACING_LG);

                theme::section_label(ui, "AI EXPLANATION");
                ui.add_space(theme::SPACING_SM);
                egui::Grid::new("settings_grid")
                    .num_columns(2)
                    .spacing([theme::SPACING_LG, theme::SPACING_MD])
                    .show(ui, |ui| {
                        let draft = &mut self.settings_draft;

                        ui.label("API base URL");
                        ui.add(
                            egui::TextEdit::singleline(&mut draft.api_base_url)
                                .hint_text(DEFAULT_API_BASE_URL)
                                .desired_width(260.0),
                        );
                        ui.end_row();

                        ui.label("Model");
                        ui.add(egui::TextEdit::singleline(&mut draft.model).desired_width(260.0));
                        ui.end_row();

                        ui.label("Temperature");
                        ui.add(egui::Slider::new(&mut draft.temperature, 0.0..=2.0).step_by(0.05));
                        ui.end_row();

                        ui.label("Max tokens");
                        ui.add(egui::DragValue::new(&mut draft.max_tokens).range(1..=8192).speed(10));
                        ui.end_row();

                        ui.label("Timeout");
                        ui.add(
                            egui::DragValue::new(&mut draft.request_timeout_secs)
                                .range(1..=600)
                                .suffix(" s"),
                        );
                        ui.end_row();

                        ui.label("Default flow rate");
                        ui.add(
                            egui::DragValue::new(&mut draft.default_flow_rate)
                                .speed(1.0)
                                .suffix(" m³/day"),
                        );
                        ui.end_row();
                    });

                ui.add_space(theme::SPACING_MD);
                let (key_text, key_color) = if self.api_key_is_placeholder() {
                    (format!("{} is not set, requests will fail to authenticate", API_KEY_ENV), theme::STATUS_WARNING)
                } else {
                    (format!("{} loaded from environment", API_KEY_ENV), theme::STATUS_SUCCESS)
                };
                ui.label(egui::RichText::new(key_text).size(theme::FONT_SMALL).color(key_color));

                ui.add_space(theme::SPACING_LG);
                ui.horizontal(|ui| {
                    if ui.add(theme::button("Reset to defaults")).clicked() {
                        self.settings_draft = Settings {
                            window_x: self.settings_draft.window_x,
                            window_y: self.settings_draft.window_y,
                            window_w: self.settings_draft.window_w,
                            window_h: self.settings_draft.window_h,
                            ..Settings::default()
                        };
                    }
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.add(theme::button_accent("Save")).clicked() {
                            save = true;
                        }
                        if ui.add(theme::button("Cancel")).clicked() {
                            cancel = true;
                        }
                    });
                });
            });

        if save {
            self.settings = self.settings_draft.clone().sanitized();
            self.rebuild_explainer();
            self.save_settings();
            self.show_settings = false;
            info!(model = %self.settings.model, base_url = %self.settings.api_base_url, "Settings saved");
            self.show_toast("Settings saved");
        } else if cancel || modal.should_close() {
            self.show_settings = false;
        }
    }
}
