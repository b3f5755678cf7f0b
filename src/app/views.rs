//! Result panels: recommendation, chart, estimate table, explanation, extracted guideline

use super::App;
use crate::constants::{EXPLAIN_FAILURE_PREFIX, PDF_FAILURE_PREFIX};
use crate::theme;
use crate::types::JobStatus;
use crate::ui::chart::efficiency_chart;
use crate::ui::components::{busy_line, card_header, estimate_table, icon_button, placeholder, summary_card};
use eframe::egui;
use egui_phosphor::regular as icons;

impl App {
    pub fn render_results(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        self.render_recommendation(ui, ctx);
        ui.add_space(theme::SPACING_LG);
        self.render_explanation(ui, ctx);
        ui.add_space(theme::SPACING_LG);
        self.render_document(ui, ctx);
    }

    fn render_recommendation(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let report = match &self.recommendation {
            None => {
                theme::card_frame().show(ui, |ui| {
                    ui.set_width(ui.available_width());
                    placeholder(
                        ui,
                        &format!(
                            "Enter a pollutant ({}) and a flow rate, then press Get Recommendation.",
                            self.db.known_keys_hint()
                        ),
                    );
                });
                return;
            }
            Some(Err(e)) => {
                theme::card_frame().show(ui, |ui| {
                    ui.set_width(ui.available_width());
                    ui.label(
                        egui::RichText::new(e.to_string())
                            .size(theme::FONT_BODY)
                            .color(theme::STATUS_ERROR),
                    );
                });
                return;
            }
            Some(Ok(report)) => report.clone(),
        };

        theme::card_frame().show(ui, |ui| {
            ui.set_width(ui.available_width());
            summary_card(ui, &report.summary());
        });

        ui.add_space(theme::SPACING_LG);
        theme::card_frame().show(ui, |ui| {
            ui.set_width(ui.available_width());
            efficiency_chart(ui, &report.chart(), theme::CHART_HEIGHT);
        });

        ui.add_space(theme::SPACING_LG);
        let mut copy_csv = false;
        theme::card_frame().show(ui, |ui| {
            ui.set_width(ui.available_width());
            card_header(ui, icons::TABLE, "COST & SLUDGE ESTIMATION", |ui| {
                copy_csv = icon_button(ui, icons::COPY, "Copy table as CSV").clicked();
            });
            estimate_table(ui, &report);
            ui.add_space(theme::SPACING_SM);
            ui.label(
                egui::RichText::new(format!(
                    "Total across all methods: ${:.2}/day, {:.2} kg sludge/day",
                    report.total_daily_cost(),
                    report.total_daily_sludge()
                ))
                .size(theme::FONT_SMALL)
                .color(theme::TEXT_DIM),
            );
        });
        if copy_csv {
            self.copy_estimate_csv(ctx);
        }
    }

    fn render_explanation(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let (status, pollutant) = {
            let state = self.explain_state.lock().unwrap();
            (state.status.clone(), state.pollutant.clone())
        };

        let mut copy = false;
        let mut cancel = false;
        theme::card_frame().show(ui, |ui| {
            ui.set_width(ui.available_width());
            card_header(ui, icons::BOOK_OPEN, "AI EXPLANATION", |ui| match &status {
                JobStatus::Done(_) => {
                    copy = icon_button(ui, icons::COPY, "Copy explanation").clicked();
                }
                JobStatus::Running => {
                    cancel = icon_button(ui, icons::X, "Cancel request").clicked();
                }
                JobStatus::Idle => {}
            });

            match &status {
                JobStatus::Idle => placeholder(ui, "Press AI Explanation for a detailed treatment write-up."),
                JobStatus::Running => busy_line(
                    ui,
                    &format!("Generating explanation for {}…", pollutant.trim()),
                ),
                JobStatus::Done(text) => {
                    let color = if text.starts_with(EXPLAIN_FAILURE_PREFIX) {
                        theme::STATUS_WARNING
                    } else {
                        theme::TEXT_SECONDARY
                    };
                    ui.add(
                        egui::Label::new(egui::RichText::new(text).size(theme::FONT_BODY).color(color))
                            .selectable(true)
                            .wrap(),
                    );
                }
            }
        });

        if copy {
            self.copy_explanation(ctx);
        }
        if cancel {
            self.cancel_explanation();
        }
    }

    fn render_document(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let (status, file_name) = {
            let state = self.document_state.lock().unwrap();
            (state.status.clone(), state.file_name())
        };

        let mut copy = false;
        theme::card_frame().show(ui, |ui| {
            ui.set_width(ui.available_width());
            card_header(ui, icons::FILE_PDF, "EXTRACTED GUIDELINE", |ui| {
                if status.text().is_some() {
                    copy = icon_button(ui, icons::COPY, "Copy extracted text").clicked();
                }
                if let Some(name) = &file_name {
                    ui.label(egui::RichText::new(name).size(theme::FONT_SMALL).color(theme::TEXT_MUTED));
                }
            });

            match &status {
                JobStatus::Idle => placeholder(ui, "Upload or drop a WHO/EPA guideline PDF to extract its text."),
                JobStatus::Running => busy_line(
                    ui,
                    &format!("Extracting {}…", file_name.as_deref().unwrap_or("document")),
                ),
                JobStatus::Done(text) => {
                    let color = if text.starts_with(PDF_FAILURE_PREFIX) {
                        theme::STATUS_WARNING
                    } else {
                        theme::TEXT_SECONDARY
                    };
                    egui::ScrollArea::vertical()
                        .id_salt("guideline_text")
                        .max_height(240.0)
                        .show(ui, |ui| {
                            ui.add(
                                egui::TextEdit::multiline(&mut text.as_str())
                                    .desired_rows(10)
                                    .desired_width(f32::INFINITY)
                                    .text_color(color)
                                    .font(egui::TextStyle::Monospace),
                            );
                        });
                }
            }
        });

        if copy {
            self.copy_document_text(ctx);
        }
    }
}
