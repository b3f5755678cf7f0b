//! Reusable UI components
//!
//! Standalone widgets shared by the input panel and the result cards.

use crate::theme;
use crate::treatment::{Summary, TreatmentReport, TABLE_HEADERS};
use eframe::egui;

/// Pill-shaped quick-pick chip. Returns the click response.
pub fn chip(ui: &mut egui::Ui, label: &str, selected: bool) -> egui::Response {
    let font = egui::FontId::proportional(theme::FONT_SECTION);
    let text_w = ui.fonts(|f| {
        f.layout_no_wrap(label.to_string(), font.clone(), theme::TEXT_SECONDARY)
            .rect
            .width()
    });
    let (rect, response) =
        ui.allocate_exact_size(egui::vec2(text_w + 20.0, 24.0), egui::Sense::click());

    if response.hovered() {
        ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
    }
    let base = if selected { theme::ACCENT_DARK } else { theme::BG_SURFACE };
    let (fill, draw_rect) = theme::button_visual(&response, base, rect);
    let painter = ui.painter();
    painter.rect_filled(draw_rect, 12.0, fill);
    if selected {
        painter.rect_stroke(
            draw_rect,
            12.0,
            egui::Stroke::new(theme::STROKE_DEFAULT, theme::ACCENT),
            egui::StrokeKind::Inside,
        );
    }
    painter.text(
        draw_rect.center(),
        egui::Align2::CENTER_CENTER,
        label,
        font,
        if selected { theme::TEXT_PRIMARY } else { theme::TEXT_SECONDARY },
    );
    response
}

/// Square icon button with hover background
pub fn icon_button(ui: &mut egui::Ui, icon: &str, tooltip: &str) -> egui::Response {
    let (rect, response) = ui.allocate_exact_size(
        egui::vec2(theme::BUTTON_HEIGHT, theme::BUTTON_HEIGHT),
        egui::Sense::click(),
    );
    if response.hovered() {
        ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
        ui.painter().rect_filled(rect, theme::RADIUS_DEFAULT, theme::BG_SURFACE);
    }
    ui.painter().text(
        rect.center(),
        egui::Align2::CENTER_CENTER,
        icon,
        egui::FontId::proportional(16.0),
        theme::TEXT_SECONDARY,
    );
    response.on_hover_text(tooltip)
}

/// Card header: icon + caption on the left, optional content on the right
pub fn card_header(ui: &mut egui::Ui, icon: &str, title: &str, right: impl FnOnce(&mut egui::Ui)) {
    ui.horizontal(|ui| {
        ui.add(
            egui::Label::new(
                egui::RichText::new(format!("{}  {}", icon, title))
                    .size(theme::FONT_SECTION)
                    .color(theme::TEXT_DIM),
            )
            .selectable(false),
        );
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), right);
    });
    ui.add_space(theme::SPACING_SM);
}

/// Recommendation summary: heading plus labelled lines
pub fn summary_card(ui: &mut egui::Ui, summary: &Summary) {
    ui.label(
        egui::RichText::new(&summary.heading)
            .size(theme::FONT_TITLE)
            .color(theme::TEXT_PRIMARY)
            .strong(),
    );
    ui.add_space(theme::SPACING_MD);
    for (label, value) in &summary.lines {
        ui.horizontal_wrapped(|ui| {
            ui.spacing_mut().item_spacing.x = theme::SPACING_SM;
            ui.label(
                egui::RichText::new("•")
                    .size(theme::FONT_BODY)
                    .color(theme::ACCENT),
            );
            ui.label(
                egui::RichText::new(format!("{}:", label))
                    .size(theme::FONT_BODY)
                    .color(theme::TEXT_SECONDARY)
                    .strong(),
            );
            ui.label(
                egui::RichText::new(value)
                    .size(theme::FONT_BODY)
                    .color(theme::TEXT_MUTED),
            );
        });
    }
}

/// Per-method cost & sludge estimate table
pub fn estimate_table(ui: &mut egui::Ui, report: &TreatmentReport) {
    use egui_extras::{Column, TableBuilder};

    let header_cell = |ui: &mut egui::Ui, text: &str| {
        ui.add(
            egui::Label::new(
                egui::RichText::new(text)
                    .size(theme::FONT_SMALL)
                    .color(theme::TEXT_DIM)
                    .strong(),
            )
            .selectable(false),
        );
    };
    let value_cell = |ui: &mut egui::Ui, text: String| {
        ui.label(
            egui::RichText::new(text)
                .size(theme::FONT_LABEL)
                .color(theme::TEXT_SECONDARY),
        );
    };

    TableBuilder::new(ui)
        .id_salt("estimate_table")
        .striped(true)
        .resizable(false)
        .vscroll(false)
        .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
        .column(Column::remainder().at_least(180.0).clip(true))
        .columns(Column::auto().at_least(90.0), TABLE_HEADERS.len() - 1)
        .header(theme::TABLE_ROW_HEIGHT, |mut header| {
            for title in TABLE_HEADERS {
                header.col(|ui| header_cell(ui, title));
            }
        })
        .body(|mut body| {
            for row in &report.rows {
                body.row(theme::TABLE_ROW_HEIGHT, |mut table_row| {
                    table_row.col(|ui| value_cell(ui, row.method.clone()));
                    table_row.col(|ui| value_cell(ui, row.efficiency.to_string()));
                    table_row.col(|ui| value_cell(ui, format!("{:.2}", row.cost_per_m3)));
                    table_row.col(|ui| value_cell(ui, format!("{:.2}", row.daily_cost)));
                    table_row.col(|ui| value_cell(ui, format!("{:.2}", row.sludge_kg_per_m3)));
                    table_row.col(|ui| value_cell(ui, format!("{:.2}", row.daily_sludge)));
                });
            }
        });
}

/// Muted placeholder line for panels with nothing to show yet
pub fn placeholder(ui: &mut egui::Ui, text: &str) {
    ui.add(
        egui::Label::new(
            egui::RichText::new(text)
                .size(theme::FONT_LABEL)
                .color(theme::TEXT_DIM)
                .italics(),
        )
        .selectable(false),
    );
}

/// Spinner with a status line
pub fn busy_line(ui: &mut egui::Ui, text: &str) {
    ui.horizontal(|ui| {
        ui.add(egui::Spinner::new().size(14.0).color(theme::ACCENT));
        ui.label(
            egui::RichText::new(text)
                .size(theme::FONT_LABEL)
                .color(theme::TEXT_MUTED),
        );
    });
}
