//! Efficiency bar chart, painted directly with egui shapes

use crate::theme;
use crate::treatment::ChartSpec;
use eframe::egui;

const Y_STEP: f32 = 20.0;
const AXIS_LEFT: f32 = 40.0;
const HEADER_HEIGHT: f32 = 44.0;
const LABEL_AREA: f32 = 40.0;
const BAR_FILL_RATIO: f32 = 0.6;

/// Paint the chart into the full available width at the given height
pub fn efficiency_chart(ui: &mut egui::Ui, chart: &ChartSpec, height: f32) {
    let width = ui.available_width();
    let (rect, _) = ui.allocate_exact_size(egui::vec2(width, height), egui::Sense::hover());
    if !ui.is_rect_visible(rect) {
        return;
    }

    let painter = ui.painter_at(rect);

    // Title + y-axis caption
    painter.text(
        egui::pos2(rect.center().x, rect.top() + 10.0),
        egui::Align2::CENTER_CENTER,
        &chart.title,
        egui::FontId::proportional(theme::FONT_HEADING),
        theme::TEXT_PRIMARY,
    );
    painter.text(
        egui::pos2(rect.left() + 4.0, rect.top() + 32.0),
        egui::Align2::LEFT_CENTER,
        chart.y_label,
        egui::FontId::proportional(theme::FONT_SMALL),
        theme::TEXT_DIM,
    );

    let plot = egui::Rect::from_min_max(
        egui::pos2(rect.left() + AXIS_LEFT, rect.top() + HEADER_HEIGHT),
        egui::pos2(rect.right() - theme::SPACING_MD, rect.bottom() - LABEL_AREA),
    );
    if plot.width() <= 0.0 || plot.height() <= 0.0 || chart.y_max <= 0.0 {
        return;
    }
    let y_for = |v: f32| plot.bottom() - (v.clamp(0.0, chart.y_max) / chart.y_max) * plot.height();

    // Gridlines and tick labels
    let mut tick = 0.0;
    while tick <= chart.y_max + f32::EPSILON {
        let y = y_for(tick);
        painter.line_segment(
            [egui::pos2(plot.left(), y), egui::pos2(plot.right(), y)],
            egui::Stroke::new(theme::STROKE_DEFAULT, theme::CHART_GRID),
        );
        painter.text(
            egui::pos2(plot.left() - 6.0, y),
            egui::Align2::RIGHT_CENTER,
            format!("{}", tick as i32),
            egui::FontId::proportional(theme::FONT_SMALL),
            theme::TEXT_DIM,
        );
        tick += Y_STEP;
    }
    painter.line_segment(
        [plot.left_top(), plot.left_bottom()],
        egui::Stroke::new(theme::STROKE_DEFAULT, theme::CHART_AXIS),
    );
    painter.line_segment(
        [plot.left_bottom(), plot.right_bottom()],
        egui::Stroke::new(theme::STROKE_DEFAULT, theme::CHART_AXIS),
    );

    if chart.bars.is_empty() {
        return;
    }

    let slot = plot.width() / chart.bars.len() as f32;
    let bar_w = slot * BAR_FILL_RATIO;

    for (i, bar) in chart.bars.iter().enumerate() {
        let cx = plot.left() + slot * (i as f32 + 0.5);
        let bar_rect = egui::Rect::from_min_max(
            egui::pos2(cx - bar_w / 2.0, y_for(bar.value)),
            egui::pos2(cx + bar_w / 2.0, plot.bottom()),
        );

        let response = ui
            .interact(bar_rect, ui.id().with(("efficiency_bar", i)), egui::Sense::hover())
            .on_hover_text(format!("{}: {}% removal", bar.label, bar.value));
        let fill = if response.hovered() {
            theme::lighten(bar.color, 0.15)
        } else {
            bar.color
        };
        painter.rect_filled(
            bar_rect,
            egui::CornerRadius { nw: 3, ne: 3, sw: 0, se: 0 },
            fill,
        );

        painter.text(
            egui::pos2(cx, bar_rect.top() - 8.0),
            egui::Align2::CENTER_CENTER,
            format!("{}%", bar.value),
            egui::FontId::proportional(theme::FONT_SMALL),
            theme::TEXT_SECONDARY,
        );

        // Method names wrap inside their slot
        let galley = painter.layout(
            bar.label.clone(),
            egui::FontId::proportional(theme::FONT_SMALL),
            theme::TEXT_MUTED,
            (slot - theme::SPACING_MD).max(20.0),
        );
        let label_pos = egui::pos2(cx - galley.size().x / 2.0, plot.bottom() + 6.0);
        painter.galley(label_pos, galley, theme::TEXT_MUTED);
    }
}
