#![windows_subsystem = "windows"]
//! Wastewater Advisor - Main entry point

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

mod app;
mod constants;
mod explain;
mod pdf;
mod settings;
mod theme;
mod treatment;
mod types;
mod ui;
mod utils;

use app::App;
use constants::*;
use eframe::egui;
use egui_phosphor::regular as icons;
use settings::Settings;
use tracing::{error, info};
use treatment::TreatmentDb;
use ui::components::{chip, icon_button};
use utils::get_data_dir;

/// Initialize file logging. Returns a guard that must be held for the app lifetime.
fn init_logging(data_dir: &std::path::Path) -> tracing_appender::non_blocking::WorkerGuard {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let logs_dir = data_dir.join("logs");
    std::fs::create_dir_all(&logs_dir).ok();

    let file_appender = tracing_appender::rolling::daily(&logs_dir, LOG_FILE_NAME);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,wastewater_advisor=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    guard
}

fn main() -> eframe::Result<()> {
    let data_dir = get_data_dir();
    std::fs::create_dir_all(&data_dir).ok();

    // Initialize logging - guard must live for entire app lifetime
    let _log_guard = init_logging(&data_dir);

    info!(version = APP_VERSION, "Wastewater Advisor starting");

    let db = match TreatmentDb::builtin() {
        Ok(db) => db,
        Err(e) => {
            error!(error = %e, "Built-in treatment table is invalid");
            return Err(eframe::Error::AppCreation(Box::new(e)));
        }
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("advisor-worker")
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            error!(error = %e, "Failed to start async runtime");
            return Err(eframe::Error::AppCreation(Box::new(e)));
        }
    };

    let api_key = explain::api_key_from_env();

    // Load saved window position/size
    let settings = Settings::load(&data_dir);
    let win_pos = match (settings.window_x, settings.window_y) {
        (Some(x), Some(y)) => Some(egui::pos2(x, y)),
        _ => None,
    };
    let win_size = match (settings.window_w, settings.window_h) {
        (Some(w), Some(h)) => Some(egui::vec2(w, h)),
        _ => None,
    };

    let mut viewport = egui::ViewportBuilder::default()
        .with_inner_size(win_size.unwrap_or(egui::vec2(1280.0, 860.0)))
        .with_min_inner_size([960.0, 640.0])
        .with_title(APP_TITLE)
        .with_drag_and_drop(true);

    // Window/taskbar icon from the logo
    if let Some((rgba, width, height)) = utils::rasterize_logo(256) {
        let icon = egui::IconData { rgba, width, height };
        viewport = viewport.with_icon(std::sync::Arc::new(icon));
    }

    let needs_center = win_pos.is_none();

    if let Some(pos) = win_pos {
        viewport = viewport.with_position(pos);
    }

    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        APP_TITLE,
        options,
        Box::new(move |cc| {
            let mut app = App::new(cc, db, settings, data_dir, runtime, api_key);
            app.needs_center = needs_center;
            Ok(Box::new(app))
        }),
    )
}

// ============================================================================
// MAIN UPDATE LOOP & UI RENDERING
// ============================================================================

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Track window position/size for saving on exit
        ctx.input(|i| {
            if let Some(rect) = i.viewport().outer_rect {
                self.window_pos = Some(rect.min);
            }
            if let Some(rect) = i.viewport().inner_rect {
                self.window_size = Some(rect.size());
            }
        });

        // Center window on first launch
        if self.needs_center {
            self.needs_center = false;
            if let Some(cmd) = egui::ViewportCommand::center_on_screen(ctx) {
                ctx.send_viewport_cmd(cmd);
            }
        }

        self.handle_dropped_files(ctx);

        self.render_settings_modal(ctx);

        // Left sidebar - inputs (must be added BEFORE CentralPanel)
        egui::SidePanel::left("input_panel")
            .exact_width(theme::SIDEBAR_WIDTH)
            .resizable(false)
            .show_separator_line(false)
            .frame(
                egui::Frame::new()
                    .fill(theme::BG_BASE)
                    .inner_margin(egui::Margin { left: 16, right: 8, top: 0, bottom: 16 }),
            )
            .show(ctx, |ui| self.render_input_panel(ui, ctx));

        egui::CentralPanel::default()
            .frame(
                egui::Frame::new()
                    .fill(theme::BG_BASE)
                    .inner_margin(egui::Margin { left: 8, right: 16, top: 21, bottom: 16 }),
            )
            .show(ctx, |ui| {
                // Store panel rect for toast positioning
                self.central_panel_rect = Some(ui.max_rect());

                ui.add(
                    egui::Label::new(
                        egui::RichText::new(format!("🌊 {}", APP_TITLE))
                            .size(24.0)
                            .color(theme::TEXT_PRIMARY)
                            .strong(),
                    )
                    .selectable(false),
                );
                ui.add_space(theme::SPACING_LG);

                egui::ScrollArea::vertical()
                    .id_salt("results_scroll")
                    .auto_shrink([false, false])
                    .show(ui, |ui| self.render_results(ui, ctx));
            });

        self.render_toast(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        info!("Application shutting down");
        if let Some(token) = self.explain_cancel.take() {
            token.cancel();
        }
        self.save_settings();
    }
}

// ============================================================================
// INPUT PANEL
// ============================================================================

impl App {
    fn render_input_panel(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let avail_w = ui.available_width();

        // Header with logo, centered
        ui.add_space(21.0);
        ui.with_layout(egui::Layout::top_down(egui::Align::Center), |ui| {
            if self.logo_texture.is_none() {
                if let Some((pixels, w, h)) = utils::rasterize_logo(avail_w as u32) {
                    self.logo_texture = Some(ctx.load_texture(
                        "logo",
                        egui::ColorImage::from_rgba_unmultiplied([w as usize, h as usize], &pixels),
                        egui::TextureOptions::LINEAR,
                    ));
                }
            }
            if let Some(texture) = &self.logo_texture {
                let logo_w = avail_w * 0.25;
                ui.image(egui::load::SizedTexture::new(texture.id(), egui::vec2(logo_w, logo_w)));
            }

            ui.add_space(4.0);
            ui.add(
                egui::Label::new(
                    egui::RichText::new("WASTEWATER ADVISOR")
                        .size(theme::FONT_SMALL)
                        .color(theme::TEXT_DIM),
                )
                .selectable(false),
            );
        });
        ui.add_space(theme::SPACING_LG);

        let mut recommend = false;
        let mut explain = false;

        // INPUT section
        theme::section_frame().show(ui, |ui| {
            ui.set_width(ui.available_width());
            theme::section_label(ui, "INPUT PANEL");
            ui.add_space(theme::SPACING_MD);

            ui.label(egui::RichText::new("Enter pollutant").size(theme::FONT_LABEL));
            let response = ui.add(
                egui::TextEdit::singleline(&mut self.pollutant_input)
                    .hint_text("e.g., lead, arsenic, chromium")
                    .desired_width(f32::INFINITY),
            );
            if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                recommend = true;
            }

            ui.add_space(theme::SPACING_SM);
            let current = treatment::normalize_pollutant(&self.pollutant_input);
            let keys: Vec<String> = self.db.keys().map(str::to_string).collect();
            let mut picked: Option<String> = None;
            ui.horizontal_wrapped(|ui| {
                ui.spacing_mut().item_spacing.x = theme::SPACING_SM;
                for key in &keys {
                    if chip(ui, &utils::capitalize(key), current == *key).clicked() {
                        picked = Some(key.clone());
                    }
                }
            });
            if let Some(key) = picked {
                self.pick_pollutant(&key);
            }

            ui.add_space(theme::SPACING_MD);
            ui.label(egui::RichText::new("Flow rate (m³/day)").size(theme::FONT_LABEL));
            ui.add(
                egui::DragValue::new(&mut self.flow_rate)
                    .speed(1.0)
                    .max_decimals(3)
                    .suffix(" m³/day"),
            );

            ui.add_space(theme::SPACING_LG);
            let btn_size = egui::vec2(ui.available_width(), theme::BUTTON_HEIGHT_LARGE);
            if ui
                .add_sized(
                    btn_size,
                    theme::button_accent(format!("{}  Get Recommendation", icons::MAGNIFYING_GLASS)),
                )
                .clicked()
            {
                recommend = true;
            }
            ui.add_space(theme::SPACING_XS);
            if ui
                .add_sized(
                    btn_size,
                    theme::button(format!("{}  AI Explanation", icons::BOOK_OPEN)),
                )
                .clicked()
            {
                explain = true;
            }
        });

        if recommend {
            self.run_recommendation();
        }
        if explain {
            self.request_explanation(ctx);
        }

        ui.add_space(theme::SPACING_LG);

        // DOCUMENT section
        let (file_name, busy) = {
            let state = self.document_state.lock().unwrap();
            (state.file_name(), state.status.is_running())
        };
        let mut upload = false;
        let mut clear = false;
        let mut open_external = false;
        theme::section_frame().show(ui, |ui| {
            ui.set_width(ui.available_width());
            theme::section_label(ui, "UPLOAD WHO/EPA PDF");
            ui.add_space(theme::SPACING_MD);

            let btn_size = egui::vec2(ui.available_width(), theme::BUTTON_HEIGHT);
            let label = if busy {
                format!("{}  Extracting…", icons::HOURGLASS)
            } else {
                format!("{}  Choose PDF…", icons::UPLOAD_SIMPLE)
            };
            if ui.add_enabled(!busy, theme::button(label).min_size(btn_size)).clicked() {
                upload = true;
            }

            ui.add_space(theme::SPACING_SM);
            match &file_name {
                Some(name) => {
                    ui.horizontal(|ui| {
                        ui.add(
                            egui::Label::new(
                                egui::RichText::new(format!("{}  {}", icons::FILE_PDF, name))
                                    .size(theme::FONT_SECTION)
                                    .color(theme::TEXT_SECONDARY),
                            )
                            .truncate(),
                        );
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            clear = icon_button(ui, icons::TRASH, "Remove document").clicked();
                            open_external =
                                icon_button(ui, icons::ARROW_SQUARE_OUT, "Open in viewer").clicked();
                        });
                    });
                }
                None => {
                    ui.label(
                        egui::RichText::new("or drop a PDF onto the window")
                            .size(theme::FONT_SMALL)
                            .color(theme::TEXT_DIM),
                    );
                }
            }
        });

        if upload {
            self.pick_document(ctx);
        }
        if clear {
            self.load_document(ctx, None);
        }
        if open_external {
            self.open_document_externally();
        }

        // Settings button pinned to the bottom
        ui.with_layout(egui::Layout::bottom_up(egui::Align::LEFT), |ui| {
            ui.horizontal(|ui| {
                if icon_button(ui, icons::GEAR, "Settings").clicked() {
                    self.open_settings();
                }
                ui.label(
                    egui::RichText::new(format!("v{}", APP_VERSION))
                        .size(theme::FONT_SMALL)
                        .color(theme::TEXT_DIM),
                );
            });
        });
    }
}
