//! App module - contains the main application state and logic

mod documents;
mod explanation;
mod modals;
mod recommend;
mod toast;
mod views;

use crate::explain::{ExplainConfig, Explainer};
use crate::settings::Settings;
use crate::theme;
use crate::treatment::{LookupError, TreatmentDb, TreatmentReport};
use crate::types::*;
use eframe::egui;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

// ============================================================================
// APP STATE
// ============================================================================

pub struct App {
    pub(crate) db: TreatmentDb,
    pub(crate) runtime: tokio::runtime::Runtime,
    pub(crate) data_dir: PathBuf,
    pub(crate) settings: Settings,
    pub(crate) api_key: String,
    pub(crate) explainer: Explainer,
    pub(crate) logo_texture: Option<egui::TextureHandle>,
    // Input panel
    pub(crate) pollutant_input: String,
    pub(crate) flow_rate: f64,
    // Recommendation output (None until the first lookup)
    pub(crate) recommendation: Option<Result<TreatmentReport, LookupError>>,
    // Explanation output
    pub(crate) explain_state: Arc<Mutex<ExplainState>>,
    pub(crate) explain_cancel: Option<CancellationToken>,
    // Guideline document output
    pub(crate) document_state: Arc<Mutex<DocumentState>>,
    // Settings modal
    pub(crate) show_settings: bool,
    pub(crate) settings_draft: Settings,
    // Toast notification
    pub(crate) toast_message: Option<String>,
    pub(crate) toast_start: Option<std::time::Instant>,
    pub(crate) central_panel_rect: Option<egui::Rect>,
    // Window geometry
    pub(crate) window_pos: Option<egui::Pos2>,
    pub(crate) window_size: Option<egui::Vec2>,
    pub(crate) needs_center: bool,
}

// ============================================================================
// APP INITIALIZATION & HELPERS
// ============================================================================

impl App {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        db: TreatmentDb,
        settings: Settings,
        data_dir: PathBuf,
        runtime: tokio::runtime::Runtime,
        api_key: String,
    ) -> Self {
        // Force dark theme
        cc.egui_ctx.set_theme(egui::Theme::Dark);

        // Add Phosphor icons font
        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);

        theme::apply_visuals(&cc.egui_ctx);

        let explainer = Explainer::new(ExplainConfig::from_settings(&settings, &api_key));

        Self {
            db,
            runtime,
            data_dir,
            api_key,
            explainer,
            logo_texture: None,
            pollutant_input: String::new(),
            flow_rate: settings.default_flow_rate,
            recommendation: None,
            explain_state: Arc::new(Mutex::new(ExplainState::default())),
            explain_cancel: None,
            document_state: Arc::new(Mutex::new(DocumentState::default())),
            show_settings: false,
            settings_draft: settings.clone(),
            settings,
            toast_message: None,
            toast_start: None,
            central_panel_rect: None,
            window_pos: None,
            window_size: None,
            needs_center: false,
        }
    }

    pub fn save_settings(&mut self) {
        self.settings.window_x = self.window_pos.map(|p| p.x);
        self.settings.window_y = self.window_pos.map(|p| p.y);
        self.settings.window_w = self.window_size.map(|s| s.x);
        self.settings.window_h = self.window_size.map(|s| s.y);
        self.settings.save(&self.data_dir);
    }

    /// Rebuild the HTTP client after the endpoint settings changed
    pub(crate) fn rebuild_explainer(&mut self) {
        self.explainer = Explainer::new(ExplainConfig::from_settings(&self.settings, &self.api_key));
    }

    pub fn api_key_is_placeholder(&self) -> bool {
        self.api_key == crate::constants::API_KEY_PLACEHOLDER
    }
}
