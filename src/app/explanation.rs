//! AI explanation requests, run on the app runtime

use super::App;
use eframe::egui;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

impl App {
    /// Ask the chat endpoint to explain the current inputs. A request already in flight is cancelled.
    pub fn request_explanation(&mut self, ctx: &egui::Context) {
        if let Some(token) = self.explain_cancel.take() {
            token.cancel();
            debug!("Cancelled previous explanation request");
        }

        let token = CancellationToken::new();
        self.explain_cancel = Some(token.clone());

        let pollutant = self.pollutant_input.clone();
        let flow_rate = self.flow_rate;
        let generation = self.explain_state.lock().unwrap().begin(&pollutant);
        let state = self.explain_state.clone();
        let explainer = self.explainer.clone();
        let ctx = ctx.clone();

        info!(
            pollutant = %pollutant,
            flow_rate,
            model = %explainer.config().model,
            "Requesting AI explanation"
        );

        self.runtime.spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    debug!(generation, "Explanation request dropped");
                }
                text = explainer.explain(&pollutant, flow_rate) => {
                    if !state.lock().unwrap().finish(generation, text) {
                        debug!(generation, "Discarded stale explanation");
                    }
                    ctx.request_repaint();
                }
            }
        });
    }

    pub fn cancel_explanation(&mut self) {
        if let Some(token) = self.explain_cancel.take() {
            token.cancel();
        }
        self.explain_state.lock().unwrap().cancel();
        info!("Explanation request cancelled by user");
    }

    pub fn copy_explanation(&mut self, ctx: &egui::Context) {
        let text = self.explain_state.lock().unwrap().status.text().map(str::to_string);
        if let Some(text) = text {
            ctx.copy_text(text);
            self.show_toast("Explanation copied to clipboard");
        }
    }
}
