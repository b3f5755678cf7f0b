//! Lookup-and-report action

use super::App;
use eframe::egui;
use tracing::{info, warn};

impl App {
    /// Look up the typed pollutant and store the report (or the "no data" message)
    pub fn run_recommendation(&mut self) {
        let result = self.db.recommend(&self.pollutant_input, self.flow_rate);
        match &result {
            Ok(report) => info!(
                pollutant = %report.key,
                flow_rate = self.flow_rate,
                methods = report.rows.len(),
                "Recommendation generated"
            ),
            Err(e) => warn!(input = %self.pollutant_input, error = %e, "Pollutant lookup failed"),
        }
        self.recommendation = Some(result);
    }

    /// Fill the pollutant field from a quick-pick chip and run the lookup
    pub fn pick_pollutant(&mut self, key: &str) {
        self.pollutant_input = key.to_string();
        self.run_recommendation();
    }

    pub fn copy_estimate_csv(&mut self, ctx: &egui::Context) {
        let Some(Ok(report)) = &self.recommendation else {
            return;
        };
        ctx.copy_text(report.to_csv());
        self.show_toast("Estimate table copied as CSV");
    }
}
