//! Treatment table module
//! Built-in pollutant → treatment records, and the lookup that turns a
//! pollutant + flow rate into a summary, chart and cost/sludge estimate.

use crate::theme;
use crate::utils::{capitalize, csv_field, format_flow_rate, round2};
use eframe::egui::Color32;
use thiserror::Error;
use tracing::debug;

/// Raw record as written in the built-in table: parallel per-method columns
struct RecordSource {
    key: &'static str,
    methods: &'static [&'static str],
    efficiency: &'static [u8],
    cost_per_m3: &'static [f64],
    sludge_kg_per_m3: &'static [f64],
    details: &'static str,
}

const BUILTIN_RECORDS: &[RecordSource] = &[
    RecordSource {
        key: "lead",
        methods: &["Chemical Precipitation", "Ion Exchange", "Membrane Filtration"],
        efficiency: &[85, 90, 95],
        cost_per_m3: &[0.8, 1.5, 2.2],
        sludge_kg_per_m3: &[0.12, 0.05, 0.02],
        details: "Lead can be effectively treated using lime precipitation, ion-exchange resins, or RO membranes.",
    },
    RecordSource {
        key: "arsenic",
        methods: &["Coagulation–Filtration", "Adsorption", "Reverse Osmosis"],
        efficiency: &[80, 88, 96],
        cost_per_m3: &[0.9, 1.2, 2.5],
        sludge_kg_per_m3: &[0.15, 0.07, 0.03],
        details: "Arsenic removal requires multi-barrier approaches including iron-based adsorbents and RO systems.",
    },
    RecordSource {
        key: "chromium",
        methods: &[
            "Reduction + Precipitation",
            "Activated Carbon Adsorption",
            "Electrochemical Treatment",
        ],
        efficiency: &[82, 87, 93],
        cost_per_m3: &[1.0, 1.4, 2.0],
        sludge_kg_per_m3: &[0.18, 0.06, 0.04],
        details: "Chromium (VI) is reduced to Cr (III) before precipitation, or handled with advanced adsorption/EC.",
    },
];

// ============================================================================
// ERRORS
// ============================================================================

/// Problems found while building the treatment table
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TreatmentError {
    #[error("record '{key}' has no treatment methods")]
    NoMethods { key: String },

    #[error("record '{key}' lists {methods} methods but {field} has {len} entries")]
    LengthMismatch {
        key: String,
        field: &'static str,
        methods: usize,
        len: usize,
    },

    #[error("record '{key}' has removal efficiency {value}% (must be 0-100)")]
    EfficiencyOutOfRange { key: String, value: u8 },

    #[error("pollutant key '{0}' appears more than once")]
    DuplicateKey(String),
}

/// Lookup failure shown in the recommendation panel
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LookupError {
    #[error("❌ No data for '{pollutant}'. Try {known}.")]
    UnknownPollutant { pollutant: String, known: String },
}

// ============================================================================
// TABLE
// ============================================================================

/// Treatment options for one pollutant. Per-method columns always have equal length.
#[derive(Debug, Clone, PartialEq)]
pub struct TreatmentRecord {
    key: String,
    methods: Vec<String>,
    efficiency: Vec<u8>,
    cost_per_m3: Vec<f64>,
    sludge_kg_per_m3: Vec<f64>,
    details: String,
}

impl TreatmentRecord {
    pub fn new(
        key: impl Into<String>,
        methods: Vec<String>,
        efficiency: Vec<u8>,
        cost_per_m3: Vec<f64>,
        sludge_kg_per_m3: Vec<f64>,
        details: impl Into<String>,
    ) -> Result<Self, TreatmentError> {
        let key = key.into();
        if methods.is_empty() {
            return Err(TreatmentError::NoMethods { key });
        }

        let columns = [
            ("efficiency", efficiency.len()),
            ("cost_per_m3", cost_per_m3.len()),
            ("sludge_kg_per_m3", sludge_kg_per_m3.len()),
        ];
        for (field, len) in columns {
            if len != methods.len() {
                return Err(TreatmentError::LengthMismatch {
                    key,
                    field,
                    methods: methods.len(),
                    len,
                });
            }
        }

        if let Some(&value) = efficiency.iter().find(|&&e| e > 100) {
            return Err(TreatmentError::EfficiencyOutOfRange { key, value });
        }

        Ok(Self {
            key,
            methods,
            efficiency,
            cost_per_m3,
            sludge_kg_per_m3,
            details: details.into(),
        })
    }

    fn from_source(src: &RecordSource) -> Result<Self, TreatmentError> {
        Self::new(
            src.key,
            src.methods.iter().map(|m| m.to_string()).collect(),
            src.efficiency.to_vec(),
            src.cost_per_m3.to_vec(),
            src.sludge_kg_per_m3.to_vec(),
            src.details,
        )
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn methods(&self) -> &[String] {
        &self.methods
    }

    pub fn efficiency(&self) -> &[u8] {
        &self.efficiency
    }

    pub fn cost_per_m3(&self) -> &[f64] {
        &self.cost_per_m3
    }

    pub fn sludge_kg_per_m3(&self) -> &[f64] {
        &self.sludge_kg_per_m3
    }

    pub fn details(&self) -> &str {
        &self.details
    }

    pub fn method_count(&self) -> usize {
        self.methods.len()
    }
}

/// Immutable pollutant → record table, in declaration order
#[derive(Debug, Clone)]
pub struct TreatmentDb {
    records: Vec<TreatmentRecord>,
}

impl TreatmentDb {
    /// Build the compiled-in table, validating every record
    pub fn builtin() -> Result<Self, TreatmentError> {
        let records = BUILTIN_RECORDS
            .iter()
            .map(TreatmentRecord::from_source)
            .collect::<Result<Vec<_>, _>>()?;
        let db = Self::from_records(records)?;
        debug!(pollutants = db.records.len(), "Treatment table built");
        Ok(db)
    }

    pub fn from_records(records: Vec<TreatmentRecord>) -> Result<Self, TreatmentError> {
        for (i, record) in records.iter().enumerate() {
            if records[..i].iter().any(|r| r.key == record.key) {
                return Err(TreatmentError::DuplicateKey(record.key.clone()));
            }
        }
        Ok(Self { records })
    }

    pub fn get(&self, key: &str) -> Option<&TreatmentRecord> {
        self.records.iter().find(|r| r.key == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.key.as_str())
    }

    /// "lead, arsenic, chromium"
    pub fn known_keys_hint(&self) -> String {
        self.keys().collect::<Vec<_>>().join(", ")
    }

    /// Look up a pollutant (trimmed, case-insensitive) and scale its figures by the flow rate.
    /// The flow rate is used as-is; negative values pass straight through.
    pub fn recommend(&self, pollutant: &str, flow_rate: f64) -> Result<TreatmentReport, LookupError> {
        let key = normalize_pollutant(pollutant);
        let record = self.get(&key).ok_or_else(|| LookupError::UnknownPollutant {
            pollutant: key.clone(),
            known: self.known_keys_hint(),
        })?;
        Ok(TreatmentReport::new(record, flow_rate))
    }
}

pub fn normalize_pollutant(pollutant: &str) -> String {
    pollutant.trim().to_lowercase()
}

// ============================================================================
// REPORT
// ============================================================================

/// One method's unit and daily figures
#[derive(Debug, Clone, PartialEq)]
pub struct EstimateRow {
    pub method: String,
    pub efficiency: u8,
    pub cost_per_m3: f64,
    pub daily_cost: f64,
    pub sludge_kg_per_m3: f64,
    pub daily_sludge: f64,
}

/// Heading plus labelled lines for the summary card
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub heading: String,
    pub lines: Vec<(&'static str, String)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartBar {
    pub label: String,
    pub value: f32,
    pub color: Color32,
}

/// Efficiency-by-method bar chart description
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub title: String,
    pub y_label: &'static str,
    pub y_max: f32,
    pub bars: Vec<ChartBar>,
}

pub const TABLE_HEADERS: [&str; 6] = [
    "Method",
    "Efficiency (%)",
    "Cost ($/m³)",
    "Daily Cost ($)",
    "Sludge (kg/m³)",
    "Sludge (kg/day)",
];

/// Result of a successful lookup
#[derive(Debug, Clone, PartialEq)]
pub struct TreatmentReport {
    pub key: String,
    pub display_name: String,
    pub flow_rate: f64,
    pub details: String,
    pub rows: Vec<EstimateRow>,
}

impl TreatmentReport {
    pub fn new(record: &TreatmentRecord, flow_rate: f64) -> Self {
        let rows = (0..record.method_count())
            .map(|i| {
                let cost = record.cost_per_m3()[i];
                let sludge = record.sludge_kg_per_m3()[i];
                EstimateRow {
                    method: record.methods()[i].clone(),
                    efficiency: record.efficiency()[i],
                    cost_per_m3: cost,
                    daily_cost: round2(cost * flow_rate),
                    sludge_kg_per_m3: sludge,
                    daily_sludge: round2(sludge * flow_rate),
                }
            })
            .collect();

        Self {
            key: record.key().to_string(),
            display_name: capitalize(record.key()),
            flow_rate,
            details: record.details().to_string(),
            rows,
        }
    }

    pub fn methods(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.method.as_str()).collect()
    }

    pub fn efficiencies(&self) -> Vec<u8> {
        self.rows.iter().map(|r| r.efficiency).collect()
    }

    pub fn summary(&self) -> Summary {
        Summary {
            heading: format!("💧 Recommended Treatment for {}", self.display_name),
            lines: vec![
                ("Methods", self.methods().join(", ")),
                ("Efficiency (%)", format!("{:?}", self.efficiencies())),
                ("Technical Note", self.details.clone()),
                (
                    "Flow Rate Consideration",
                    format!(
                        "For {} m³/day, costs and sludge must be considered.",
                        format_flow_rate(self.flow_rate)
                    ),
                ),
            ],
        }
    }

    pub fn chart(&self) -> ChartSpec {
        ChartSpec {
            title: format!("Treatment methods for {}", self.display_name),
            y_label: "Removal Efficiency (%)",
            y_max: 100.0,
            bars: self
                .rows
                .iter()
                .enumerate()
                .map(|(i, r)| ChartBar {
                    label: r.method.clone(),
                    value: r.efficiency as f32,
                    color: theme::CHART_BARS[i % theme::CHART_BARS.len()],
                })
                .collect(),
        }
    }

    pub fn total_daily_cost(&self) -> f64 {
        round2(self.rows.iter().map(|r| r.daily_cost).sum())
    }

    pub fn total_daily_sludge(&self) -> f64 {
        round2(self.rows.iter().map(|r| r.daily_sludge).sum())
    }

    /// Estimate table as CSV, header row first
    pub fn to_csv(&self) -> String {
        let mut out = TABLE_HEADERS.map(csv_field).join(",");
        out.push('\n');
        for r in &self.rows {
            out.push_str(&format!(
                "{},{},{},{},{},{}\n",
                csv_field(&r.method),
                r.efficiency,
                r.cost_per_m3,
                r.daily_cost,
                r.sludge_kg_per_m3,
                r.daily_sludge
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db() -> TreatmentDb {
        TreatmentDb::builtin().unwrap()
    }

    #[test]
    fn builtin_table_matches_literal_values() {
        let db = db();
        assert_eq!(db.keys().collect::<Vec<_>>(), ["lead", "arsenic", "chromium"]);

        let lead = db.get("lead").unwrap();
        assert_eq!(
            lead.methods(),
            ["Chemical Precipitation", "Ion Exchange", "Membrane Filtration"]
        );
        assert_eq!(lead.efficiency(), [85, 90, 95]);
        assert_eq!(lead.cost_per_m3(), [0.8, 1.5, 2.2]);
        assert_eq!(lead.sludge_kg_per_m3(), [0.12, 0.05, 0.02]);

        let arsenic = db.get("arsenic").unwrap();
        assert_eq!(
            arsenic.methods(),
            ["Coagulation–Filtration", "Adsorption", "Reverse Osmosis"]
        );
        assert_eq!(arsenic.efficiency(), [80, 88, 96]);
        assert_eq!(arsenic.cost_per_m3(), [0.9, 1.2, 2.5]);
        assert_eq!(arsenic.sludge_kg_per_m3(), [0.15, 0.07, 0.03]);

        let chromium = db.get("chromium").unwrap();
        assert_eq!(
            chromium.methods(),
            [
                "Reduction + Precipitation",
                "Activated Carbon Adsorption",
                "Electrochemical Treatment"
            ]
        );
        assert_eq!(chromium.efficiency(), [82, 87, 93]);
        assert_eq!(chromium.cost_per_m3(), [1.0, 1.4, 2.0]);
        assert_eq!(chromium.sludge_kg_per_m3(), [0.18, 0.06, 0.04]);
        assert!(chromium.details().starts_with("Chromium (VI) is reduced"));
    }

    #[test]
    fn every_record_has_parallel_columns() {
        let db = db();
        for key in ["lead", "arsenic", "chromium"] {
            let record = db.get(key).unwrap();
            let n = record.methods().len();
            assert_eq!(record.efficiency().len(), n, "{key}");
            assert_eq!(record.cost_per_m3().len(), n, "{key}");
            assert_eq!(record.sludge_kg_per_m3().len(), n, "{key}");

            let report = db.recommend(key, 10.0).unwrap();
            assert_eq!(report.rows.len(), n);
        }
    }

    #[test]
    fn rejects_mismatched_columns() {
        let err = TreatmentRecord::new(
            "zinc",
            vec!["Precipitation".into(), "Ion Exchange".into()],
            vec![80, 90],
            vec![1.0],
            vec![0.1, 0.2],
            "",
        )
        .unwrap_err();
        assert_eq!(
            err,
            TreatmentError::LengthMismatch {
                key: "zinc".into(),
                field: "cost_per_m3",
                methods: 2,
                len: 1,
            }
        );
    }

    #[test]
    fn rejects_bad_efficiency_and_empty_records() {
        let err = TreatmentRecord::new("zinc", vec!["X".into()], vec![120], vec![1.0], vec![0.1], "")
            .unwrap_err();
        assert!(matches!(err, TreatmentError::EfficiencyOutOfRange { value: 120, .. }));

        let err = TreatmentRecord::new("zinc", vec![], vec![], vec![], vec![], "").unwrap_err();
        assert_eq!(err, TreatmentError::NoMethods { key: "zinc".into() });
    }

    #[test]
    fn rejects_duplicate_keys() {
        let record =
            TreatmentRecord::new("zinc", vec!["X".into()], vec![50], vec![1.0], vec![0.1], "").unwrap();
        let err = TreatmentDb::from_records(vec![record.clone(), record]).unwrap_err();
        assert_eq!(err, TreatmentError::DuplicateKey("zinc".into()));
    }

    #[test]
    fn unknown_pollutant_gives_fixed_message() {
        let err = db().recommend("Mercury ", 100.0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "❌ No data for 'mercury'. Try lead, arsenic, chromium."
        );
    }

    #[test]
    fn lookup_normalizes_input() {
        let report = db().recommend("  LEAD\t", 100.0).unwrap();
        assert_eq!(report.key, "lead");
        assert_eq!(report.display_name, "Lead");
    }

    #[test]
    fn daily_figures_scale_with_flow_rate() {
        let report = db().recommend("lead", 100.0).unwrap();
        let daily_cost: Vec<f64> = report.rows.iter().map(|r| r.daily_cost).collect();
        let daily_sludge: Vec<f64> = report.rows.iter().map(|r| r.daily_sludge).collect();
        assert_eq!(daily_cost, [80.0, 150.0, 220.0]);
        assert_eq!(daily_sludge, [12.0, 5.0, 2.0]);
        assert_eq!(report.total_daily_cost(), 450.0);
        assert_eq!(report.total_daily_sludge(), 19.0);

        let report = db().recommend("arsenic", 333.0).unwrap();
        assert_eq!(report.rows[0].daily_cost, 299.7);
        assert_eq!(report.rows[2].daily_sludge, 9.99);
    }

    #[test]
    fn daily_figures_round_half_to_even() {
        // Ion Exchange costs 1.5 per m³
        let report = db().recommend("lead", 0.31).unwrap();
        assert_eq!(report.rows[1].daily_cost, 0.46);

        let report = db().recommend("lead", 1.75).unwrap();
        assert_eq!(report.rows[1].daily_cost, 2.62);

        let report = db().recommend("lead", -1.75).unwrap();
        assert_eq!(report.rows[1].daily_cost, -2.62);
    }

    #[test]
    fn negative_flow_rate_is_not_rejected() {
        let report = db().recommend("chromium", -10.0).unwrap();
        assert_eq!(report.rows[0].daily_cost, -10.0);
        assert_eq!(report.rows[0].daily_sludge, -1.8);
    }

    #[test]
    fn summary_lines() {
        let summary = db().recommend("lead", 100.0).unwrap().summary();
        assert_eq!(summary.heading, "💧 Recommended Treatment for Lead");
        assert_eq!(
            summary.lines[0],
            ("Methods", "Chemical Precipitation, Ion Exchange, Membrane Filtration".to_string())
        );
        assert_eq!(summary.lines[1], ("Efficiency (%)", "[85, 90, 95]".to_string()));
        assert_eq!(
            summary.lines[3].1,
            "For 100.0 m³/day, costs and sludge must be considered."
        );
    }

    #[test]
    fn chart_spec() {
        let chart = db().recommend("arsenic", 50.0).unwrap().chart();
        assert_eq!(chart.title, "Treatment methods for Arsenic");
        assert_eq!(chart.y_label, "Removal Efficiency (%)");
        assert_eq!(chart.y_max, 100.0);
        let values: Vec<f32> = chart.bars.iter().map(|b| b.value).collect();
        assert_eq!(values, [80.0, 88.0, 96.0]);
        assert_eq!(chart.bars[0].color, Color32::from_rgb(0x5d, 0xad, 0xe2));
        assert_eq!(chart.bars[1].color, Color32::from_rgb(0x48, 0xc9, 0xb0));
        assert_eq!(chart.bars[2].color, Color32::from_rgb(0xf5, 0xb0, 0x41));
    }

    #[test]
    fn csv_export() {
        let csv = db().recommend("lead", 100.0).unwrap().to_csv();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines[0],
            "Method,Efficiency (%),Cost ($/m³),Daily Cost ($),Sludge (kg/m³),Sludge (kg/day)"
        );
        assert_eq!(lines[1], "Chemical Precipitation,85,0.8,80,0.12,12");
    }
}
