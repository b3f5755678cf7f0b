//! Application constants and configuration

pub const APP_NAME: &str = "Wastewater Advisor";
pub const APP_TITLE: &str = "Wastewater AI – Industrial Treatment Advisor";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const LOG_FILE_NAME: &str = "wastewater-advisor.log";

// Chat-completion endpoint (OpenAI-compatible, Groq hosted by default)
pub const API_KEY_ENV: &str = "GROQ_API_KEY";
pub const API_KEY_PLACEHOLDER: &str = "demo_key_replace";
pub const DEFAULT_API_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";
pub const DEFAULT_TEMPERATURE: f32 = 0.6;
pub const DEFAULT_MAX_TOKENS: u32 = 500;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Flow rate pre-filled in the input panel (m³/day)
pub const DEFAULT_FLOW_RATE: f64 = 100.0;

// User-visible panel texts
pub const EXPLAIN_FAILURE_PREFIX: &str = "⚠️ AI explanation unavailable: ";
pub const PDF_FAILURE_PREFIX: &str = "⚠️ Could not read PDF: ";
pub const NO_FILE_UPLOADED: &str = "No file uploaded.";

/// Extracted guideline text is cut to this many characters, then EXCERPT_ELLIPSIS is appended
pub const EXCERPT_MAX_CHARS: usize = 2000;
pub const EXCERPT_ELLIPSIS: &str = "...";
