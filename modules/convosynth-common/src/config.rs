use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;

use crate::error::ConvoSynthError;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:1234";
pub const DEFAULT_MODEL: &str = "ibm/granite-4-h-tiny";
pub const DEFAULT_COUNT: i64 = 25;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_MISSING_ANSWER_RATE: f64 = 0.1;
pub const DEFAULT_KNOWLEDGE_BASE: &str = "knowledge_base.json";
pub const DEFAULT_JSON_OUTPUT: &str = "dummy_conversations.json";
pub const DEFAULT_CSV_OUTPUT: &str = "dummy_conversations.csv";

/// First and last day (inclusive) conversations are dated within.
pub fn default_date_window() -> (NaiveDate, NaiveDate) {
    (
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap_or_default(),
        NaiveDate::from_ymd_opt(2025, 3, 31).unwrap_or_default(),
    )
}

/// Parameters for one generation run.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    // Endpoint
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub api_key: Option<String>,

    // Sampling
    /// Conversations to generate; zero or negative means one per known place.
    pub count: i64,
    pub seed: u64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub missing_answer_rate: f64,

    /// Pause after each completion call.
    pub delay: Duration,

    // Files
    pub knowledge_base_path: PathBuf,
    pub json_output: PathBuf,
    pub csv_output: PathBuf,
    pub report_output: Option<PathBuf>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        let (start_date, end_date) = default_date_window();
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            api_key: None,
            count: DEFAULT_COUNT,
            seed: DEFAULT_SEED,
            start_date,
            end_date,
            missing_answer_rate: DEFAULT_MISSING_ANSWER_RATE,
            delay: Duration::ZERO,
            knowledge_base_path: PathBuf::from(DEFAULT_KNOWLEDGE_BASE),
            json_output: PathBuf::from(DEFAULT_JSON_OUTPUT),
            csv_output: PathBuf::from(DEFAULT_CSV_OUTPUT),
            report_output: None,
        }
    }
}

impl GeneratorConfig {
    /// Convert a delay in (possibly fractional) seconds.
    pub fn delay_from_secs(secs: f64) -> Result<Duration, ConvoSynthError> {
        if !secs.is_finite() || secs < 0.0 {
            return Err(ConvoSynthError::Config(format!(
                "delay must be a non-negative number of seconds, got {secs}"
            )));
        }
        Ok(Duration::from_secs_f64(secs))
    }

    pub fn validate(&self) -> Result<(), ConvoSynthError> {
        if self.base_url.trim().is_empty() {
            return Err(ConvoSynthError::Config("base URL must not be empty".into()));
        }
        if self.model.trim().is_empty() {
            return Err(ConvoSynthError::Config("model must not be empty".into()));
        }
        if !self.temperature.is_finite() || self.temperature < 0.0 {
            return Err(ConvoSynthError::Config(format!(
                "temperature must be a non-negative number, got {}",
                self.temperature
            )));
        }
        if !(0.0..=1.0).contains(&self.missing_answer_rate) {
            return Err(ConvoSynthError::Config(format!(
                "missing answer rate must lie in [0, 1], got {}",
                self.missing_answer_rate
            )));
        }
        if self.end_date < self.start_date {
            return Err(ConvoSynthError::Config(format!(
                "end date {} is before start date {}",
                self.end_date, self.start_date
            )));
        }
        Ok(())
    }

    pub fn log_redacted(&self) {
        fn preview_opt(val: &Option<String>) -> String {
            match val {
                Some(v) if !v.is_empty() => {
                    let n = v.len().min(5);
                    format!("{}...({} chars)", v.get(..n).unwrap_or(""), v.len())
                }
                _ => "<not set>".to_string(),
            }
        }

        tracing::info!("Config loaded:");
        tracing::info!("  base_url: {}", self.base_url);
        tracing::info!("  model: {}", self.model);
        tracing::info!("  OPENAI_API_KEY: {}", preview_opt(&self.api_key));
        tracing::info!(
            "  count: {}, seed: {}, temperature: {}",
            self.count,
            self.seed,
            self.temperature
        );
        tracing::info!("  window: {} .. {}", self.start_date, self.end_date);
        tracing::info!("  knowledge_base: {}", self.knowledge_base_path.display());
    }
}
