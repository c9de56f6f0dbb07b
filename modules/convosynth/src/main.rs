use std::path::PathBuf;

use ai_client::OpenAiCompat;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use convosynth::{output, ConversationGenerator, DatasetReport, KnowledgeBase};
use convosynth_common::config::{self, GeneratorConfig};

#[derive(Parser)]
#[command(
    name = "convosynth",
    about = "Generate synthetic commuter-assistant conversations from a knowledge base"
)]
struct Cli {
    /// OpenAI-compatible server root (the chat completions path is appended)
    #[arg(long, env = "CONVOSYNTH_BASE_URL", default_value = config::DEFAULT_BASE_URL)]
    base_url: String,

    #[arg(long, env = "CONVOSYNTH_MODEL", default_value = config::DEFAULT_MODEL)]
    model: String,

    /// Bearer key for hosted endpoints; local servers need none
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Conversations to generate; 0 or less means one per place in the knowledge base
    #[arg(long, env = "CONVOSYNTH_COUNT", default_value_t = config::DEFAULT_COUNT, allow_negative_numbers = true)]
    count: i64,

    #[arg(long, env = "CONVOSYNTH_TEMPERATURE", default_value_t = config::DEFAULT_TEMPERATURE)]
    temperature: f32,

    #[arg(long, env = "CONVOSYNTH_SEED", default_value_t = config::DEFAULT_SEED)]
    seed: u64,

    /// Seconds to wait after each completion call
    #[arg(long, env = "CONVOSYNTH_DELAY", default_value_t = 0.0)]
    delay: f64,

    #[arg(long, env = "CONVOSYNTH_KNOWLEDGE_BASE", default_value = config::DEFAULT_KNOWLEDGE_BASE)]
    knowledge_base: PathBuf,

    #[arg(long, env = "CONVOSYNTH_JSON_OUTPUT", default_value = config::DEFAULT_JSON_OUTPUT)]
    json_output: PathBuf,

    #[arg(long, env = "CONVOSYNTH_CSV_OUTPUT", default_value = config::DEFAULT_CSV_OUTPUT)]
    csv_output: PathBuf,

    /// First day of the sampling window (YYYY-MM-DD)
    #[arg(long, env = "CONVOSYNTH_START_DATE")]
    start_date: Option<NaiveDate>,

    /// Last day of the sampling window, inclusive (YYYY-MM-DD)
    #[arg(long, env = "CONVOSYNTH_END_DATE")]
    end_date: Option<NaiveDate>,

    /// Share of conversations whose answer is blanked
    #[arg(long, env = "CONVOSYNTH_MISSING_ANSWER_RATE", default_value_t = config::DEFAULT_MISSING_ANSWER_RATE)]
    missing_answer_rate: f64,

    /// Also write an aggregate report of the batch as JSON
    #[arg(long, env = "CONVOSYNTH_REPORT_OUTPUT")]
    report_output: Option<PathBuf>,
}

impl Cli {
    fn into_config(self) -> Result<GeneratorConfig> {
        let (default_start, default_end) = config::default_date_window();
        let config = GeneratorConfig {
            base_url: self.base_url,
            model: self.model,
            temperature: self.temperature,
            api_key: self.api_key.filter(|k| !k.is_empty()),
            count: self.count,
            seed: self.seed,
            start_date: self.start_date.unwrap_or(default_start),
            end_date: self.end_date.unwrap_or(default_end),
            missing_answer_rate: self.missing_answer_rate,
            delay: GeneratorConfig::delay_from_secs(self.delay)?,
            knowledge_base_path: self.knowledge_base,
            json_output: self.json_output,
            csv_output: self.csv_output,
            report_output: self.report_output,
        };
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("convosynth=info".parse()?))
        .init();

    let config = Cli::parse().into_config()?;
    config.log_redacted();

    let knowledge_base = KnowledgeBase::load(&config.knowledge_base_path).with_context(|| {
        format!(
            "Failed to load knowledge base from {}",
            config.knowledge_base_path.display()
        )
    })?;

    let mut client = OpenAiCompat::new(&config.base_url, &config.model);
    if let Some(key) = &config.api_key {
        client = client.with_api_key(key);
    }
    info!(
        endpoint = %client.endpoint(),
        authenticated = client.has_api_key(),
        "Using chat completions endpoint"
    );

    let generator = ConversationGenerator::new(client, knowledge_base, config.clone());
    let conversations = generator
        .generate()
        .await
        .context("Conversation generation aborted")?;

    output::write_json(&config.json_output, &conversations)?;
    output::write_csv(&config.csv_output, &conversations)?;

    if let Some(path) = &config.report_output {
        let report = DatasetReport::from_conversations(&conversations, generator.knowledge_base());
        output::write_pretty_json(path, &report)?;
        info!(
            path = %path.display(),
            answer_rate = report.answer_rate,
            unique_locations = report.unique_locations,
            peak_hour = ?report.peak_hour,
            "Wrote dataset report"
        );
    }

    info!(
        "Wrote {} conversations to {} and {}",
        conversations.len(),
        config.json_output.display(),
        config.csv_output.display()
    );

    Ok(())
}
