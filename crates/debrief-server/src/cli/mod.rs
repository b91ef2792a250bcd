pub mod analyze;
pub mod config_cmd;

use crate::config::DebriefConfig;
use clap::{Args, Parser, Subcommand, ValueEnum};
use debrief_core::ParsePolicy;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "debrief")]
#[command(version, about = "Meeting intelligence reports from notes, slides and recordings")]
pub struct Cli {
    /// Path to debrief.toml
    #[arg(
        long,
        global = true,
        env = "DEBRIEF_CONFIG",
        default_value = "debrief.toml"
    )]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve(ServeArgs),
    /// Analyze a meeting once and print the report
    Analyze(AnalyzeArgs),
    /// Print the response schema sent to the model
    Schema,
    /// Configuration commands
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Listen address (overrides [server] http_addr)
    #[arg(long, env = "DEBRIEF_HTTP_ADDR")]
    pub http_addr: Option<String>,

    /// Model name (overrides [gemini] model)
    #[arg(long, env = "DEBRIEF_MODEL")]
    pub model: Option<String>,

    /// strict or lenient (overrides [analysis] parse_policy)
    #[arg(long)]
    pub parse_policy: Option<ParsePolicy>,

    /// Start with an empty history instead of the demo report
    #[arg(long)]
    pub no_demo: bool,
}

impl ServeArgs {
    pub fn apply(&self, config: &mut DebriefConfig) {
        if let Some(addr) = &self.http_addr {
            config.server.http_addr = addr.clone();
        }
        if let Some(model) = &self.model {
            config.gemini.model = model.clone();
        }
        if let Some(policy) = self.parse_policy {
            config.analysis.parse_policy = policy;
        }
        if self.no_demo {
            config.history.seed_demo = false;
        }
    }
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Slides, documents, audio, video or images to attach
    pub files: Vec<PathBuf>,

    /// Meeting notes or transcript
    #[arg(long, default_value = "")]
    pub notes: String,

    /// Additional context about the meeting
    #[arg(long, default_value = "")]
    pub context: String,

    /// Text file with extracted slide content
    #[arg(long)]
    pub slides: Option<PathBuf>,

    /// Model name (overrides [gemini] model)
    #[arg(long, env = "DEBRIEF_MODEL")]
    pub model: Option<String>,

    /// strict or lenient (overrides [analysis] parse_policy)
    #[arg(long)]
    pub parse_policy: Option<ParsePolicy>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Markdown)]
    pub format: OutputFormat,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Markdown,
    Compact,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    Validate,
    Show,
}
