mod cli;
mod config;
mod gemini;
mod http;
mod progress;
mod serve;
mod session;

use clap::Parser;
use cli::{Cli, Commands};
use config::DebriefConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so `analyze --format json` stays pipeable.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => {
            let mut config = DebriefConfig::load_if_exists(&cli.config)?;
            args.apply(&mut config);
            serve::run(config).await
        }
        Commands::Analyze(args) => cli::analyze::run(args, &cli.config).await,
        Commands::Schema => {
            println!(
                "{}",
                serde_json::to_string_pretty(&debrief_core::response_schema())?
            );
            Ok(())
        }
        Commands::Config(cmd) => cli::config_cmd::run(cmd, &cli.config).await,
    }
}
