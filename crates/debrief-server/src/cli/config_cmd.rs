use crate::cli::ConfigCommands;
use crate::config::DebriefConfig;
use anyhow::Result;
use std::path::Path;

pub async fn run(cmd: ConfigCommands, config_path: &Path) -> Result<()> {
    match cmd {
        ConfigCommands::Validate => validate(config_path),
        ConfigCommands::Show => show(config_path),
    }
}

/// What `serve` would run with, one setting per line.
fn summary(config: &DebriefConfig, api_key_set: bool) -> Vec<String> {
    let timeout = match config.gemini.request_timeout_secs {
        Some(secs) => format!("{}s", secs),
        None => "none".to_string(),
    };
    vec![
        format!("listen:        {}", config.server.http_addr),
        format!("model:         {} ({})", config.gemini.model, config.gemini.api_base),
        format!(
            "api key:       {} ({})",
            config.gemini.api_key_env,
            if api_key_set { "set" } else { "NOT set" }
        ),
        format!("timeout:       {}", timeout),
        format!("parse policy:  {:?}", config.analysis.parse_policy).to_lowercase(),
        format!(
            "progress:      +{}% every {}ms up to {}%",
            config.progress.step, config.progress.tick_ms, config.progress.cap
        ),
        format!(
            "sessions:      keep settled {}s, at most {}",
            config.sessions.retain_secs, config.sessions.max_settled
        ),
        format!(
            "history:       {}",
            if config.history.seed_demo { "demo report seeded" } else { "empty" }
        ),
    ]
}

fn validate(config_path: &Path) -> Result<()> {
    let config = match DebriefConfig::load(config_path) {
        Ok(config) => config,
        Err(e) => {
            println!("❌ Failed to parse {}: {}", config_path.display(), e);
            std::process::exit(1);
        }
    };

    let errors = config.validate();
    if !errors.is_empty() {
        println!("❌ Validation errors in {}:", config_path.display());
        for e in &errors {
            println!("  - {}", e);
        }
        std::process::exit(1);
    }

    println!("✅ {} is valid.", config_path.display());
    let api_key_set = std::env::var(&config.gemini.api_key_env)
        .map(|k| !k.trim().is_empty())
        .unwrap_or(false);
    for line in summary(&config, api_key_set) {
        println!("  {}", line);
    }
    if !api_key_set {
        println!(
            "⚠️  Analyses will fail until {} is set.",
            config.gemini.api_key_env
        );
    }
    Ok(())
}

fn show(config_path: &Path) -> Result<()> {
    let config = DebriefConfig::load_or_default(config_path);
    match toml::to_string_pretty(&config) {
        Ok(s) => println!("{}", s),
        Err(e) => anyhow::bail!("Failed to serialize config: {}", e),
    }
    Ok(())
}
