use crate::cli::{AnalyzeArgs, OutputFormat};
use crate::config::DebriefConfig;
use crate::gemini::GeminiClient;
use anyhow::Result;
use debrief_core::{
    AdvisoryLimits, CompactRenderer, IntelligenceClient, IntelligenceReport, MarkdownRenderer,
    ReportRenderer, SessionCollector, UploadedFile,
};
use std::path::Path;
use tracing::error;

pub async fn run(args: AnalyzeArgs, config_path: &Path) -> Result<()> {
    let mut config = DebriefConfig::load_if_exists(config_path)?;
    if let Some(model) = &args.model {
        config.gemini.model = model.clone();
    }
    if let Some(policy) = args.parse_policy {
        config.analysis.parse_policy = policy;
    }

    let collector = collect(&args)?;
    if collector.is_empty() {
        anyhow::bail!("Nothing to analyze: pass files, --notes or --slides");
    }
    for advisory in collector.advisories(&AdvisoryLimits::default()) {
        eprintln!("⚠️  {}", advisory);
    }

    let gemini = GeminiClient::new(config.gemini.clone())?;
    let client = IntelligenceClient::new(gemini).with_policy(config.analysis.parse_policy);

    eprintln!(
        "Analyzing {} file(s) with {}...",
        collector.files().len(),
        client.model_name()
    );
    let input = collector.snapshot();
    match client.analyze(&input).await {
        Ok(report) => {
            println!("{}", render(&report, args.format)?);
            Ok(())
        }
        Err(e) => {
            error!(kind = e.kind(), "Analysis failed: {}", e);
            eprintln!("❌ {}", e.user_message());
            std::process::exit(1);
        }
    }
}

fn collect(args: &AnalyzeArgs) -> Result<SessionCollector> {
    let mut collector = SessionCollector::new();
    collector.set_notes(args.notes.as_str());
    collector.set_context(args.context.as_str());
    if let Some(path) = &args.slides {
        let text = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
        collector.set_slides_text(text);
    }
    for path in &args.files {
        collector.add_file(UploadedFile::from_path(path)?);
    }
    Ok(collector)
}

fn render(report: &IntelligenceReport, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Markdown => MarkdownRenderer.render(report),
        OutputFormat::Compact => CompactRenderer.render(report),
        OutputFormat::Json => serde_json::to_string_pretty(report)?,
    })
}
