use crate::collector::UploadedFile;
use crate::request::AnalysisInput;
use crate::types::{IntelligenceReport, ReportAnalysis};
use chrono::Local;
use std::path::Path;
use uuid::Uuid;

pub const DEFAULT_TITLE: &str = "Meeting Analysis";

/// Title from the first uploaded file's base name, extension removed.
pub fn derive_title(files: &[UploadedFile]) -> String {
    let Some(first) = files.first() else {
        return DEFAULT_TITLE.to_string();
    };
    let stem = Path::new(first.name.trim())
        .file_stem()
        .and_then(|s| s.to_str())
        .map(str::trim)
        .unwrap_or("");
    if stem.is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        stem.to_string()
    }
}

/// Today's date in the report's display format.
pub fn report_date() -> String {
    Local::now().format("%b %-d, %Y").to_string()
}

impl IntelligenceReport {
    /// Attach locally generated identity to a parsed analysis.
    ///
    /// `id`, `date` and `title` never come from the service, whatever the
    /// response contains.
    pub fn assemble(analysis: ReportAnalysis, input: &AnalysisInput) -> Self {
        Self {
            id: Uuid::now_v7(),
            date: report_date(),
            title: derive_title(&input.files),
            analysis,
        }
    }
}
