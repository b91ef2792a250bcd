pub mod types;
pub mod error;
pub mod schema;
pub mod collector;
pub mod request;
pub mod report;
pub mod history;
pub mod service;
pub mod renderer;

pub use error::{DebriefError, Result, ANALYSIS_FAILED_MESSAGE};
pub use types::*;
pub use schema::response_schema;
pub use collector::{
    AdvisoryLimits, SessionCollector, UploadedFile, data_uri_media_type, guess_media_type,
    strip_data_uri_prefix,
};
pub use request::{
    AnalysisInput, GenerationRequest, InlineAttachment, ParsePolicy, build_instruction,
    build_request, parse_analysis,
};
pub use report::{derive_title, DEFAULT_TITLE};
pub use history::{ReportHistory, demo_report};
pub use service::{GenerationService, IntelligenceClient};
pub use renderer::{CompactRenderer, MarkdownRenderer, ReportRenderer};
