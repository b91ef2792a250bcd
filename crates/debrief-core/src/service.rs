use crate::error::Result;
use crate::request::{build_request, parse_analysis, AnalysisInput, GenerationRequest, ParsePolicy};
use crate::types::IntelligenceReport;
use async_trait::async_trait;
use std::time::Instant;

/// External structured-generation service.
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Issue one request and return the raw response text.
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;

    /// Model identifier string.
    fn model_name(&self) -> &str;
}

#[async_trait]
impl<G: GenerationService + ?Sized> GenerationService for std::sync::Arc<G> {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        (**self).generate(request).await
    }
    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

/// Turns collected input into a report with a single outbound call.
///
/// No retries and no partial results: a failed call is returned as is.
pub struct IntelligenceClient<G: GenerationService> {
    service: G,
    policy: ParsePolicy,
}

impl<G: GenerationService> IntelligenceClient<G> {
    pub fn new(service: G) -> Self {
        Self {
            service,
            policy: ParsePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ParsePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> ParsePolicy {
        self.policy
    }

    pub fn model_name(&self) -> &str {
        self.service.model_name()
    }

    pub fn service(&self) -> &G {
        &self.service
    }

    pub async fn analyze(&self, input: &AnalysisInput) -> Result<IntelligenceReport> {
        let request = build_request(input);
        log::debug!(
            "Requesting analysis from {} ({} attachments)",
            self.service.model_name(),
            request.attachments.len()
        );

        let started = Instant::now();
        let text = self.service.generate(&request).await?;
        let analysis = parse_analysis(&text, self.policy)?;
        let report = IntelligenceReport::assemble(analysis, input);

        log::info!(
            "Analysis {} complete in {}ms: {}",
            report.id,
            started.elapsed().as_millis(),
            report.title
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::UploadedFile;
    use crate::error::DebriefError;
    use futures::executor::block_on;
    use std::sync::{Arc, Mutex};

    /// Returns a fixed response and records every request it sees.
    struct CannedService {
        response: std::result::Result<String, String>,
        seen: Mutex<Vec<GenerationRequest>>,
    }

    impl CannedService {
        fn ok(text: &str) -> Self {
            Self {
                response: Ok(text.to_string()),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn failing(reason: &str) -> Self {
            Self {
                response: Err(reason.to_string()),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl GenerationService for CannedService {
        async fn generate(&self, request: &GenerationRequest) -> Result<String> {
            self.seen.lock().unwrap().push(request.clone());
            self.response.clone().map_err(DebriefError::Transport)
        }
        fn model_name(&self) -> &str {
            "canned"
        }
    }

    const CANNED: &str = r#"{
        "meetingType": "Budget review",
        "confidenceScore": 91,
        "sentiment": "Neutral",
        "focusArea": "Cost control",
        "summary": {"overview": "o", "keyDiscussion": "k", "decisionsMade": "d", "outcome": "x"},
        "strategicIntelligence": {"stakeholders": [{"role": "CFO", "sentiment": "Wary"}],
                                  "powerDynamics": "p", "underlyingMotivations": "u"},
        "riskIdentification": {"risks": [{"type": "budget", "description": "over", "severity": "high"}],
                               "hiddenObjection": "h"},
        "talkingPoints": {"points": [{"title": "t", "description": "d"}], "framingStrategy": "f"},
        "objections": [{"objection": "too costly", "response": "phase it"}],
        "nextSteps": [{"action": "a", "owner": "o", "timeline": "t", "status": "pending"}],
        "executiveBrief": "Hold spend flat until Q3 numbers land.",
        "imagePrompt": "a ledger"
    }"#;

    #[test]
    fn test_budget_review_scenario() {
        let client = IntelligenceClient::new(CannedService::ok(CANNED));
        let input = AnalysisInput::new("Budget review", "");

        let report = block_on(client.analyze(&input)).unwrap();
        assert_eq!(report.analysis.executive_brief, "Hold spend flat until Q3 numbers land.");
        assert_eq!(report.title, crate::report::DEFAULT_TITLE);

        let seen = client.service().seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].instruction.contains("Budget review"));
        assert!(seen[0].attachments.is_empty());
    }

    #[test]
    fn test_report_equals_parsed_values() {
        let client = IntelligenceClient::new(CannedService::ok(CANNED));
        let input = AnalysisInput::new("n", "c")
            .with_file(UploadedFile::from_bytes("Board Pack.pdf", "application/pdf", b"%PDF"));

        let report = block_on(client.analyze(&input)).unwrap();
        let expected = crate::request::parse_analysis(CANNED, ParsePolicy::Strict).unwrap();
        assert_eq!(report.analysis, expected);
        assert_eq!(report.title, "Board Pack");
    }

    #[test]
    fn test_invalid_json_fails_under_strict() {
        let client = IntelligenceClient::new(CannedService::ok("<html>oops</html>"));
        let err = block_on(client.analyze(&AnalysisInput::default())).unwrap_err();
        assert!(matches!(err, DebriefError::MalformedReport(_)));
    }

    #[test]
    fn test_invalid_json_degrades_under_lenient() {
        let client = IntelligenceClient::new(CannedService::ok("<html>oops</html>"))
            .with_policy(ParsePolicy::Lenient);
        let report = block_on(client.analyze(&AnalysisInput::default())).unwrap();
        assert!(report.analysis.is_empty());
    }

    #[test]
    fn test_transport_failure_is_not_retried() {
        let client = IntelligenceClient::new(Arc::new(CannedService::failing("connection reset")));
        let err = block_on(client.analyze(&AnalysisInput::default())).unwrap_err();
        assert!(matches!(err, DebriefError::Transport(_)));
        assert_eq!(client.service().seen.lock().unwrap().len(), 1);
        assert_eq!(client.model_name(), "canned");
    }
}
