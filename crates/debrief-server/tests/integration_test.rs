use async_trait::async_trait;
use debrief_core::*;
use std::io::Write;
use std::sync::{Arc, Mutex};
use tempfile::tempdir;

/// Records every request and answers with a fixed body.
struct RecordingService {
    reply: std::result::Result<String, u16>,
    seen: Mutex<Vec<GenerationRequest>>,
}

impl RecordingService {
    fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.to_string()),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn failing(status: u16) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(status),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<GenerationRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationService for RecordingService {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        self.seen.lock().unwrap().push(request.clone());
        self.reply.clone().map_err(|status| DebriefError::Service {
            status,
            message: "Resource has been exhausted (e.g. check quota).".to_string(),
        })
    }

    fn model_name(&self) -> &str {
        "recording"
    }
}

const BUDGET_REPORT: &str = r#"```json
{
  "meetingType": "Budget Review",
  "confidenceScore": 91,
  "sentiment": "Cautious",
  "focusArea": "Q3 spend",
  "summary": {
    "overview": "Finance walked through Q3 actuals.",
    "keyDiscussion": "Cloud costs and the hiring freeze.",
    "decisionsMade": "Cap cloud spend at 1.2M.",
    "outcome": "Budget approved with conditions."
  },
  "strategicIntelligence": {
    "stakeholders": [{"role": "CFO", "sentiment": "Skeptical"}],
    "powerDynamics": "CFO holds the veto.",
    "underlyingMotivations": "Protect margin."
  },
  "riskIdentification": {
    "risks": [{"type": "Financial", "description": "Overrun in Q4", "severity": "High"}],
    "hiddenObjection": "Engineering doubts the cap is realistic."
  },
  "talkingPoints": {
    "points": [{"title": "Unit economics", "description": "Cost per customer is falling."}],
    "framingStrategy": "Lead with savings already delivered."
  },
  "objections": [{"objection": "Too expensive", "response": "ROI inside two quarters."}],
  "nextSteps": [{"action": "Send revised forecast", "owner": "Dana", "timeline": "Friday", "status": "pending"}],
  "executiveBrief": "Approve the budget with a hard cloud cap.",
  "imagePrompt": "A balance scale tipping toward savings."
}
```"#;

// ── End-to-end analysis ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_budget_review_end_to_end() {
    let dir = tempdir().unwrap();
    let deck = dir.path().join("Q3Deck.pdf");
    std::fs::File::create(&deck)
        .unwrap()
        .write_all(b"%PDF-1.7 fake deck")
        .unwrap();

    let mut collector = SessionCollector::new();
    collector.set_notes("Budget review");
    collector.add_file(UploadedFile::from_path(&deck).unwrap());
    assert!(collector.advisories(&AdvisoryLimits::default()).is_empty());

    let service = RecordingService::replying(BUDGET_REPORT);
    let client = IntelligenceClient::new(service.clone());
    let report = client.analyze(&collector.take()).await.unwrap();
    assert!(collector.is_empty());

    let requests = service.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert!(request.instruction.contains("Budget review"));
    assert_eq!(request.attachments.len(), 1);
    assert_eq!(request.attachments[0].media_type, "application/pdf");
    assert!(!request.attachments[0].data.starts_with("data:"));
    assert_eq!(request.response_schema, response_schema());

    assert_eq!(report.title, "Q3Deck");
    assert_eq!(report.analysis.meeting_type, "Budget Review");
    assert_eq!(report.analysis.confidence_score, 91.0);
    assert_eq!(report.analysis.summary.decisions_made, "Cap cloud spend at 1.2M.");
    assert_eq!(report.analysis.risk_identification.risks[0].risk_type, "Financial");
    assert_eq!(report.analysis.next_steps[0].owner, "Dana");
    assert_eq!(
        report.analysis.executive_brief,
        "Approve the budget with a hard cloud cap."
    );
}

#[tokio::test]
async fn test_attachments_keep_upload_order() {
    let service = RecordingService::replying("{}");
    let client = IntelligenceClient::new(service.clone());

    let mut collector = SessionCollector::new();
    collector.add_bytes("agenda.txt", "text/plain", b"1. Intro");
    collector.add_bytes("call.mp3", "audio/mpeg", b"ID3");
    collector.add_file(UploadedFile::new("whiteboard.png", "", "data:image/png;base64,iVBORw=="));
    client.analyze(&collector.take()).await.unwrap();

    let types: Vec<_> = service.requests()[0]
        .attachments
        .iter()
        .map(|a| a.media_type.clone())
        .collect();
    assert_eq!(types, vec!["text/plain", "audio/mpeg", "image/png"]);
}

// ── Parse policy ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_strict_rejects_prose_lenient_substitutes_empty() {
    let prose = "I'm sorry, I can't analyze this meeting.";
    let input = AnalysisInput::new("notes", "");

    let strict = IntelligenceClient::new(RecordingService::replying(prose));
    let err = strict.analyze(&input).await.unwrap_err();
    assert!(matches!(err, DebriefError::MalformedReport(_)));
    assert_eq!(err.user_message(), ANALYSIS_FAILED_MESSAGE);

    let lenient =
        IntelligenceClient::new(RecordingService::replying(prose)).with_policy(ParsePolicy::Lenient);
    let report = lenient.analyze(&input).await.unwrap();
    assert!(report.analysis.is_empty());
    assert_eq!(report.title, DEFAULT_TITLE);
}

#[tokio::test]
async fn test_service_failure_hides_details() {
    let client = IntelligenceClient::new(RecordingService::failing(429));
    let err = client
        .analyze(&AnalysisInput::new("notes", ""))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("429"));
    assert_eq!(err.user_message(), ANALYSIS_FAILED_MESSAGE);
}

// ── History ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_history_after_n_sessions() {
    let client = IntelligenceClient::new(RecordingService::replying(BUDGET_REPORT));
    let mut history = ReportHistory::with_seed(vec![demo_report()]);

    let mut ids = Vec::new();
    for i in 0..3 {
        let report = client
            .analyze(&AnalysisInput::new(format!("meeting {}", i), ""))
            .await
            .unwrap();
        ids.push(report.id);
        history.push(report);
    }

    assert_eq!(history.len(), 4);
    let listed: Vec<_> = history.list().into_iter().map(|r| r.id).collect();
    assert_eq!(listed[..3], [ids[2], ids[1], ids[0]]);
    assert_eq!(history.list()[3].title, "Acme Renewal Kickoff");
    assert_eq!(history.latest().unwrap().id, ids[2]);
    assert!(history.get(ids[0]).is_some());
}

// ── Rendering ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_rendered_report_contains_sections() {
    let client = IntelligenceClient::new(RecordingService::replying(BUDGET_REPORT));
    let report = client
        .analyze(&AnalysisInput::new("Budget review", ""))
        .await
        .unwrap();

    let md = MarkdownRenderer.render(&report);
    assert!(md.contains("Approve the budget with a hard cloud cap."));
    assert!(md.contains("Send revised forecast"));

    let compact = CompactRenderer.render(&report);
    assert!(compact.len() < md.len());
    assert!(compact.contains("Budget Review"));
}
