use crate::collector::{data_uri_media_type, strip_data_uri_prefix, UploadedFile, DEFAULT_MEDIA_TYPE};
use crate::error::{DebriefError, Result};
use crate::schema::response_schema;
use crate::types::ReportAnalysis;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Everything the collector hands over when analysis is requested.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisInput {
    pub notes: String,
    pub slides_text: String,
    pub context: String,
    pub files: Vec<UploadedFile>,
}

impl AnalysisInput {
    pub fn new(notes: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            notes: notes.into(),
            context: context.into(),
            ..Default::default()
        }
    }

    pub fn with_slides_text(mut self, slides_text: impl Into<String>) -> Self {
        self.slides_text = slides_text.into();
        self
    }

    pub fn with_file(mut self, file: UploadedFile) -> Self {
        self.files.push(file);
        self
    }
}

/// A file attachment ready for transmission: raw base64, no data-URI prefix.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InlineAttachment {
    pub media_type: String,
    pub data: String,
}

/// One structured-generation request: a single instruction, one attachment
/// per file, and the schema the response must follow.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub instruction: String,
    pub attachments: Vec<InlineAttachment>,
    pub response_schema: Value,
}

/// What to do with response text that is not a valid report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParsePolicy {
    /// Fail the session with `MalformedReport`.
    #[default]
    Strict,
    /// Substitute an empty analysis and log a warning.
    Lenient,
}

impl std::str::FromStr for ParsePolicy {
    type Err = DebriefError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(ParsePolicy::Strict),
            "lenient" => Ok(ParsePolicy::Lenient),
            other => Err(DebriefError::Validation(format!(
                "unknown parse policy '{}', expected strict or lenient",
                other
            ))),
        }
    }
}

fn or_none(s: &str) -> &str {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        "(none provided)"
    } else {
        trimmed
    }
}

/// The natural-language instruction wrapping the three text inputs.
pub fn build_instruction(notes: &str, slides_text: &str, context: &str) -> String {
    format!(
        "You are a senior meeting intelligence analyst. Study the meeting materials below \
         and any attached files, then produce a strategic intelligence report.\n\
         \n\
         Meeting notes:\n{}\n\
         \n\
         Slide content:\n{}\n\
         \n\
         Additional context:\n{}\n\
         \n\
         Identify the meeting type, overall sentiment and focus area, rate your confidence \
         from 0 to 100, summarise the discussion, map stakeholders and their stance, surface \
         risks including the most likely hidden objection, propose talking points with a \
         framing strategy, anticipate objections with responses, list concrete next steps \
         with owners and timelines, write a short executive brief, and describe an image \
         that captures the meeting. Respond with a single JSON object only.",
        or_none(notes),
        or_none(slides_text),
        or_none(context),
    )
}

fn attachment_for(file: &UploadedFile) -> InlineAttachment {
    let media_type = if !file.media_type.trim().is_empty() {
        file.media_type.clone()
    } else {
        data_uri_media_type(&file.payload)
            .unwrap_or(DEFAULT_MEDIA_TYPE)
            .to_string()
    };
    InlineAttachment {
        media_type,
        data: strip_data_uri_prefix(&file.payload).to_string(),
    }
}

/// Package an input into exactly one instruction plus one attachment per
/// file, in submission order.
pub fn build_request(input: &AnalysisInput) -> GenerationRequest {
    GenerationRequest {
        instruction: build_instruction(&input.notes, &input.slides_text, &input.context),
        attachments: input.files.iter().map(attachment_for).collect(),
        response_schema: response_schema(),
    }
}

/// Drop a surrounding Markdown code fence, if the model added one anyway.
fn unfence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Parse response text into a report analysis according to `policy`.
pub fn parse_analysis(text: &str, policy: ParsePolicy) -> Result<ReportAnalysis> {
    match serde_json::from_str::<ReportAnalysis>(unfence(text)) {
        Ok(analysis) => Ok(analysis),
        Err(e) => match policy {
            ParsePolicy::Strict => Err(DebriefError::MalformedReport(e)),
            ParsePolicy::Lenient => {
                log::warn!("Response was not a valid report ({}); using an empty analysis", e);
                Ok(ReportAnalysis::default())
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_review_has_one_text_part_no_attachments() {
        let input = AnalysisInput::new("Budget review", "");
        let req = build_request(&input);
        assert!(req.instruction.contains("Budget review"));
        assert!(req.attachments.is_empty());
        assert_eq!(req.response_schema, response_schema());
    }

    #[test]
    fn test_attachments_follow_submission_order() {
        let input = AnalysisInput::new("n", "c")
            .with_file(UploadedFile::from_bytes("deck.pdf", "application/pdf", b"pdf"))
            .with_file(UploadedFile::from_bytes("photo.png", "image/png", b"png"))
            .with_file(UploadedFile::new("raw.bin", "application/x-custom", "AAAA"));
        let req = build_request(&input);

        assert_eq!(req.attachments.len(), 3);
        assert_eq!(req.attachments[0].media_type, "application/pdf");
        assert_eq!(req.attachments[0].data, "cGRm");
        assert_eq!(req.attachments[1].media_type, "image/png");
        assert_eq!(req.attachments[1].data, "cG5n");
        assert_eq!(req.attachments[2].media_type, "application/x-custom");
        assert_eq!(req.attachments[2].data, "AAAA");
        for a in &req.attachments {
            assert!(!a.data.starts_with("data:"));
        }
    }

    #[test]
    fn test_declared_media_type_wins_over_uri() {
        let file = UploadedFile::new("a", "application/pdf", "data:text/plain;base64,QQ==");
        assert_eq!(attachment_for(&file).media_type, "application/pdf");

        let undeclared = UploadedFile::new("a", "", "data:text/plain;base64,QQ==");
        assert_eq!(attachment_for(&undeclared).media_type, "text/plain");

        let bare = UploadedFile::new("a", "", "QQ==");
        assert_eq!(attachment_for(&bare).media_type, DEFAULT_MEDIA_TYPE);
    }

    #[test]
    fn test_instruction_embeds_all_text_inputs() {
        let text = build_instruction("notes here", "slide one", "renewal at risk");
        assert!(text.contains("notes here"));
        assert!(text.contains("slide one"));
        assert!(text.contains("renewal at risk"));

        let empty = build_instruction("", " ", "");
        assert_eq!(empty.matches("(none provided)").count(), 3);
    }

    #[test]
    fn test_parse_valid_json() {
        let text = r#"{"executiveBrief": "Approve the budget.", "confidenceScore": 87}"#;
        let a = parse_analysis(text, ParsePolicy::Strict).unwrap();
        assert_eq!(a.executive_brief, "Approve the budget.");
        assert_eq!(a.confidence_score, 87.0);
    }

    #[test]
    fn test_strict_policy_fails_on_invalid_json() {
        let err = parse_analysis("Sorry, I cannot help with that.", ParsePolicy::Strict).unwrap_err();
        assert!(matches!(err, DebriefError::MalformedReport(_)));
    }

    #[test]
    fn test_lenient_policy_degrades_to_empty() {
        let a = parse_analysis("not json", ParsePolicy::Lenient).unwrap();
        assert!(a.is_empty());
    }

    #[test]
    fn test_wrong_types_are_invalid() {
        let text = r#"{"nextSteps": "call them"}"#;
        assert!(parse_analysis(text, ParsePolicy::Strict).is_err());
    }

    #[test]
    fn test_code_fence_is_tolerated() {
        let text = "```json\n{\"sentiment\": \"positive\"}\n```";
        let a = parse_analysis(text, ParsePolicy::Strict).unwrap();
        assert_eq!(a.sentiment, "positive");
    }

    #[test]
    fn test_parse_policy_from_str() {
        assert_eq!("STRICT".parse::<ParsePolicy>().unwrap(), ParsePolicy::Strict);
        assert_eq!("lenient".parse::<ParsePolicy>().unwrap(), ParsePolicy::Lenient);
        assert!("loose".parse::<ParsePolicy>().is_err());
        assert_eq!(ParsePolicy::default(), ParsePolicy::Strict);
    }
}
