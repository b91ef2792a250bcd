use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Type alias for report identifiers
pub type ReportId = Uuid;

/// One finished analysis session.
///
/// Identity fields are generated locally; everything under `analysis` is
/// exactly what the generation service returned.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IntelligenceReport {
    /// Unique identifier. UUIDv7 so ids sort by creation time.
    pub id: ReportId,

    /// Human-readable creation date, e.g. "Oct 14, 2026".
    pub date: String,

    /// First uploaded file's base name, or a default.
    pub title: String,

    #[serde(flatten)]
    pub analysis: ReportAnalysis,
}

/// The part of a report the generation service produces.
///
/// Every field defaults to empty so a response that omits a section still
/// deserializes. Values are never range-checked or normalised.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportAnalysis {
    pub meeting_type: String,
    /// Nominally 0-100. Not validated.
    pub confidence_score: f64,
    pub sentiment: String,
    pub focus_area: String,
    pub summary: Summary,
    pub strategic_intelligence: StrategicIntelligence,
    pub risk_identification: RiskIdentification,
    pub talking_points: TalkingPoints,
    pub objections: Vec<ObjectionResponse>,
    pub next_steps: Vec<NextStep>,
    pub executive_brief: String,
    /// Prompt for an illustrative image of the meeting. Passed through verbatim.
    pub image_prompt: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Summary {
    pub overview: String,
    pub key_discussion: String,
    pub decisions_made: String,
    pub outcome: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct StrategicIntelligence {
    pub stakeholders: Vec<Stakeholder>,
    pub power_dynamics: String,
    pub underlying_motivations: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Stakeholder {
    pub role: String,
    pub sentiment: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RiskIdentification {
    pub risks: Vec<RiskItem>,
    /// The one objection nobody voiced but everybody implied.
    pub hidden_objection: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RiskItem {
    /// Free-form category chosen by the service ("budget", "timeline", ...).
    #[serde(rename = "type")]
    pub risk_type: String,
    pub description: String,
    pub severity: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct TalkingPoints {
    pub points: Vec<TalkingPoint>,
    pub framing_strategy: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct TalkingPoint {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ObjectionResponse {
    pub objection: String,
    pub response: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct NextStep {
    pub action: String,
    pub owner: String,
    pub timeline: String,
    pub status: String,
}

impl ReportAnalysis {
    /// True when the service gave us nothing at all.
    pub fn is_empty(&self) -> bool {
        *self == ReportAnalysis::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_sections_default_to_empty() {
        let analysis: ReportAnalysis =
            serde_json::from_str(r#"{"meetingType": "Sales call"}"#).unwrap();
        assert_eq!(analysis.meeting_type, "Sales call");
        assert!(analysis.next_steps.is_empty());
        assert!(analysis.strategic_intelligence.stakeholders.is_empty());
        assert_eq!(analysis.executive_brief, "");
    }

    #[test]
    fn test_risk_type_uses_wire_name() {
        let risk = RiskItem {
            risk_type: "budget".into(),
            description: "No sign-off yet".into(),
            severity: "high".into(),
        };
        let json = serde_json::to_value(&risk).unwrap();
        assert_eq!(json["type"], "budget");
        assert!(json.get("riskType").is_none());
    }

    #[test]
    fn test_report_flattens_analysis() {
        let report = IntelligenceReport {
            id: Uuid::now_v7(),
            date: "Oct 14, 2026".into(),
            title: "Q3 Review".into(),
            analysis: ReportAnalysis {
                executive_brief: "Ship it.".into(),
                ..Default::default()
            },
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["title"], "Q3 Review");
        assert_eq!(json["executiveBrief"], "Ship it.");
        assert!(json.get("analysis").is_none());

        let back: IntelligenceReport = serde_json::from_value(json).unwrap();
        assert_eq!(back, report);
    }

    #[test]
    fn test_is_empty() {
        assert!(ReportAnalysis::default().is_empty());
        let a = ReportAnalysis {
            confidence_score: 42.0,
            ..Default::default()
        };
        assert!(!a.is_empty());
    }
}
