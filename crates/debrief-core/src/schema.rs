//! Response schema handed to the generation service.
//!
//! The schema describes [`ReportAnalysis`](crate::types::ReportAnalysis) in the
//! OpenAPI subset Gemini accepts for `responseSchema`. It is written by hand
//! next to the types; the tests below compare it key-by-key against what the
//! types actually serialize, so the two cannot drift apart silently.

use serde_json::{json, Map, Value};

fn string(description: &str) -> Value {
    json!({ "type": "STRING", "description": description })
}

fn number(description: &str) -> Value {
    json!({ "type": "NUMBER", "description": description })
}

fn array(items: Value) -> Value {
    json!({ "type": "ARRAY", "items": items })
}

fn object(properties: &[(&str, Value)]) -> Value {
    let mut props = Map::new();
    for (name, schema) in properties {
        props.insert((*name).to_string(), schema.clone());
    }
    let required: Vec<&str> = properties.iter().map(|(name, _)| *name).collect();
    json!({
        "type": "OBJECT",
        "properties": Value::Object(props),
        "required": required,
    })
}

/// The fixed output schema for one intelligence report.
pub fn response_schema() -> Value {
    object(&[
        ("meetingType", string("Kind of meeting, e.g. sales call, board review, 1:1")),
        ("confidenceScore", number("Confidence in the analysis, 0-100")),
        ("sentiment", string("Overall sentiment of the meeting")),
        ("focusArea", string("Main strategic focus area")),
        (
            "summary",
            object(&[
                ("overview", string("What the meeting was about")),
                ("keyDiscussion", string("Key discussion points")),
                ("decisionsMade", string("Decisions reached")),
                ("outcome", string("Overall outcome")),
            ]),
        ),
        (
            "strategicIntelligence",
            object(&[
                (
                    "stakeholders",
                    array(object(&[
                        ("role", string("Stakeholder role or name")),
                        ("sentiment", string("Stakeholder's stance")),
                    ])),
                ),
                ("powerDynamics", string("Who holds influence and how it showed")),
                ("underlyingMotivations", string("What participants actually want")),
            ]),
        ),
        (
            "riskIdentification",
            object(&[
                (
                    "risks",
                    array(object(&[
                        ("type", string("Risk category")),
                        ("description", string("What could go wrong")),
                        ("severity", string("low, medium or high")),
                    ])),
                ),
                ("hiddenObjection", string("The unspoken objection most likely to block progress")),
            ]),
        ),
        (
            "talkingPoints",
            object(&[
                (
                    "points",
                    array(object(&[
                        ("title", string("Short headline")),
                        ("description", string("What to say and why")),
                    ])),
                ),
                ("framingStrategy", string("How to frame the follow-up conversation")),
            ]),
        ),
        (
            "objections",
            array(object(&[
                ("objection", string("Likely objection")),
                ("response", string("Recommended response")),
            ])),
        ),
        (
            "nextSteps",
            array(object(&[
                ("action", string("Action item")),
                ("owner", string("Who owns it")),
                ("timeline", string("When it is due")),
                ("status", string("pending, in progress or done")),
            ])),
        ),
        ("executiveBrief", string("Three to five sentence brief for an executive")),
        ("imagePrompt", string("Prompt for an image that captures the meeting")),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::*;
    use std::collections::BTreeSet;

    /// A value with one element in every list, so nested objects show up.
    fn populated() -> ReportAnalysis {
        ReportAnalysis {
            strategic_intelligence: StrategicIntelligence {
                stakeholders: vec![Stakeholder::default()],
                ..Default::default()
            },
            risk_identification: RiskIdentification {
                risks: vec![RiskItem::default()],
                ..Default::default()
            },
            talking_points: TalkingPoints {
                points: vec![TalkingPoint::default()],
                ..Default::default()
            },
            objections: vec![ObjectionResponse::default()],
            next_steps: vec![NextStep::default()],
            ..Default::default()
        }
    }

    fn assert_matches(schema: &Value, value: &Value, path: &str) {
        match value {
            Value::Object(map) => {
                assert_eq!(schema["type"], "OBJECT", "{} should be OBJECT", path);
                let props = schema["properties"].as_object().unwrap();
                let schema_keys: BTreeSet<&String> = props.keys().collect();
                let value_keys: BTreeSet<&String> = map.keys().collect();
                assert_eq!(schema_keys, value_keys, "key mismatch at {}", path);
                for (k, v) in map {
                    assert_matches(&props[k], v, &format!("{}.{}", path, k));
                }
            }
            Value::Array(items) => {
                assert_eq!(schema["type"], "ARRAY", "{} should be ARRAY", path);
                assert_matches(&schema["items"], &items[0], &format!("{}[]", path));
            }
            Value::String(_) => assert_eq!(schema["type"], "STRING", "{}", path),
            Value::Number(_) => assert_eq!(schema["type"], "NUMBER", "{}", path),
            other => panic!("unexpected value at {}: {:?}", path, other),
        }
    }

    #[test]
    fn test_schema_matches_report_types() {
        let value = serde_json::to_value(populated()).unwrap();
        assert_matches(&response_schema(), &value, "$");
    }

    #[test]
    fn test_every_property_is_required() {
        let schema = response_schema();
        let props = schema["properties"].as_object().unwrap();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(required.len(), props.len());
        assert!(required.contains(&"executiveBrief"));
    }
}
