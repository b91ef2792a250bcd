use crate::types::*;
use std::collections::VecDeque;
use uuid::Uuid;

/// In-memory report history, newest first.
///
/// Reports are only ever added. Nothing survives a restart.
#[derive(Debug, Clone, Default)]
pub struct ReportHistory {
    reports: VecDeque<IntelligenceReport>,
}

impl ReportHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with preloaded entries. `seed` is given newest first and stays
    /// behind anything pushed later.
    pub fn with_seed(seed: Vec<IntelligenceReport>) -> Self {
        Self {
            reports: seed.into(),
        }
    }

    /// Record a completed report as the most recent entry.
    pub fn push(&mut self, report: IntelligenceReport) {
        self.reports.push_front(report);
    }

    pub fn list(&self) -> Vec<IntelligenceReport> {
        self.reports.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &IntelligenceReport> {
        self.reports.iter()
    }

    pub fn get(&self, id: ReportId) -> Option<&IntelligenceReport> {
        self.reports.iter().find(|r| r.id == id)
    }

    pub fn latest(&self) -> Option<&IntelligenceReport> {
        self.reports.front()
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }
}

/// A worked example shown on a fresh start.
pub fn demo_report() -> IntelligenceReport {
    IntelligenceReport {
        id: Uuid::now_v7(),
        date: "Jan 12, 2026".to_string(),
        title: "Acme Renewal Kickoff".to_string(),
        analysis: ReportAnalysis {
            meeting_type: "Client renewal".to_string(),
            confidence_score: 82.0,
            sentiment: "Cautiously positive".to_string(),
            focus_area: "Contract renewal".to_string(),
            summary: Summary {
                overview: "Kickoff for the annual Acme platform renewal.".to_string(),
                key_discussion: "Pricing for the expanded seat count and the migration timeline."
                    .to_string(),
                decisions_made: "Acme will pilot the analytics add-on for one quarter.".to_string(),
                outcome: "Agreement in principle, pending procurement review.".to_string(),
            },
            strategic_intelligence: StrategicIntelligence {
                stakeholders: vec![
                    Stakeholder {
                        role: "VP Operations".to_string(),
                        sentiment: "Champion".to_string(),
                    },
                    Stakeholder {
                        role: "Procurement lead".to_string(),
                        sentiment: "Skeptical".to_string(),
                    },
                ],
                power_dynamics: "Procurement holds the final signature despite Operations driving the need."
                    .to_string(),
                underlying_motivations: "Operations wants fewer manual reports before the audit season."
                    .to_string(),
            },
            risk_identification: RiskIdentification {
                risks: vec![RiskItem {
                    risk_type: "Budget".to_string(),
                    description: "Seat expansion exceeds the approved software budget.".to_string(),
                    severity: "high".to_string(),
                }],
                hidden_objection: "Procurement doubts the migration can finish before the old contract lapses."
                    .to_string(),
            },
            talking_points: TalkingPoints {
                points: vec![TalkingPoint {
                    title: "Migration plan".to_string(),
                    description: "Walk through a dated cut-over plan with rollback steps.".to_string(),
                }],
                framing_strategy: "Frame the renewal as risk reduction for the audit, not a cost increase."
                    .to_string(),
            },
            objections: vec![ObjectionResponse {
                objection: "The price increase is too steep.".to_string(),
                response: "Offer phased seat activation aligned to the pilot results.".to_string(),
            }],
            next_steps: vec![NextStep {
                action: "Send revised pricing proposal".to_string(),
                owner: "Account executive".to_string(),
                timeline: "Friday".to_string(),
                status: "pending".to_string(),
            }],
            executive_brief: "Acme is likely to renew if procurement is convinced the migration is low risk. \
                              Lead with the cut-over plan and phased pricing."
                .to_string(),
            image_prompt: "Two teams around a whiteboard sketching a migration timeline, warm office light"
                .to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(title: &str) -> IntelligenceReport {
        IntelligenceReport {
            id: Uuid::now_v7(),
            date: "Oct 14, 2026".to_string(),
            title: title.to_string(),
            analysis: ReportAnalysis::default(),
        }
    }

    #[test]
    fn test_newest_first_after_n_pushes() {
        let mut history = ReportHistory::with_seed(vec![demo_report()]);
        for i in 0..5 {
            history.push(report(&format!("session {}", i)));
        }
        assert_eq!(history.len(), 6);

        let titles: Vec<_> = history.iter().map(|r| r.title.clone()).collect();
        assert_eq!(
            titles,
            vec![
                "session 4",
                "session 3",
                "session 2",
                "session 1",
                "session 0",
                "Acme Renewal Kickoff"
            ]
        );
        assert_eq!(history.latest().unwrap().title, "session 4");
    }

    #[test]
    fn test_get_by_id() {
        let mut history = ReportHistory::new();
        assert!(history.is_empty());
        let r = report("one");
        let id = r.id;
        history.push(r);
        assert_eq!(history.get(id).unwrap().title, "one");
        assert!(history.get(Uuid::now_v7()).is_none());
    }

    #[test]
    fn test_demo_report_is_populated() {
        let demo = demo_report();
        assert!(!demo.analysis.is_empty());
        assert!(!demo.analysis.next_steps.is_empty());
    }
}
