use crate::types::IntelligenceReport;
use std::fmt::Write as _;

pub trait ReportRenderer {
    fn render(&self, report: &IntelligenceReport) -> String;
}

/// Every section, as Markdown.
#[derive(Default)]
pub struct MarkdownRenderer;

/// Title, classification, brief and next steps only.
#[derive(Default)]
pub struct CompactRenderer;

fn header(out: &mut String, report: &IntelligenceReport) {
    let a = &report.analysis;
    let _ = writeln!(out, "# {}\n_{}_\n", report.title, report.date);
    let _ = writeln!(
        out,
        "**Type:** {} | **Confidence:** {:.0} | **Sentiment:** {} | **Focus:** {}\n",
        a.meeting_type, a.confidence_score, a.sentiment, a.focus_area
    );
}

fn next_steps(out: &mut String, report: &IntelligenceReport) {
    let _ = writeln!(out, "## Next Steps\n");
    for step in &report.analysis.next_steps {
        let _ = writeln!(
            out,
            "- [{}] {} ({}, {})",
            step.status, step.action, step.owner, step.timeline
        );
    }
    out.push('\n');
}

impl ReportRenderer for MarkdownRenderer {
    fn render(&self, report: &IntelligenceReport) -> String {
        let a = &report.analysis;
        let mut out = String::new();
        header(&mut out, report);

        let _ = writeln!(out, "## Executive Brief\n\n{}\n", a.executive_brief);

        let _ = writeln!(out, "## Summary\n");
        let _ = writeln!(out, "- **Overview:** {}", a.summary.overview);
        let _ = writeln!(out, "- **Key discussion:** {}", a.summary.key_discussion);
        let _ = writeln!(out, "- **Decisions:** {}", a.summary.decisions_made);
        let _ = writeln!(out, "- **Outcome:** {}\n", a.summary.outcome);

        let si = &a.strategic_intelligence;
        let _ = writeln!(out, "## Strategic Intelligence\n");
        for s in &si.stakeholders {
            let _ = writeln!(out, "- **{}**: {}", s.role, s.sentiment);
        }
        let _ = writeln!(out, "\n**Power dynamics:** {}\n", si.power_dynamics);
        let _ = writeln!(out, "**Underlying motivations:** {}\n", si.underlying_motivations);

        let ri = &a.risk_identification;
        let _ = writeln!(out, "## Risks\n");
        for r in &ri.risks {
            let _ = writeln!(out, "- **{}** ({}): {}", r.risk_type, r.severity, r.description);
        }
        let _ = writeln!(out, "\n> **Hidden objection:** {}\n", ri.hidden_objection);

        let tp = &a.talking_points;
        let _ = writeln!(out, "## Talking Points\n");
        for p in &tp.points {
            let _ = writeln!(out, "- **{}**: {}", p.title, p.description);
        }
        let _ = writeln!(out, "\n**Framing strategy:** {}\n", tp.framing_strategy);

        let _ = writeln!(out, "## Objection Handling\n");
        for o in &a.objections {
            let _ = writeln!(out, "- \"{}\" -> {}", o.objection, o.response);
        }
        out.push('\n');

        next_steps(&mut out, report);

        if !a.image_prompt.is_empty() {
            let _ = writeln!(out, "## Image Prompt\n\n{}", a.image_prompt);
        }
        out
    }
}

impl ReportRenderer for CompactRenderer {
    fn render(&self, report: &IntelligenceReport) -> String {
        let mut out = String::new();
        header(&mut out, report);
        let _ = writeln!(out, "{}\n", report.analysis.executive_brief);
        next_steps(&mut out, report);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::demo_report;

    #[test]
    fn test_markdown_contains_every_section() {
        let out = MarkdownRenderer.render(&demo_report());
        for heading in [
            "# Acme Renewal Kickoff",
            "## Executive Brief",
            "## Summary",
            "## Strategic Intelligence",
            "## Risks",
            "## Talking Points",
            "## Objection Handling",
            "## Next Steps",
            "## Image Prompt",
        ] {
            assert!(out.contains(heading), "missing {}", heading);
        }
        assert!(out.contains("Procurement lead"));
        assert!(out.contains("**Confidence:** 82"));
    }

    #[test]
    fn test_compact_is_shorter() {
        let report = demo_report();
        let compact = CompactRenderer.render(&report);
        assert!(compact.contains("Send revised pricing proposal"));
        assert!(!compact.contains("## Risks"));
        assert!(compact.len() < MarkdownRenderer.render(&report).len());
    }
}
