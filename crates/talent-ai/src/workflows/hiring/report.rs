//! Serializable summaries of pipeline runs and intake ticks, plus their plain-text renderings.

use std::fmt::Write as _;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;

use super::domain::{CandidateStatus, JobPosting, JobStatus, OfferStatus, SalaryRange};
use super::intake::IntakeReport;
use super::notifications::format_amount;
use super::state::{Milestone, NotificationTally, PipelineState};

/// Matched/missing entries shown per resume in the text rendering.
const ATS_LIST_PREVIEW: usize = 4;

#[derive(Debug, Clone, Serialize)]
pub struct PostingView {
    pub id: String,
    pub title: String,
    pub department: String,
    pub location: String,
    pub salary_range: SalaryRange,
    pub requirements: Vec<String>,
    pub status: JobStatus,
    pub status_label: &'static str,
    pub external_post_id: Option<String>,
    pub posted_at: Option<DateTime<Utc>>,
}

impl PostingView {
    fn from_posting(posting: &JobPosting) -> Self {
        Self {
            id: posting.id.0.clone(),
            title: posting.title.clone(),
            department: posting.department.clone(),
            location: posting.location.clone(),
            salary_range: posting.salary_range,
            requirements: posting.requirements.clone(),
            status: posting.status,
            status_label: posting.status.label(),
            external_post_id: posting.external_post_id.clone(),
            posted_at: posting.posted_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CandidateOutcome {
    pub id: String,
    pub name: String,
    pub email: String,
    pub selected: bool,
    pub status: CandidateStatus,
    pub status_label: &'static str,
    pub interview_at: Option<NaiveDateTime>,
    pub interview_feedback: Option<String>,
    pub offer_amount: Option<f64>,
    pub offer_status: Option<OfferStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offer_status_label: Option<&'static str>,
    pub offer_rounds: u32,
}

/// Final state dump of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineRunSummary {
    pub employee_id: Option<String>,
    pub current_step: Milestone,
    pub current_step_label: &'static str,
    pub completed: bool,
    pub error_message: Option<String>,
    pub posting: Option<PostingView>,
    pub candidate_count: usize,
    pub selected_count: usize,
    pub candidates: Vec<CandidateOutcome>,
    pub notifications: NotificationTally,
}

impl PipelineRunSummary {
    pub fn from_state(state: &PipelineState) -> Self {
        let candidates: Vec<CandidateOutcome> = state
            .candidates
            .iter()
            .map(|candidate| CandidateOutcome {
                id: candidate.id.0.clone(),
                name: candidate.name.clone(),
                email: candidate.email.clone(),
                selected: state.is_selected(&candidate.id),
                status: candidate.status,
                status_label: candidate.status.label(),
                interview_at: candidate.interview_at,
                interview_feedback: candidate.interview_feedback.clone(),
                offer_amount: candidate.offer_amount,
                offer_status: candidate.offer_status,
                offer_status_label: candidate.offer_status.map(OfferStatus::label),
                offer_rounds: candidate.offer_rounds,
            })
            .collect();

        Self {
            employee_id: state.employee.as_ref().map(|employee| employee.id.clone()),
            current_step: state.current_step,
            current_step_label: state.current_step.label(),
            completed: state.completed,
            error_message: state.error_message.clone(),
            posting: state.job_posting.as_ref().map(PostingView::from_posting),
            candidate_count: candidates.len(),
            selected_count: state.selected_ids().len(),
            candidates,
            notifications: state.notifications,
        }
    }

    pub fn accepted_count(&self) -> usize {
        self.candidates
            .iter()
            .filter(|candidate| candidate.status == CandidateStatus::Accepted)
            .count()
    }
}

pub fn render_pipeline_summary(summary: &PipelineRunSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Hiring pipeline summary");
    if let Some(employee_id) = &summary.employee_id {
        let _ = writeln!(out, "Employee: {employee_id}");
    }
    let _ = writeln!(out, "Final step: {}", summary.current_step_label);
    let _ = writeln!(out, "Completed: {}", if summary.completed { "yes" } else { "no" });
    if let Some(error) = &summary.error_message {
        let _ = writeln!(out, "Error: {error}");
    }

    match &summary.posting {
        Some(posting) => {
            let _ = writeln!(
                out,
                "\nPosting {} - {} ({}, {})",
                posting.id, posting.title, posting.location, posting.status_label
            );
            let _ = writeln!(
                out,
                "Salary range: ${} - ${}",
                format_amount(posting.salary_range.min),
                format_amount(posting.salary_range.max)
            );
            if let Some(external) = &posting.external_post_id {
                let _ = writeln!(out, "Job board id: {external}");
            }
        }
        None => {
            let _ = writeln!(out, "\nNo job posting generated");
        }
    }

    let _ = writeln!(
        out,
        "\nCandidates: {} ({} selected, {} accepted)",
        summary.candidate_count,
        summary.selected_count,
        summary.accepted_count()
    );
    for candidate in &summary.candidates {
        let mut line = format!("- {} <{}>: {}", candidate.name, candidate.email, candidate.status_label);
        if let Some(amount) = candidate.offer_amount {
            let _ = write!(line, ", offer ${}", format_amount(amount));
        }
        if let Some(label) = candidate.offer_status_label {
            let _ = write!(line, " [{label}, round {}]", candidate.offer_rounds);
        }
        let _ = writeln!(out, "{line}");
    }

    let _ = writeln!(
        out,
        "\nNotifications: {} sent, {} failed",
        summary.notifications.sent, summary.notifications.failed
    );
    out
}

/// ATS summary of one intake tick: every resume with its overall score and rubric lines.
pub fn render_ats_summary(report: &IntakeReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "ATS summary ({} resumes)", report.summaries.len());
    if let Some(error) = &report.fetch_error {
        let _ = writeln!(out, "Resume fetch failed: {error}");
        return out;
    }

    for summary in &report.summaries {
        let sender = if summary.from_address.is_empty() {
            "unknown sender"
        } else {
            summary.from_address.as_str()
        };
        let _ = writeln!(out, "\n{} ({sender}): {}/100", summary.filename, summary.score);
        for (label, awarded, cap) in summary.breakdown.lines() {
            let _ = writeln!(out, "  {label}: {awarded}/{cap}");
        }
        let _ = writeln!(out, "  Matched: {}", preview(&summary.matched));
        let _ = writeln!(out, "  Missing: {}", preview(&summary.missing));
    }

    let _ = writeln!(
        out,
        "\nInvited {}, rejected {}, confirmed {}",
        report.invitations.len(),
        report.rejections.len(),
        report.confirmations.len()
    );
    out
}

fn preview(items: &[String]) -> String {
    if items.is_empty() {
        return "-".to_string();
    }
    items
        .iter()
        .take(ATS_LIST_PREVIEW)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::hiring::domain::{Applicant, Candidate, CandidateId, Employee};
    use crate::workflows::hiring::intake::ResumeSummary;
    use crate::workflows::hiring::requirements::RequirementsSource;
    use crate::workflows::hiring::scoring::RubricBreakdown;
    use crate::workflows::hiring::state::{StatePatch, StepUpdate};

    fn employee() -> Employee {
        Employee {
            id: "emp_002".to_string(),
            name: "Jane Smith".to_string(),
            position: "Data Scientist".to_string(),
            department: "Analytics".to_string(),
            salary: 92_000.0,
            last_working_day: None,
            reason_for_leaving: String::new(),
            office_location: None,
        }
    }

    fn candidate(id: &str, status: CandidateStatus) -> Candidate {
        let mut candidate = Candidate::from_applicant(
            Applicant {
                id: id.to_string(),
                name: format!("Candidate {id}"),
                email: format!("{id}@example.com"),
                phone: String::new(),
                resume_ref: String::new(),
                experience_years: 3,
                skills: Vec::new(),
                current_salary: None,
                expected_salary: None,
            },
            Utc::now(),
        );
        candidate.status = status;
        candidate
    }

    #[test]
    fn run_summary_labels_candidates_and_offers() {
        let mut state = PipelineState::new(employee());
        let mut accepted = candidate("a", CandidateStatus::Accepted);
        accepted.offer_amount = Some(95_000.0);
        accepted.offer_status = Some(OfferStatus::Accepted);
        accepted.offer_rounds = 1;
        state.apply(
            StepUpdate::at(Milestone::RejectionsSent)
                .with(StatePatch::Candidates(vec![
                    accepted,
                    candidate("b", CandidateStatus::Rejected),
                ]))
                .with(StatePatch::Selection(vec![CandidateId("a".to_string())]))
                .with(StatePatch::Completed),
        );

        let summary = PipelineRunSummary::from_state(&state);
        assert_eq!(summary.employee_id.as_deref(), Some("emp_002"));
        assert_eq!(summary.current_step_label, "rejections_sent");
        assert_eq!(summary.candidate_count, 2);
        assert_eq!(summary.selected_count, 1);
        assert_eq!(summary.accepted_count(), 1);
        assert_eq!(summary.candidates[0].offer_status_label, Some("accepted"));
        assert_eq!(summary.candidates[1].status_label, "rejected");

        let text = render_pipeline_summary(&summary);
        assert!(text.contains("Completed: yes"));
        assert!(text.contains("offer $95,000.00 [accepted, round 1]"));
        assert!(text.contains("No job posting generated"));
    }

    #[test]
    fn ats_summary_truncates_lists_to_four() {
        let requirements: Vec<String> = (1..=6).map(|index| format!("req {index}")).collect();
        let report = IntakeReport {
            requirements_source: RequirementsSource::Artifact,
            requirements: requirements.clone(),
            summaries: vec![ResumeSummary {
                from_address: "dev@example.com".to_string(),
                filename: "dev.pdf".to_string(),
                score: 72,
                matched: requirements.clone(),
                missing: Vec::new(),
                breakdown: RubricBreakdown {
                    keywords: 20,
                    skills: 20,
                    experience: 15,
                    education: 10,
                    format: 7,
                },
            }],
            invitations: Vec::new(),
            rejections: Vec::new(),
            confirmations: Vec::new(),
            fetch_error: None,
            notifications: NotificationTally::default(),
        };

        let text = render_ats_summary(&report);
        assert!(text.contains("dev.pdf (dev@example.com): 72/100"));
        assert!(text.contains("  Keywords: 20/30"));
        assert!(text.contains("  Format: 7/10"));
        assert!(text.contains("Matched: req 1, req 2, req 3, req 4\n"));
        assert!(!text.contains("req 5"));
        assert!(text.contains("Missing: -"));
    }
}
