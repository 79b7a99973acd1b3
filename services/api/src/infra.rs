use metrics_exporter_prometheus::PrometheusHandle;
use std::fs;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use talent_ai::error::AppError;
use talent_ai::workflows::hiring::adapters::{
    DirectoryResumeSource, FallbackOnlyGenerator, LinkCalendar, MockJobBoard, OutboxNotifier,
    ScriptedOfferDecisions,
};
use talent_ai::workflows::hiring::{Applicant, AutoApprove, HiringCollaborators};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Collaborators for running without any external service: postings land on an in-process
/// board, mail is kept in an outbox, and resumes are read from a local inbox folder.
pub(crate) fn offline_collaborators(
    applicants: Vec<Applicant>,
    inbox: &Path,
) -> HiringCollaborators {
    HiringCollaborators {
        generator: Arc::new(FallbackOnlyGenerator),
        job_board: Arc::new(MockJobBoard::with_applicants(applicants)),
        notifier: Arc::new(OutboxNotifier::default()),
        calendar: Arc::new(LinkCalendar::default()),
        resumes: Arc::new(DirectoryResumeSource::new(inbox)),
        offer_decisions: Arc::new(ScriptedOfferDecisions::default()),
        approval: Arc::new(AutoApprove),
    }
}

/// Applicant pool from a JSON array file, or the built-in sample pool when no file is given.
pub(crate) fn load_applicants(path: Option<&Path>) -> Result<Vec<Applicant>, AppError> {
    let Some(path) = path else {
        return Ok(sample_applicants());
    };

    let raw = fs::read_to_string(path)?;
    serde_json::from_str(&raw).map_err(|err| {
        AppError::Input(format!(
            "applicants file {} is not a JSON applicant list: {err}",
            path.display()
        ))
    })
}

pub(crate) fn sample_applicants() -> Vec<Applicant> {
    let sample = |id: &str, name: &str, years: u32, skills: &[&str], expected: Option<f64>| {
        Applicant {
            id: id.to_string(),
            name: name.to_string(),
            email: format!("{id}@example.com"),
            phone: String::new(),
            resume_ref: String::new(),
            experience_years: years,
            skills: skills.iter().map(|skill| skill.to_string()).collect(),
            current_salary: None,
            expected_salary: expected,
        }
    };

    vec![
        sample("app_001", "Priya Raman", 6, &["Python", "SQL", "Statistics"], None),
        sample("app_002", "Marcus Lee", 4, &["Python", "Machine Learning"], Some(98_000.0)),
        sample("app_003", "Sofia Alvarez", 2, &["Excel", "SQL"], None),
        sample("app_004", "Daniel Okafor", 8, &["Python", "Spark", "Leadership"], Some(140_000.0)),
        sample("app_005", "Hana Sato", 1, &["Communication"], None),
    ]
}
