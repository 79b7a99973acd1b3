//! End-to-end hiring scenarios driven through the public service facade with the offline
//! adapters: a roster CSV feeds the pipeline, and a directory inbox feeds resume intake.

use std::fs;
use std::sync::Arc;

use serde_json::json;
use talent_ai::workflows::hiring::adapters::{
    DirectoryResumeSource, FallbackOnlyGenerator, LinkCalendar, MockJobBoard, OutboxNotifier,
    ScriptedOfferDecisions,
};
use talent_ai::workflows::hiring::{
    render_ats_summary, render_pipeline_summary, Applicant, AutoApprove, EmployeeRoster,
    HiringCollaborators, HiringService, IntakeSettings, PipelineSettings, PostPublishPolicy,
    RequirementsArtifact, RequirementsSource,
};

const ROSTER: &str = "\
id,name,position,department,salary,last_working_day,reason_for_leaving,office_location
emp_001,John Doe,Senior Software Engineer,Engineering,85000,,,Pune
emp_002,Jane Smith,Data Scientist,Analytics,92000,2025-07-31,Relocation,
";

fn applicant(id: &str, experience_years: u32, skills: &[&str], expected: Option<f64>) -> Applicant {
    Applicant {
        id: id.to_string(),
        name: format!("Applicant {id}"),
        email: format!("{id}@example.com"),
        phone: String::new(),
        resume_ref: String::new(),
        experience_years,
        skills: skills.iter().map(|skill| skill.to_string()).collect(),
        current_salary: None,
        expected_salary: expected,
    }
}

struct Deployment {
    service: HiringService,
    outbox: Arc<OutboxNotifier>,
    artifact: RequirementsArtifact,
    inbox: std::path::PathBuf,
    _dir: tempfile::TempDir,
}

fn deployment(applicants: Vec<Applicant>, post_publish: PostPublishPolicy) -> Deployment {
    let dir = tempfile::tempdir().expect("temp dir");
    let inbox = dir.path().join("inbox");
    fs::create_dir_all(&inbox).expect("inbox created");
    let artifact = RequirementsArtifact::new(dir.path().join("latest_requirements.txt"));
    let outbox = Arc::new(OutboxNotifier::default());

    let collaborators = HiringCollaborators {
        generator: Arc::new(FallbackOnlyGenerator),
        job_board: Arc::new(MockJobBoard::with_applicants(applicants)),
        notifier: outbox.clone(),
        calendar: Arc::new(LinkCalendar::default()),
        resumes: Arc::new(DirectoryResumeSource::new(&inbox)),
        offer_decisions: Arc::new(ScriptedOfferDecisions::default()),
        approval: Arc::new(AutoApprove),
    };
    let settings = PipelineSettings {
        post_publish,
        min_applicants: 2,
        top_candidates: 2,
        ..PipelineSettings::default()
    };
    let service = HiringService::new(
        settings,
        IntakeSettings::default(),
        collaborators,
        artifact.clone(),
    )
    .expect("valid settings");

    Deployment {
        service,
        outbox,
        artifact,
        inbox,
        _dir: dir,
    }
}

#[tokio::test]
async fn roster_departure_runs_through_offers_and_rejections() {
    let roster = EmployeeRoster::from_reader(ROSTER.as_bytes()).expect("roster parses");
    let deployment = deployment(
        vec![
            applicant("ivy", 7, &["Python", "Statistics"], None),
            applicant("jon", 1, &["Excel"], None),
            applicant("kai", 3, &["Python", "SQL"], Some(150_000.0)),
        ],
        PostPublishPolicy::Continue,
    );

    let summary = deployment
        .service
        .run_pipeline_for(&roster, None)
        .await
        .expect("pipeline runs");

    assert_eq!(summary.employee_id.as_deref(), Some("emp_002"));
    assert!(summary.completed);
    assert_eq!(summary.current_step_label, "rejections_sent");
    assert_eq!(summary.candidate_count, 3);
    assert_eq!(summary.selected_count, 2);
    assert_eq!(summary.accepted_count(), 2);

    let posting = summary.posting.as_ref().expect("posting");
    assert_eq!(posting.title, "Data Scientist - Analytics");
    assert_eq!(posting.status_label, "posted");

    let jon = summary
        .candidates
        .iter()
        .find(|candidate| candidate.id == "jon")
        .expect("jon present");
    assert_eq!(jon.status_label, "applied");
    assert!(!jon.selected);

    let rendered = render_pipeline_summary(&summary);
    assert!(rendered.contains("Employee: emp_002"));
    assert!(rendered.contains("Candidates: 3 (2 selected, 2 accepted)"));

    let subjects: Vec<String> = deployment
        .outbox
        .messages()
        .into_iter()
        .map(|message| message.subject)
        .collect();
    assert_eq!(
        subjects
            .iter()
            .filter(|subject| subject.starts_with("Job Offer"))
            .count(),
        2
    );
    assert_eq!(
        subjects
            .iter()
            .filter(|subject| subject.starts_with("Application Update"))
            .count(),
        1
    );
}

#[tokio::test]
async fn unknown_employee_id_is_reported() {
    let roster = EmployeeRoster::from_reader(ROSTER.as_bytes()).expect("roster parses");
    let deployment = deployment(Vec::new(), PostPublishPolicy::Stop);

    let err = deployment
        .service
        .run_pipeline_for(&roster, Some("emp_404"))
        .await
        .expect_err("unknown employee");
    assert_eq!(err.to_string(), "employee emp_404 not found in roster");
}

#[tokio::test]
async fn directory_inbox_feeds_intake_exactly_once() {
    let deployment = deployment(Vec::new(), PostPublishPolicy::Stop);
    let roster = EmployeeRoster::from_reader(ROSTER.as_bytes()).expect("roster parses");
    deployment
        .service
        .run_pipeline_for(&roster, Some("emp_001"))
        .await
        .expect("pipeline runs");

    for (name, sender) in [("a.json", "a@example.com"), ("b.json", "b@example.com")] {
        let resume = json!({
            "from_address": sender,
            "filename": name.replace(".json", ".pdf"),
            "text": "Rust, Tokio, Postgres",
        });
        fs::write(deployment.inbox.join(name), resume.to_string()).expect("resume dropped");
    }
    fs::write(deployment.inbox.join("broken.json"), "{ not json").expect("broken drop");

    let first = deployment.service.run_intake_once().await;

    assert_eq!(first.requirements_source, RequirementsSource::Artifact);
    assert_eq!(
        first.requirements,
        deployment.artifact.load().expect("readable").expect("present")
    );
    assert_eq!(first.summaries.len(), 2);
    assert_eq!(first.invitations.len(), 2);
    assert!(first.rejections.is_empty());
    assert!(deployment.inbox.join("seen").join("a.json").exists());
    assert!(deployment.inbox.join("seen").join("broken.json").exists());

    let ats = render_ats_summary(&first);
    assert!(ats.contains("ATS summary (2 resumes)"));
    assert!(ats.contains("a.pdf (a@example.com): 0/100"));

    let second = deployment.service.run_intake_once().await;
    assert!(second.summaries.is_empty());
    assert!(second.is_quiet());
}
