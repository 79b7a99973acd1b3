use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use tempfile::TempDir;

use crate::workflows::hiring::adapters::{
    FallbackOnlyGenerator, InMemoryResumeSource, LinkCalendar, MockJobBoard, OutboxNotifier,
    ScriptedOfferDecisions,
};
use crate::workflows::hiring::collaborators::{
    ApprovalGate, AutoApprove, CalendarEvent, CalendarScheduler, ContentGenerator,
    HiringCollaborators, InboundResume, JobBoardPublisher, ResumeSource, ServiceError,
};
use crate::workflows::hiring::domain::{
    Applicant, Candidate, Employee, JobPosting, PostingPatch, SalaryRange,
};
use crate::workflows::hiring::engine::{ApprovalOutcome, PipelineSettings, WorkflowEngine};
use crate::workflows::hiring::intake::{IntakeSettings, ResumeIntake};
use crate::workflows::hiring::requirements::RequirementsArtifact;
use crate::workflows::hiring::service::HiringService;

/// Monday 2025-06-02 09:00; the first interview day is Wednesday 2025-06-04.
pub(super) fn monday_morning() -> NaiveDateTime {
    at(2025, 6, 2, 9, 0)
}

pub(super) fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, 0))
        .expect("valid timestamp")
}

pub(super) fn employee(salary: f64) -> Employee {
    Employee {
        id: "emp_002".to_string(),
        name: "Jane Smith".to_string(),
        position: "Data Scientist".to_string(),
        department: "Analytics".to_string(),
        salary,
        last_working_day: NaiveDate::from_ymd_opt(2025, 7, 31),
        reason_for_leaving: "Relocation".to_string(),
        office_location: None,
    }
}

pub(super) fn applicant(id: &str, experience_years: u32, skills: &[&str]) -> Applicant {
    Applicant {
        id: id.to_string(),
        name: format!("Applicant {id}"),
        email: format!("{id}@example.com"),
        phone: String::new(),
        resume_ref: format!("resumes/{id}.pdf"),
        experience_years,
        skills: skills.iter().map(|skill| skill.to_string()).collect(),
        current_salary: None,
        expected_salary: None,
    }
}

pub(super) fn resume(from_address: &str, text: &str) -> InboundResume {
    InboundResume {
        from_address: from_address.to_string(),
        subject: "Application".to_string(),
        filename: format!("{}.pdf", from_address.split('@').next().unwrap_or("resume")),
        text: text.to_string(),
    }
}

/// Offline collaborators plus handles to the concrete fakes for assertions.
pub(super) struct Harness {
    pub(super) job_board: Arc<MockJobBoard>,
    pub(super) outbox: Arc<OutboxNotifier>,
    pub(super) calendar: Arc<LinkCalendar>,
    pub(super) resumes: Arc<InMemoryResumeSource>,
    pub(super) collaborators: HiringCollaborators,
    dir: TempDir,
}

impl Harness {
    pub(super) fn new(applicants: Vec<Applicant>) -> Self {
        let job_board = Arc::new(MockJobBoard::with_applicants(applicants));
        let outbox = Arc::new(OutboxNotifier::default());
        let calendar = Arc::new(LinkCalendar::default());
        let resumes = Arc::new(InMemoryResumeSource::default());

        let collaborators = HiringCollaborators {
            generator: Arc::new(FallbackOnlyGenerator),
            job_board: job_board.clone(),
            notifier: outbox.clone(),
            calendar: calendar.clone(),
            resumes: resumes.clone(),
            offer_decisions: Arc::new(ScriptedOfferDecisions::default()),
            approval: Arc::new(AutoApprove),
        };

        Self {
            job_board,
            outbox,
            calendar,
            resumes,
            collaborators,
            dir: tempfile::tempdir().expect("temp dir"),
        }
    }

    pub(super) fn artifact(&self) -> RequirementsArtifact {
        RequirementsArtifact::new(self.dir.path().join("latest_requirements.txt"))
    }

    pub(super) fn engine(&self, settings: PipelineSettings) -> WorkflowEngine {
        WorkflowEngine::new(settings, self.collaborators.clone(), self.artifact())
            .expect("valid settings")
            .with_clock(monday_morning)
    }

    pub(super) fn intake(&self) -> ResumeIntake {
        ResumeIntake::new(
            IntakeSettings::default(),
            self.collaborators.clone(),
            self.artifact(),
        )
        .with_clock(monday_morning)
    }

    pub(super) fn service(&self, settings: PipelineSettings) -> HiringService {
        HiringService::from_parts(self.engine(settings), self.intake(), self.artifact())
    }

    pub(super) fn subjects(&self) -> Vec<String> {
        self.outbox
            .messages()
            .into_iter()
            .map(|message| message.subject)
            .collect()
    }
}

pub(super) fn continue_settings() -> PipelineSettings {
    PipelineSettings {
        post_publish: crate::workflows::hiring::engine::PostPublishPolicy::Continue,
        ..PipelineSettings::default()
    }
}

fn scripted_failure() -> ServiceError {
    ServiceError::unavailable("generator", "no scripted payload")
}

/// Generator answering resume scoring and reply parsing from fixed tables; every other task
/// fails so the deterministic fallbacks apply.
#[derive(Default)]
pub(super) struct ScriptedGenerator {
    resume_scores: HashMap<String, u8>,
    meeting_slots: HashMap<String, String>,
    calls: Mutex<Vec<&'static str>>,
}

impl ScriptedGenerator {
    pub(super) fn score(mut self, resume_text: &str, score: u8) -> Self {
        self.resume_scores.insert(resume_text.to_string(), score);
        self
    }

    pub(super) fn slots(mut self, reply_body: &str, payload: &str) -> Self {
        self.meeting_slots
            .insert(reply_body.to_string(), payload.to_string());
        self
    }

    pub(super) fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().expect("calls mutex poisoned").clone()
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().expect("calls mutex poisoned").push(call);
    }
}

#[async_trait]
impl ContentGenerator for ScriptedGenerator {
    async fn job_posting(&self, _employee: &Employee) -> Result<String, ServiceError> {
        self.record("job_posting");
        Err(scripted_failure())
    }

    async fn rank_candidates(
        &self,
        _candidates: &[Candidate],
        _requirements: &[String],
    ) -> Result<String, ServiceError> {
        self.record("rank_candidates");
        Err(scripted_failure())
    }

    async fn score_resume(
        &self,
        resume_text: &str,
        _requirements: &[String],
    ) -> Result<String, ServiceError> {
        self.record("score_resume");
        match self.resume_scores.get(resume_text) {
            Some(score) => Ok(format!(
                "Here is the evaluation:\n```json\n{{\"score\": {score}, \"matched\": [\"Python\"], \"missing\": []}}\n```"
            )),
            None => Err(scripted_failure()),
        }
    }

    async fn interview_questions(
        &self,
        _candidate: &Candidate,
        _requirements: &[String],
    ) -> Result<String, ServiceError> {
        self.record("interview_questions");
        Err(scripted_failure())
    }

    async fn salary_offer(
        &self,
        _candidate: &Candidate,
        _salary_range: &SalaryRange,
    ) -> Result<String, ServiceError> {
        self.record("salary_offer");
        Err(scripted_failure())
    }

    async fn counter_offer(
        &self,
        _candidate: &Candidate,
        _original_offer: f64,
        _reason: &str,
    ) -> Result<String, ServiceError> {
        self.record("counter_offer");
        Err(scripted_failure())
    }

    async fn meeting_slots(&self, reply_body: &str) -> Result<String, ServiceError> {
        self.record("meeting_slots");
        self.meeting_slots
            .get(reply_body)
            .cloned()
            .ok_or_else(scripted_failure)
    }
}

pub(super) struct FailingCalendar;

#[async_trait]
impl CalendarScheduler for FailingCalendar {
    async fn create_event(&self, _event: &CalendarEvent) -> Result<String, ServiceError> {
        Err(ServiceError::unavailable("calendar", "credentials expired"))
    }
}

pub(super) struct UnreachableInbox;

#[async_trait]
impl ResumeSource for UnreachableInbox {
    async fn fetch_unseen(&self) -> Result<Vec<InboundResume>, ServiceError> {
        Err(ServiceError::unavailable("mailbox", "connection refused"))
    }

    async fn fetch_replies(
        &self,
    ) -> Result<Vec<crate::workflows::hiring::collaborators::InboundReply>, ServiceError> {
        Err(ServiceError::unavailable("mailbox", "connection refused"))
    }
}

/// Board that never returns a post id.
pub(super) struct DecliningJobBoard;

#[async_trait]
impl JobBoardPublisher for DecliningJobBoard {
    async fn publish(&self, _posting: &JobPosting) -> Result<Option<String>, ServiceError> {
        Ok(None)
    }

    async fn fetch_applicants(&self, _post_id: &str) -> Result<Vec<Applicant>, ServiceError> {
        Ok(Vec::new())
    }

    async fn update(&self, _post_id: &str, _patch: &PostingPatch) -> Result<bool, ServiceError> {
        Ok(false)
    }
}

/// Approval gate that never approves.
pub(super) struct NeverApprove;

impl ApprovalGate for NeverApprove {
    fn review(&self, _posting: &JobPosting) -> ApprovalOutcome {
        ApprovalOutcome::Wait
    }
}

/// Board whose first applicant fetches fail before it starts answering like the mock board.
pub(super) struct FlakyApplicantBoard {
    pub(super) inner: MockJobBoard,
    pub(super) failures_left: Mutex<u32>,
}

#[async_trait]
impl JobBoardPublisher for FlakyApplicantBoard {
    async fn publish(&self, posting: &JobPosting) -> Result<Option<String>, ServiceError> {
        self.inner.publish(posting).await
    }

    async fn fetch_applicants(&self, post_id: &str) -> Result<Vec<Applicant>, ServiceError> {
        {
            let mut failures = self.failures_left.lock().expect("board mutex poisoned");
            if *failures > 0 {
                *failures -= 1;
                return Err(ServiceError::unavailable("job board", "gateway timeout"));
            }
        }
        self.inner.fetch_applicants(post_id).await
    }

    async fn update(&self, post_id: &str, patch: &PostingPatch) -> Result<bool, ServiceError> {
        self.inner.update(post_id, patch).await
    }
}
