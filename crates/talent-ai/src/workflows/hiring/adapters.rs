//! Offline collaborator implementations.
//!
//! These back the CLI's mock mode and the test suites: nothing leaves the process except the
//! directory-backed resume source, which reads JSON drops from a local inbox folder.

use std::collections::{HashMap, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use super::collaborators::{
    CalendarEvent, CalendarScheduler, ContentGenerator, InboundReply, InboundResume,
    JobBoardPublisher, Notifier, OfferDecisionSource, OutboundMessage, ResumeSource, ServiceError,
};
use super::domain::{
    Applicant, Candidate, Employee, JobPosting, OfferResponse, PostingPatch, SalaryRange,
};

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Generator that is never reachable, so every task resolves to its deterministic fallback.
#[derive(Debug, Default, Clone, Copy)]
pub struct FallbackOnlyGenerator;

impl FallbackOnlyGenerator {
    fn offline() -> ServiceError {
        ServiceError::unavailable("generator", "offline mode")
    }
}

#[async_trait]
impl ContentGenerator for FallbackOnlyGenerator {
    async fn job_posting(&self, _employee: &Employee) -> Result<String, ServiceError> {
        Err(Self::offline())
    }

    async fn rank_candidates(
        &self,
        _candidates: &[Candidate],
        _requirements: &[String],
    ) -> Result<String, ServiceError> {
        Err(Self::offline())
    }

    async fn score_resume(
        &self,
        _resume_text: &str,
        _requirements: &[String],
    ) -> Result<String, ServiceError> {
        Err(Self::offline())
    }

    async fn interview_questions(
        &self,
        _candidate: &Candidate,
        _requirements: &[String],
    ) -> Result<String, ServiceError> {
        Err(Self::offline())
    }

    async fn salary_offer(
        &self,
        _candidate: &Candidate,
        _salary_range: &SalaryRange,
    ) -> Result<String, ServiceError> {
        Err(Self::offline())
    }

    async fn counter_offer(
        &self,
        _candidate: &Candidate,
        _original_offer: f64,
        _reason: &str,
    ) -> Result<String, ServiceError> {
        Err(Self::offline())
    }

    async fn meeting_slots(&self, _reply_body: &str) -> Result<String, ServiceError> {
        Err(Self::offline())
    }
}

/// Job board that accepts every posting and serves a fixed applicant list.
#[derive(Debug, Default)]
pub struct MockJobBoard {
    applicants: Vec<Applicant>,
    sequence: AtomicU64,
    published: Mutex<Vec<JobPosting>>,
    updates: Mutex<Vec<(String, PostingPatch)>>,
}

impl MockJobBoard {
    pub fn with_applicants(applicants: Vec<Applicant>) -> Self {
        Self {
            applicants,
            ..Self::default()
        }
    }

    pub fn published(&self) -> Vec<JobPosting> {
        locked(&self.published).clone()
    }

    pub fn updates(&self) -> Vec<(String, PostingPatch)> {
        locked(&self.updates).clone()
    }
}

#[async_trait]
impl JobBoardPublisher for MockJobBoard {
    async fn publish(&self, posting: &JobPosting) -> Result<Option<String>, ServiceError> {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let post_id = format!("mock-post-{id:04}");
        info!(post_id = %post_id, title = %posting.title, "mock job board accepted posting");
        locked(&self.published).push(posting.clone());
        Ok(Some(post_id))
    }

    async fn fetch_applicants(&self, _post_id: &str) -> Result<Vec<Applicant>, ServiceError> {
        Ok(self.applicants.clone())
    }

    async fn update(&self, post_id: &str, patch: &PostingPatch) -> Result<bool, ServiceError> {
        locked(&self.updates).push((post_id.to_string(), patch.clone()));
        Ok(true)
    }
}

/// Notifier that keeps every message in memory instead of sending it.
#[derive(Debug, Default)]
pub struct OutboxNotifier {
    outbox: Mutex<Vec<OutboundMessage>>,
}

impl OutboxNotifier {
    pub fn messages(&self) -> Vec<OutboundMessage> {
        locked(&self.outbox).clone()
    }
}

#[async_trait]
impl Notifier for OutboxNotifier {
    async fn send(&self, message: &OutboundMessage) -> Result<bool, ServiceError> {
        info!(to = %message.to, subject = %message.subject, "message queued in outbox");
        locked(&self.outbox).push(message.clone());
        Ok(true)
    }
}

/// Calendar that books every event and hands out local links.
#[derive(Debug, Default)]
pub struct LinkCalendar {
    sequence: AtomicU64,
    events: Mutex<Vec<CalendarEvent>>,
}

impl LinkCalendar {
    pub fn events(&self) -> Vec<CalendarEvent> {
        locked(&self.events).clone()
    }
}

#[async_trait]
impl CalendarScheduler for LinkCalendar {
    async fn create_event(&self, event: &CalendarEvent) -> Result<String, ServiceError> {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        locked(&self.events).push(event.clone());
        Ok(format!("https://calendar.local/events/{id:04}"))
    }
}

/// Resume and reply queues drained on fetch.
#[derive(Debug, Default)]
pub struct InMemoryResumeSource {
    resumes: Mutex<VecDeque<InboundResume>>,
    replies: Mutex<VecDeque<InboundReply>>,
}

impl InMemoryResumeSource {
    pub fn push_resume(&self, resume: InboundResume) {
        locked(&self.resumes).push_back(resume);
    }

    pub fn push_reply(&self, reply: InboundReply) {
        locked(&self.replies).push_back(reply);
    }
}

#[async_trait]
impl ResumeSource for InMemoryResumeSource {
    async fn fetch_unseen(&self) -> Result<Vec<InboundResume>, ServiceError> {
        Ok(locked(&self.resumes).drain(..).collect())
    }

    async fn fetch_replies(&self) -> Result<Vec<InboundReply>, ServiceError> {
        Ok(locked(&self.replies).drain(..).collect())
    }
}

/// Inbox folder of JSON drops: resumes at the top level, replies under `replies/`. Files are
/// moved into a `seen/` folder next to them once read, so each is returned exactly once.
#[derive(Debug, Clone)]
pub struct DirectoryResumeSource {
    inbox: PathBuf,
}

impl DirectoryResumeSource {
    pub fn new(inbox: impl Into<PathBuf>) -> Self {
        Self {
            inbox: inbox.into(),
        }
    }

    fn drain<T: DeserializeOwned>(dir: &Path) -> Result<Vec<T>, ServiceError> {
        let unavailable = |err: std::io::Error| {
            ServiceError::unavailable("resume inbox", format!("{}: {err}", dir.display()))
        };

        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut paths: Vec<PathBuf> = fs::read_dir(dir)
            .map_err(unavailable)?
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        let seen = dir.join("seen");
        fs::create_dir_all(&seen).map_err(unavailable)?;

        let mut items = Vec::with_capacity(paths.len());
        for path in paths {
            let Some(name) = path.file_name() else {
                continue;
            };
            let parsed = fs::read_to_string(&path)
                .map_err(|err| err.to_string())
                .and_then(|raw| serde_json::from_str::<T>(&raw).map_err(|err| err.to_string()));

            // A drop that cannot be moved stays in the inbox and is read again next tick.
            if let Err(err) = fs::rename(&path, seen.join(name)) {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "could not mark inbox file seen; leaving it for the next tick"
                );
                continue;
            }

            match parsed {
                Ok(item) => items.push(item),
                Err(err) => warn!(path = %path.display(), error = %err, "skipping unreadable inbox file"),
            }
        }
        Ok(items)
    }

    async fn drain_off_runtime<T>(dir: PathBuf) -> Result<Vec<T>, ServiceError>
    where
        T: DeserializeOwned + Send + 'static,
    {
        tokio::task::spawn_blocking(move || Self::drain(&dir))
            .await
            .map_err(|err| {
                ServiceError::unavailable("resume inbox", format!("inbox reader stopped: {err}"))
            })?
    }
}

#[async_trait]
impl ResumeSource for DirectoryResumeSource {
    async fn fetch_unseen(&self) -> Result<Vec<InboundResume>, ServiceError> {
        Self::drain_off_runtime(self.inbox.clone()).await
    }

    async fn fetch_replies(&self) -> Result<Vec<InboundReply>, ServiceError> {
        Self::drain_off_runtime(self.inbox.join("replies")).await
    }
}

/// Offer answers played back from a script. Candidates without a script, or whose script ran
/// out, get the fallback response.
#[derive(Debug)]
pub struct ScriptedOfferDecisions {
    fallback: OfferResponse,
    scripts: Mutex<HashMap<String, VecDeque<OfferResponse>>>,
}

impl ScriptedOfferDecisions {
    pub fn always(response: OfferResponse) -> Self {
        Self {
            fallback: response,
            scripts: Mutex::new(HashMap::new()),
        }
    }

    pub fn script(self, candidate_id: impl Into<String>, responses: Vec<OfferResponse>) -> Self {
        locked(&self.scripts).insert(candidate_id.into(), responses.into());
        self
    }
}

impl Default for ScriptedOfferDecisions {
    fn default() -> Self {
        Self::always(OfferResponse::Accept)
    }
}

#[async_trait]
impl OfferDecisionSource for ScriptedOfferDecisions {
    async fn respond(&self, candidate: &Candidate) -> Result<OfferResponse, ServiceError> {
        let scripted = locked(&self.scripts)
            .get_mut(&candidate.id.0)
            .and_then(VecDeque::pop_front);
        Ok(scripted.unwrap_or(self.fallback))
    }
}
