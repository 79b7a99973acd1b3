//! Contracts the orchestration core requires of its external collaborators.
//!
//! Generator methods return the raw text payload; parsing and fallback substitution
//! live in [`super::generation`] so every adapter gets the same tolerance rules.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::domain::{
    Applicant, Candidate, Employee, JobPosting, OfferResponse, PostingPatch, SalaryRange,
};
use super::engine::ApprovalOutcome;

/// Failure reported by (or on behalf of) an external collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    #[error("{service} unavailable: {detail}")]
    Unavailable {
        service: &'static str,
        detail: String,
    },
    #[error("{service} rejected the request: {detail}")]
    Rejected {
        service: &'static str,
        detail: String,
    },
    #[error("{operation} timed out after {after:?}")]
    TimedOut {
        operation: &'static str,
        after: Duration,
    },
}

impl ServiceError {
    pub fn unavailable(service: &'static str, detail: impl Into<String>) -> Self {
        Self::Unavailable {
            service,
            detail: detail.into(),
        }
    }

    pub fn rejected(service: &'static str, detail: impl Into<String>) -> Self {
        Self::Rejected {
            service,
            detail: detail.into(),
        }
    }
}

/// Await an external call, converting an elapsed deadline into [`ServiceError::TimedOut`].
pub async fn bounded<T, F>(operation: &'static str, after: Duration, call: F) -> Result<T, ServiceError>
where
    F: Future<Output = Result<T, ServiceError>>,
{
    match tokio::time::timeout(after, call).await {
        Ok(result) => result,
        Err(_) => Err(ServiceError::TimedOut { operation, after }),
    }
}

#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn job_posting(&self, employee: &Employee) -> Result<String, ServiceError>;

    async fn rank_candidates(
        &self,
        candidates: &[Candidate],
        requirements: &[String],
    ) -> Result<String, ServiceError>;

    async fn score_resume(
        &self,
        resume_text: &str,
        requirements: &[String],
    ) -> Result<String, ServiceError>;

    async fn interview_questions(
        &self,
        candidate: &Candidate,
        requirements: &[String],
    ) -> Result<String, ServiceError>;

    async fn salary_offer(
        &self,
        candidate: &Candidate,
        salary_range: &SalaryRange,
    ) -> Result<String, ServiceError>;

    async fn counter_offer(
        &self,
        candidate: &Candidate,
        original_offer: f64,
        reason: &str,
    ) -> Result<String, ServiceError>;

    /// Candidate time expressions found in a free-text reply.
    async fn meeting_slots(&self, reply_body: &str) -> Result<String, ServiceError>;
}

#[async_trait]
pub trait JobBoardPublisher: Send + Sync {
    /// Publish a posting, returning the board's post id or `None` when the board declined it.
    async fn publish(&self, posting: &JobPosting) -> Result<Option<String>, ServiceError>;

    async fn fetch_applicants(&self, post_id: &str) -> Result<Vec<Applicant>, ServiceError>;

    async fn update(&self, post_id: &str, patch: &PostingPatch) -> Result<bool, ServiceError>;
}

/// A rendered message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &OutboundMessage) -> Result<bool, ServiceError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub summary: String,
    pub description: String,
    pub start: NaiveDateTime,
    pub attendees: Vec<String>,
    pub duration_minutes: u32,
}

#[async_trait]
pub trait CalendarScheduler: Send + Sync {
    /// Create the event and return a link attendees can open.
    async fn create_event(&self, event: &CalendarEvent) -> Result<String, ServiceError>;
}

/// A resume pulled from the inbound channel, text already extracted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundResume {
    pub from_address: String,
    #[serde(default)]
    pub subject: String,
    pub filename: String,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundReply {
    pub from_address: String,
    #[serde(default)]
    pub subject: String,
    pub body: String,
}

/// Inbound resume channel. Items are marked seen when fetched and never returned twice.
#[async_trait]
pub trait ResumeSource: Send + Sync {
    async fn fetch_unseen(&self) -> Result<Vec<InboundResume>, ServiceError>;

    async fn fetch_replies(&self) -> Result<Vec<InboundReply>, ServiceError>;
}

/// Where candidate answers to outstanding offers come from.
#[async_trait]
pub trait OfferDecisionSource: Send + Sync {
    async fn respond(&self, candidate: &Candidate) -> Result<OfferResponse, ServiceError>;
}

/// Human-in-the-loop hook consulted before a posting is published.
pub trait ApprovalGate: Send + Sync {
    fn review(&self, posting: &JobPosting) -> ApprovalOutcome;
}

/// Approves every posting without waiting.
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoApprove;

impl ApprovalGate for AutoApprove {
    fn review(&self, _posting: &JobPosting) -> ApprovalOutcome {
        ApprovalOutcome::Skip
    }
}

/// Every collaborator a hiring deployment is wired with.
#[derive(Clone)]
pub struct HiringCollaborators {
    pub generator: Arc<dyn ContentGenerator>,
    pub job_board: Arc<dyn JobBoardPublisher>,
    pub notifier: Arc<dyn Notifier>,
    pub calendar: Arc<dyn CalendarScheduler>,
    pub resumes: Arc<dyn ResumeSource>,
    pub offer_decisions: Arc<dyn OfferDecisionSource>,
    pub approval: Arc<dyn ApprovalGate>,
}
