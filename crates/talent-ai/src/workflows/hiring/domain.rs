use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for job postings created by a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PostingId(pub String);

/// Identifier wrapper for candidates returned by the job board.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CandidateId(pub String);

/// The departing employee whose role is being back-filled. Never mutated by a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: String,
    pub name: String,
    pub position: String,
    pub department: String,
    pub salary: f64,
    #[serde(default)]
    pub last_working_day: Option<NaiveDate>,
    #[serde(default)]
    pub reason_for_leaving: String,
    #[serde(default)]
    pub office_location: Option<String>,
}

impl Employee {
    /// Posting location for the replacement role.
    pub fn location(&self) -> &str {
        self.office_location
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(DEFAULT_LOCATION)
    }
}

pub const DEFAULT_LOCATION: &str = "Remote";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SalaryRange {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Draft,
    PendingApproval,
    Posted,
    Modified,
    Closed,
}

impl JobStatus {
    pub const fn label(self) -> &'static str {
        match self {
            JobStatus::Draft => "draft",
            JobStatus::PendingApproval => "pending_approval",
            JobStatus::Posted => "posted",
            JobStatus::Modified => "modified",
            JobStatus::Closed => "closed",
        }
    }

    /// Whether the posting is live on the job board.
    pub const fn is_live(self) -> bool {
        matches!(self, JobStatus::Posted | JobStatus::Modified)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: PostingId,
    pub title: String,
    pub department: String,
    pub description: String,
    pub requirements: Vec<String>,
    pub salary_range: SalaryRange,
    pub location: String,
    pub status: JobStatus,
    pub applicant_count: usize,
    pub external_post_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub posted_at: Option<DateTime<Utc>>,
}

/// Fields pushed to the job board when a live posting is regenerated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostingPatch {
    pub title: String,
    pub description: String,
}

/// Raw applicant payload as returned by the job board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Applicant {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default, alias = "resume_url")]
    pub resume_ref: String,
    #[serde(default)]
    pub experience_years: u32,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub current_salary: Option<f64>,
    #[serde(default)]
    pub expected_salary: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateStatus {
    Applied,
    Selected,
    Interviewed,
    Offered,
    Accepted,
    Rejected,
    CounterOffered,
}

impl CandidateStatus {
    pub const fn label(self) -> &'static str {
        match self {
            CandidateStatus::Applied => "applied",
            CandidateStatus::Selected => "selected",
            CandidateStatus::Interviewed => "interviewed",
            CandidateStatus::Offered => "offered",
            CandidateStatus::Accepted => "accepted",
            CandidateStatus::Rejected => "rejected",
            CandidateStatus::CounterOffered => "counter_offered",
        }
    }
}

/// A candidate's answer to an outstanding offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferResponse {
    Accept,
    Reject,
    Counter,
}

/// Recorded outcome of the offer negotiation for a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferStatus {
    Pending,
    Accepted,
    Rejected,
    CounterOffered,
    Withdrawn,
    NegotiationExhausted,
}

impl OfferStatus {
    pub const fn label(self) -> &'static str {
        match self {
            OfferStatus::Pending => "pending",
            OfferStatus::Accepted => "accepted",
            OfferStatus::Rejected => "rejected",
            OfferStatus::CounterOffered => "counter_offered",
            OfferStatus::Withdrawn => "withdrawn",
            OfferStatus::NegotiationExhausted => "negotiation_exhausted",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub resume_ref: String,
    pub experience_years: u32,
    pub skills: BTreeSet<String>,
    pub current_salary: Option<f64>,
    pub expected_salary: Option<f64>,
    pub status: CandidateStatus,
    pub applied_at: DateTime<Utc>,
    pub interview_at: Option<NaiveDateTime>,
    pub interview_questions: Vec<String>,
    pub interview_feedback: Option<String>,
    pub offer_amount: Option<f64>,
    pub offer_status: Option<OfferStatus>,
    /// Offers extended so far, the initial offer included.
    pub offer_rounds: u32,
}

impl Candidate {
    pub fn from_applicant(applicant: Applicant, applied_at: DateTime<Utc>) -> Self {
        let skills = applicant
            .skills
            .into_iter()
            .map(|skill| skill.trim().to_string())
            .filter(|skill| !skill.is_empty())
            .collect();

        Self {
            id: CandidateId(applicant.id),
            name: applicant.name,
            email: applicant.email,
            phone: applicant.phone,
            resume_ref: applicant.resume_ref,
            experience_years: applicant.experience_years,
            skills,
            current_salary: applicant.current_salary,
            expected_salary: applicant.expected_salary,
            status: CandidateStatus::Applied,
            applied_at,
            interview_at: None,
            interview_questions: Vec::new(),
            interview_feedback: None,
            offer_amount: None,
            offer_status: None,
            offer_rounds: 0,
        }
    }

    /// Distinct skills, compared case-insensitively.
    pub fn distinct_skill_count(&self) -> usize {
        self.skills
            .iter()
            .map(|skill| skill.to_ascii_lowercase())
            .collect::<BTreeSet<_>>()
            .len()
    }
}
