//! Employee-replacement hiring: posting generation, approval, publication, applicant ranking,
//! interviews, offer negotiation and rejections, plus the independently scheduled resume intake.
//!
//! External systems sit behind the async traits in [`collaborators`]. Generator output is
//! always parsed tolerantly and replaced by deterministic fallbacks when unusable, so a run
//! degrades instead of failing.

pub mod adapters;
pub mod collaborators;
pub mod domain;
pub mod engine;
pub mod error;
pub mod generation;
pub mod intake;
pub mod interviews;
pub mod notifications;
pub mod ranking;
pub mod report;
pub mod requirements;
pub mod roster;
pub mod router;
pub mod scheduling;
pub mod scoring;
pub mod service;
pub mod state;

#[cfg(test)]
mod tests;

pub use collaborators::{
    ApprovalGate, AutoApprove, CalendarScheduler, ContentGenerator, HiringCollaborators,
    JobBoardPublisher, Notifier, OfferDecisionSource, ResumeSource, ServiceError,
};
pub use domain::{
    Applicant, Candidate, CandidateId, CandidateStatus, Employee, JobPosting, JobStatus,
    OfferResponse, OfferStatus, PostingId, SalaryRange,
};
pub use engine::{PipelineSettings, PostPublishPolicy, Step, WorkflowEngine};
pub use error::PipelineError;
pub use intake::{IntakeReport, IntakeScheduler, IntakeSchedulerHandle, IntakeSettings, ResumeIntake};
pub use report::{render_ats_summary, render_pipeline_summary, PipelineRunSummary};
pub use requirements::{RequirementsArtifact, RequirementsSource};
pub use roster::{EmployeeRoster, RosterError};
pub use router::hiring_router;
pub use service::{HiringService, HiringServiceError};
pub use state::{Milestone, PipelineState};
