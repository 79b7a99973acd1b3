//! Router functions deciding the conditional edges of the step graph.

use serde::{Deserialize, Serialize};

use crate::workflows::hiring::collaborators::ApprovalGate;
use crate::workflows::hiring::domain::CandidateStatus;
use crate::workflows::hiring::state::PipelineState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalOutcome {
    /// Proceed to publishing.
    Skip,
    /// Re-enter the approval step.
    Wait,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    Continue,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicantOutcome {
    Modify,
    Continue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferOutcome {
    Counter,
    Complete,
}

/// What happens after a posting goes live.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostPublishPolicy {
    /// End the run once the posting is live.
    #[default]
    Stop,
    /// Carry on with applicant intake, interviews and offers.
    Continue,
}

impl PostPublishPolicy {
    pub const fn label(self) -> &'static str {
        match self {
            PostPublishPolicy::Stop => "stop",
            PostPublishPolicy::Continue => "continue",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "stop" | "end" => Some(PostPublishPolicy::Stop),
            "continue" => Some(PostPublishPolicy::Continue),
            _ => None,
        }
    }
}

/// Without a posting there is nothing to wait on; the publish step records that instead.
pub fn route_approval(gate: &dyn ApprovalGate, state: &PipelineState) -> ApprovalOutcome {
    match &state.job_posting {
        Some(posting) => gate.review(posting),
        None => ApprovalOutcome::Skip,
    }
}

/// A posting that did not go live always ends the run.
pub fn route_after_publish(state: &PipelineState, policy: PostPublishPolicy) -> PublishOutcome {
    let live = state
        .job_posting
        .as_ref()
        .is_some_and(|posting| posting.status.is_live() && posting.external_post_id.is_some());

    match (live, policy) {
        (false, _) => PublishOutcome::End,
        (true, PostPublishPolicy::Stop) => PublishOutcome::End,
        (true, PostPublishPolicy::Continue) => PublishOutcome::Continue,
    }
}

/// Modify while the applicant count is under `min_applicants` and rounds remain.
pub fn route_applicants(
    state: &PipelineState,
    min_applicants: usize,
    modify_rounds_left: bool,
) -> ApplicantOutcome {
    match &state.job_posting {
        Some(posting) if posting.applicant_count < min_applicants && modify_rounds_left => {
            ApplicantOutcome::Modify
        }
        _ => ApplicantOutcome::Continue,
    }
}

pub fn route_offer_responses(state: &PipelineState) -> OfferOutcome {
    let countering = state
        .selected_candidates()
        .iter()
        .any(|candidate| candidate.status == CandidateStatus::CounterOffered);

    if countering {
        OfferOutcome::Counter
    } else {
        OfferOutcome::Complete
    }
}
