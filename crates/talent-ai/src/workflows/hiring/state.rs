use serde::Serialize;

use super::domain::{Candidate, CandidateId, Employee, JobPosting};

/// Marker recorded in `current_step` after each step completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Milestone {
    Start,
    JobPostingGenerated,
    AwaitingApproval,
    JobPosted,
    PostFailed,
    NoJobToPost,
    ApplicantsChecked,
    JobModified,
    CandidatesSelected,
    InterviewsScheduled,
    InterviewsCompleted,
    OffersMade,
    ResponsesHandled,
    RejectionsSent,
    Halted,
}

impl Milestone {
    pub const fn label(self) -> &'static str {
        match self {
            Milestone::Start => "start",
            Milestone::JobPostingGenerated => "job_posting_generated",
            Milestone::AwaitingApproval => "awaiting_approval",
            Milestone::JobPosted => "job_posted",
            Milestone::PostFailed => "post_failed",
            Milestone::NoJobToPost => "no_job_to_post",
            Milestone::ApplicantsChecked => "applicants_checked",
            Milestone::JobModified => "job_modified",
            Milestone::CandidatesSelected => "candidates_selected",
            Milestone::InterviewsScheduled => "interviews_scheduled",
            Milestone::InterviewsCompleted => "interviews_completed",
            Milestone::OffersMade => "offers_made",
            Milestone::ResponsesHandled => "responses_handled",
            Milestone::RejectionsSent => "rejections_sent",
            Milestone::Halted => "halted",
        }
    }
}

/// Running count of outbound notifications attempted during a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NotificationTally {
    pub sent: usize,
    pub failed: usize,
}

impl NotificationTally {
    pub fn record(&mut self, delivered: bool) {
        if delivered {
            self.sent += 1;
        } else {
            self.failed += 1;
        }
    }

    pub fn total(&self) -> usize {
        self.sent + self.failed
    }
}

/// One field set a step may write. Variants not present in an update leave state untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum StatePatch {
    JobPosting(JobPosting),
    /// Replaces the candidate list wholesale and clears any prior selection.
    Candidates(Vec<Candidate>),
    /// Replaces candidates with matching ids; unknown ids are ignored.
    CandidateChanges(Vec<Candidate>),
    Selection(Vec<CandidateId>),
    Error(String),
    ClearError,
    Notifications(NotificationTally),
    Completed,
}

/// Partial update returned by a step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepUpdate {
    pub milestone: Option<Milestone>,
    pub patches: Vec<StatePatch>,
}

impl StepUpdate {
    pub fn at(milestone: Milestone) -> Self {
        Self {
            milestone: Some(milestone),
            patches: Vec::new(),
        }
    }

    /// An update that only records a missing precondition.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            milestone: None,
            patches: vec![StatePatch::Error(message.into())],
        }
    }

    pub fn with(mut self, patch: StatePatch) -> Self {
        self.patches.push(patch);
        self
    }
}

/// Aggregate threaded through one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineState {
    pub employee: Option<Employee>,
    pub job_posting: Option<JobPosting>,
    pub candidates: Vec<Candidate>,
    selected: Vec<CandidateId>,
    pub current_step: Milestone,
    pub error_message: Option<String>,
    pub completed: bool,
    pub notifications: NotificationTally,
}

impl PipelineState {
    pub fn new(employee: Employee) -> Self {
        Self {
            employee: Some(employee),
            ..Self::empty()
        }
    }

    pub fn empty() -> Self {
        Self {
            employee: None,
            job_posting: None,
            candidates: Vec::new(),
            selected: Vec::new(),
            current_step: Milestone::Start,
            error_message: None,
            completed: false,
            notifications: NotificationTally::default(),
        }
    }

    /// Merge a step's partial update into the aggregate.
    pub fn apply(&mut self, update: StepUpdate) {
        if let Some(milestone) = update.milestone {
            self.current_step = milestone;
        }

        for patch in update.patches {
            match patch {
                StatePatch::JobPosting(posting) => self.job_posting = Some(posting),
                StatePatch::Candidates(candidates) => {
                    self.candidates = candidates;
                    self.selected.clear();
                }
                StatePatch::CandidateChanges(changes) => {
                    for changed in changes {
                        if let Some(existing) = self
                            .candidates
                            .iter_mut()
                            .find(|candidate| candidate.id == changed.id)
                        {
                            *existing = changed;
                        }
                    }
                }
                StatePatch::Selection(ids) => {
                    let mut selected = Vec::with_capacity(ids.len());
                    for id in ids {
                        let known = self.candidates.iter().any(|candidate| candidate.id == id);
                        if known && !selected.contains(&id) {
                            selected.push(id);
                        }
                    }
                    self.selected = selected;
                }
                StatePatch::Error(message) => self.error_message = Some(message),
                StatePatch::ClearError => self.error_message = None,
                StatePatch::Notifications(tally) => {
                    self.notifications.sent += tally.sent;
                    self.notifications.failed += tally.failed;
                }
                StatePatch::Completed => self.completed = true,
            }
        }
    }

    /// Selected candidates in selection order.
    pub fn selected_candidates(&self) -> Vec<&Candidate> {
        self.selected
            .iter()
            .filter_map(|id| self.candidate(id))
            .collect()
    }

    pub fn selected_ids(&self) -> &[CandidateId] {
        &self.selected
    }

    pub fn is_selected(&self, id: &CandidateId) -> bool {
        self.selected.contains(id)
    }

    pub fn candidate(&self, id: &CandidateId) -> Option<&Candidate> {
        self.candidates.iter().find(|candidate| &candidate.id == id)
    }
}
