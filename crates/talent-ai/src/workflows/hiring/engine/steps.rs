use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use tracing::{error, info, warn};

use super::WorkflowEngine;
use crate::workflows::hiring::collaborators::{bounded, OutboundMessage, ServiceError};
use crate::workflows::hiring::domain::{
    Candidate, CandidateStatus, Employee, JobPosting, JobStatus, OfferResponse, OfferStatus,
    PostingId, PostingPatch,
};
use crate::workflows::hiring::error::PipelineError;
use crate::workflows::hiring::generation::{self, GeneratedExt, JobDraft};
use crate::workflows::hiring::interviews::deliver;
use crate::workflows::hiring::notifications::{self, Recipient};
use crate::workflows::hiring::ranking::RankingPolicy;
use crate::workflows::hiring::state::{
    Milestone, NotificationTally, PipelineState, StatePatch, StepUpdate,
};

static POSTING_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_posting_id() -> PostingId {
    let id = POSTING_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    PostingId(format!("posting-{id:06}"))
}

fn missing(what: &'static str) -> StepUpdate {
    StepUpdate::error(PipelineError::MissingInput(what).to_string())
}

fn recipient(candidate: &Candidate) -> Recipient<'_> {
    Recipient {
        name: &candidate.name,
        email: &candidate.email,
    }
}

const COUNTER_REASON: &str = "Candidate requested a higher offer";

/// Operation name of the applicant fetch; a later successful fetch clears its failure.
const FETCH_APPLICANTS: &str = "fetch applicants";

impl WorkflowEngine {
    async fn draft_posting(&self, employee: &Employee) -> JobDraft {
        let raw = bounded(
            "generator.job_posting",
            self.settings.call_timeout,
            self.collaborators.generator.job_posting(employee),
        )
        .await;
        generation::job_posting(raw, employee).settle("generate_job_posting")
    }

    fn persist_requirements(&self, requirements: &[String]) {
        if let Err(err) = self.requirements.write(requirements) {
            warn!(error = %err, "could not persist requirements artifact");
        }
    }

    async fn notify(&self, message: OutboundMessage, tally: &mut NotificationTally) {
        let delivered = deliver(
            self.collaborators.notifier.as_ref(),
            &message,
            self.settings.call_timeout,
        )
        .await;
        tally.record(delivered);
    }

    pub(super) async fn generate_job_posting(&self, state: &PipelineState) -> StepUpdate {
        let Some(employee) = &state.employee else {
            return missing("No employee data provided");
        };

        let draft = self.draft_posting(employee).await;
        let posting = JobPosting {
            id: next_posting_id(),
            title: draft.title,
            department: employee.department.clone(),
            description: draft.description,
            requirements: draft.requirements,
            salary_range: draft.salary_range,
            location: employee.location().to_string(),
            status: JobStatus::Draft,
            applicant_count: 0,
            external_post_id: None,
            created_at: Utc::now(),
            posted_at: None,
        };
        self.persist_requirements(&posting.requirements);

        info!(
            posting_id = %posting.id.0,
            title = %posting.title,
            requirements = posting.requirements.len(),
            "job posting generated"
        );
        StepUpdate::at(Milestone::JobPostingGenerated).with(StatePatch::JobPosting(posting))
    }

    pub(super) async fn request_human_approval(
        &self,
        state: &PipelineState,
        first_visit: bool,
    ) -> StepUpdate {
        let Some(posting) = &state.job_posting else {
            return missing("No job posting to approve");
        };

        let mut posting = posting.clone();
        posting.status = JobStatus::PendingApproval;

        let mut tally = NotificationTally::default();
        if first_visit {
            if let Some(approver) = &self.settings.approval_recipient {
                self.notify(notifications::approval_request(approver, &posting), &mut tally)
                    .await;
            }
        }

        StepUpdate::at(Milestone::AwaitingApproval)
            .with(StatePatch::JobPosting(posting))
            .with(StatePatch::Notifications(tally))
    }

    pub(super) async fn post_job(&self, state: &PipelineState) -> StepUpdate {
        let Some(posting) = &state.job_posting else {
            return StepUpdate::at(Milestone::NoJobToPost);
        };

        let published = bounded(
            "job_board.publish",
            self.settings.call_timeout,
            self.collaborators.job_board.publish(posting),
        )
        .await;

        let failure = match published {
            Ok(Some(post_id)) => {
                let mut posting = posting.clone();
                posting.status = JobStatus::Posted;
                posting.external_post_id = Some(post_id);
                posting.posted_at = Some(Utc::now());
                info!(
                    posting_id = %posting.id.0,
                    post_id = posting.external_post_id.as_deref(),
                    "job posting published"
                );
                return StepUpdate::at(Milestone::JobPosted).with(StatePatch::JobPosting(posting));
            }
            Ok(None) => PipelineError::external(
                "publish job posting",
                ServiceError::rejected("job board", "no post id returned"),
            ),
            Err(err) => PipelineError::external("publish job posting", err),
        };

        error!(posting_id = %posting.id.0, error = %failure, "job posting was not published");
        StepUpdate::at(Milestone::PostFailed).with(StatePatch::Error(failure.to_string()))
    }

    pub(super) async fn check_applicants(&self, state: &PipelineState) -> StepUpdate {
        let live = state.job_posting.as_ref().and_then(|posting| {
            posting
                .external_post_id
                .as_deref()
                .map(|post_id| (posting, post_id))
        });
        let Some((posting, post_id)) = live else {
            return missing("No job posting to check applicants for");
        };

        let fetched = bounded(
            "job_board.fetch_applicants",
            self.settings.call_timeout,
            self.collaborators.job_board.fetch_applicants(post_id),
        )
        .await;

        match fetched {
            Ok(applicants) => {
                let applied_at = Utc::now();
                let candidates: Vec<Candidate> = applicants
                    .into_iter()
                    .map(|applicant| Candidate::from_applicant(applicant, applied_at))
                    .collect();

                let mut posting = posting.clone();
                posting.applicant_count = candidates.len();
                info!(applicants = candidates.len(), post_id, "applicants checked");

                let update = StepUpdate::at(Milestone::ApplicantsChecked)
                    .with(StatePatch::JobPosting(posting))
                    .with(StatePatch::Candidates(candidates));
                let stale_failure = state
                    .error_message
                    .as_deref()
                    .is_some_and(|message| message.starts_with(FETCH_APPLICANTS));
                if stale_failure {
                    update.with(StatePatch::ClearError)
                } else {
                    update
                }
            }
            Err(err) => {
                let failure = PipelineError::external(FETCH_APPLICANTS, err);
                warn!(error = %failure, "keeping previously collected applicants");
                StepUpdate::at(Milestone::ApplicantsChecked)
                    .with(StatePatch::Error(failure.to_string()))
            }
        }
    }

    pub(super) async fn modify_job_posting(&self, state: &PipelineState) -> StepUpdate {
        let Some(posting) = &state.job_posting else {
            return missing("No job posting to modify");
        };
        let Some(employee) = &state.employee else {
            return missing("No employee data provided");
        };

        let draft = self.draft_posting(employee).await;
        let mut posting = posting.clone();
        posting.title = draft.title;
        posting.description = draft.description;
        posting.requirements = draft.requirements;
        posting.salary_range = draft.salary_range;
        posting.status = JobStatus::Modified;
        self.persist_requirements(&posting.requirements);

        if let Some(post_id) = posting.external_post_id.as_deref() {
            let patch = PostingPatch {
                title: posting.title.clone(),
                description: posting.description.clone(),
            };
            let updated = bounded(
                "job_board.update",
                self.settings.call_timeout,
                self.collaborators.job_board.update(post_id, &patch),
            )
            .await;
            match updated {
                Ok(true) => info!(post_id, "live posting updated"),
                Ok(false) => warn!(post_id, "job board did not accept the posting update"),
                Err(err) => warn!(post_id, error = %err, "posting update failed"),
            }
        }

        StepUpdate::at(Milestone::JobModified).with(StatePatch::JobPosting(posting))
    }

    pub(super) async fn select_top_candidates(&self, state: &PipelineState) -> StepUpdate {
        let Some(posting) = state
            .job_posting
            .as_ref()
            .filter(|_| !state.candidates.is_empty())
        else {
            return missing("No candidates or job posting");
        };

        let raw = bounded(
            "generator.rank_candidates",
            self.settings.call_timeout,
            self.collaborators
                .generator
                .rank_candidates(&state.candidates, &posting.requirements),
        )
        .await;
        let rankings =
            generation::candidate_rankings(raw, &state.candidates).settle("rank_candidates");

        let scored = RankingPolicy::candidate_scores(&state.candidates, &rankings);
        let selected = self.ranking.select_top(&scored);
        let changes: Vec<Candidate> = selected
            .iter()
            .filter_map(|id| state.candidate(id))
            .map(|candidate| {
                let mut candidate = candidate.clone();
                candidate.status = CandidateStatus::Selected;
                candidate
            })
            .collect();

        info!(
            selected = selected.len(),
            applicants = state.candidates.len(),
            top_k = self.ranking.top_k(),
            "top candidates selected"
        );
        StepUpdate::at(Milestone::CandidatesSelected)
            .with(StatePatch::CandidateChanges(changes))
            .with(StatePatch::Selection(selected))
    }

    pub(super) async fn schedule_interviews(&self, state: &PipelineState) -> StepUpdate {
        let selected = state.selected_candidates();
        if selected.is_empty() {
            return missing("No candidates selected");
        }
        let job_title = state
            .job_posting
            .as_ref()
            .map(|posting| posting.title.as_str())
            .unwrap_or_default();

        let now = (self.clock)();
        let mut tally = NotificationTally::default();
        let mut changes = Vec::with_capacity(selected.len());
        for (index, candidate) in selected.into_iter().enumerate() {
            let slot = self.scheduling.slot(now, index);
            let outcome = self
                .interviews
                .invite(recipient(candidate), job_title, slot)
                .await;
            tally.record(outcome.delivered);

            let mut candidate = candidate.clone();
            candidate.interview_at = outcome.scheduled_at;
            changes.push(candidate);
        }

        StepUpdate::at(Milestone::InterviewsScheduled)
            .with(StatePatch::CandidateChanges(changes))
            .with(StatePatch::Notifications(tally))
    }

    pub(super) async fn conduct_interviews(&self, state: &PipelineState) -> StepUpdate {
        let selected = state.selected_candidates();
        if selected.is_empty() {
            return missing("No candidates to interview");
        }
        let requirements = state
            .job_posting
            .as_ref()
            .map(|posting| posting.requirements.as_slice())
            .unwrap_or_default();

        let mut changes = Vec::with_capacity(selected.len());
        for candidate in selected {
            if candidate.status != CandidateStatus::Selected {
                continue;
            }

            let raw = bounded(
                "generator.interview_questions",
                self.settings.call_timeout,
                self.collaborators
                    .generator
                    .interview_questions(candidate, requirements),
            )
            .await;
            let questions = generation::interview_questions(raw).settle("interview_questions");
            let score = RankingPolicy::fallback_score(candidate);

            let mut candidate = candidate.clone();
            candidate.interview_questions = questions;
            candidate.interview_feedback = Some(format!("Score: {score}/10"));
            candidate.status = CandidateStatus::Interviewed;
            changes.push(candidate);
        }

        StepUpdate::at(Milestone::InterviewsCompleted).with(StatePatch::CandidateChanges(changes))
    }

    pub(super) async fn make_salary_offers(&self, state: &PipelineState) -> StepUpdate {
        let selected = state.selected_candidates();
        if selected.is_empty() {
            return missing("No candidates to make offers to");
        }
        let Some(posting) = &state.job_posting else {
            return missing("No job posting to make offers for");
        };

        let mut tally = NotificationTally::default();
        let mut changes = Vec::new();
        for candidate in selected {
            match candidate.status {
                CandidateStatus::Interviewed => {
                    let raw = bounded(
                        "generator.salary_offer",
                        self.settings.call_timeout,
                        self.collaborators
                            .generator
                            .salary_offer(candidate, &posting.salary_range),
                    )
                    .await;
                    let offer = generation::salary_offer(raw, candidate, &posting.salary_range)
                        .settle("salary_offer");

                    self.notify(
                        notifications::salary_offer(recipient(candidate), &posting.title, offer.amount),
                        &mut tally,
                    )
                    .await;

                    let mut candidate = candidate.clone();
                    candidate.offer_amount = Some(offer.amount);
                    candidate.offer_status = Some(OfferStatus::Pending);
                    candidate.offer_rounds = 1;
                    candidate.status = CandidateStatus::Offered;
                    changes.push(candidate);
                }
                CandidateStatus::CounterOffered => {
                    let original = candidate
                        .offer_amount
                        .unwrap_or(posting.salary_range.min);
                    let raw = bounded(
                        "generator.counter_offer",
                        self.settings.call_timeout,
                        self.collaborators
                            .generator
                            .counter_offer(candidate, original, COUNTER_REASON),
                    )
                    .await;
                    let counter =
                        generation::counter_offer(raw, candidate, original).settle("counter_offer");

                    let mut updated = candidate.clone();
                    if counter.should_counter {
                        self.notify(
                            notifications::counter_offer(
                                recipient(candidate),
                                &posting.title,
                                counter.amount,
                            ),
                            &mut tally,
                        )
                        .await;
                        updated.offer_amount = Some(counter.amount);
                        updated.offer_status = Some(OfferStatus::Pending);
                        updated.offer_rounds += 1;
                        updated.status = CandidateStatus::Offered;
                    } else {
                        info!(candidate = %candidate.id.0, "counter offer declined, withdrawing offer");
                        updated.offer_status = Some(OfferStatus::Withdrawn);
                        updated.status = CandidateStatus::Rejected;
                    }
                    changes.push(updated);
                }
                _ => {}
            }
        }

        StepUpdate::at(Milestone::OffersMade)
            .with(StatePatch::CandidateChanges(changes))
            .with(StatePatch::Notifications(tally))
    }

    pub(super) async fn handle_offer_responses(&self, state: &PipelineState) -> StepUpdate {
        let selected = state.selected_candidates();
        if selected.is_empty() {
            return missing("No candidates to handle responses for");
        }

        let mut changes = Vec::new();
        for candidate in selected {
            if candidate.status != CandidateStatus::Offered {
                continue;
            }

            let response = bounded(
                "offer_decisions.respond",
                self.settings.call_timeout,
                self.collaborators.offer_decisions.respond(candidate),
            )
            .await;

            let (status, offer_status) = match response {
                Ok(OfferResponse::Accept) => (CandidateStatus::Accepted, OfferStatus::Accepted),
                Ok(OfferResponse::Reject) => (CandidateStatus::Rejected, OfferStatus::Rejected),
                Ok(OfferResponse::Counter)
                    if candidate.offer_rounds >= self.settings.max_offer_rounds =>
                {
                    info!(
                        candidate = %candidate.id.0,
                        rounds = candidate.offer_rounds,
                        "offer rounds exhausted, closing negotiation"
                    );
                    (CandidateStatus::Rejected, OfferStatus::NegotiationExhausted)
                }
                Ok(OfferResponse::Counter) => {
                    (CandidateStatus::CounterOffered, OfferStatus::CounterOffered)
                }
                Err(err) => {
                    warn!(candidate = %candidate.id.0, error = %err, "no offer response, offer stays pending");
                    continue;
                }
            };

            let mut candidate = candidate.clone();
            candidate.status = status;
            candidate.offer_status = Some(offer_status);
            changes.push(candidate);
        }

        StepUpdate::at(Milestone::ResponsesHandled).with(StatePatch::CandidateChanges(changes))
    }

    pub(super) async fn send_rejection_emails(&self, state: &PipelineState) -> StepUpdate {
        let Some(posting) = &state.job_posting else {
            return missing("No job posting to send rejections for");
        };

        let mut tally = NotificationTally::default();
        for candidate in &state.candidates {
            let rejected = !state.is_selected(&candidate.id)
                || matches!(
                    candidate.status,
                    CandidateStatus::Rejected | CandidateStatus::Interviewed
                );
            if rejected {
                self.notify(
                    notifications::rejection(recipient(candidate), &posting.title),
                    &mut tally,
                )
                .await;
            }
        }

        info!(sent = tally.sent, failed = tally.failed, "rejection emails dispatched");
        StepUpdate::at(Milestone::RejectionsSent)
            .with(StatePatch::Notifications(tally))
            .with(StatePatch::Completed)
    }
}
