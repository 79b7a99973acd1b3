//! The hiring step graph and its execution loop.
//!
//! Steps read the current [`PipelineState`] and return a [`StepUpdate`]; the loop merges the
//! update and asks the routers for the next edge. Every self-loop and back-edge is bounded so
//! a run always terminates.

mod routers;
mod steps;

use std::time::Duration;

use tracing::{debug, info, warn};

pub use routers::{
    route_after_publish, route_applicants, route_approval, route_offer_responses,
    ApplicantOutcome, ApprovalOutcome, OfferOutcome, PostPublishPolicy, PublishOutcome,
};

use super::collaborators::HiringCollaborators;
use super::domain::Employee;
use super::error::PipelineError;
use super::interviews::InterviewCoordinator;
use super::ranking::RankingPolicy;
use super::requirements::RequirementsArtifact;
use super::scheduling::{local_now, Clock, SchedulingPolicy};
use super::state::{Milestone, PipelineState, StatePatch, StepUpdate};

/// Named nodes of the step graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    GenerateJobPosting,
    RequestHumanApproval,
    PostJob,
    CheckApplicants,
    ModifyJobPosting,
    SelectTopCandidates,
    ScheduleInterviews,
    ConductInterviews,
    MakeSalaryOffers,
    HandleOfferResponses,
    SendRejectionEmails,
}

impl Step {
    pub const fn name(self) -> &'static str {
        match self {
            Step::GenerateJobPosting => "generate_job_posting",
            Step::RequestHumanApproval => "request_human_approval",
            Step::PostJob => "post_job_to_linkedin",
            Step::CheckApplicants => "check_applicants",
            Step::ModifyJobPosting => "modify_job_posting",
            Step::SelectTopCandidates => "select_top_candidates",
            Step::ScheduleInterviews => "schedule_interviews",
            Step::ConductInterviews => "conduct_interviews",
            Step::MakeSalaryOffers => "make_salary_offers",
            Step::HandleOfferResponses => "handle_offer_responses",
            Step::SendRejectionEmails => "send_rejection_emails",
        }
    }
}

/// Tunables for one engine instance.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    pub min_applicants: usize,
    pub top_candidates: usize,
    pub post_publish: PostPublishPolicy,
    pub max_modify_rounds: u32,
    /// Offers extended per candidate, the initial offer included.
    pub max_offer_rounds: u32,
    pub max_approval_polls: u32,
    pub max_steps: u32,
    pub call_timeout: Duration,
    /// Organiser address added to every interview event.
    pub sender_address: String,
    pub approval_recipient: Option<String>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            min_applicants: 10,
            top_candidates: 5,
            post_publish: PostPublishPolicy::Stop,
            max_modify_rounds: 3,
            max_offer_rounds: 3,
            max_approval_polls: 5,
            max_steps: 200,
            call_timeout: Duration::from_secs(30),
            sender_address: "hr@example.com".to_string(),
            approval_recipient: None,
        }
    }
}

impl PipelineSettings {
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.top_candidates == 0 {
            return Err(PipelineError::Configuration(
                "top candidate count must be at least 1".to_string(),
            ));
        }
        if self.max_offer_rounds == 0 {
            return Err(PipelineError::Configuration(
                "offer rounds must be at least 1".to_string(),
            ));
        }
        if self.max_approval_polls == 0 || self.max_steps == 0 {
            return Err(PipelineError::Configuration(
                "approval polls and step budget must be positive".to_string(),
            ));
        }
        if self.call_timeout.is_zero() {
            return Err(PipelineError::Configuration(
                "external call timeout must be positive".to_string(),
            ));
        }
        if self.sender_address.trim().is_empty() {
            return Err(PipelineError::Configuration(
                "sender address must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct LoopGuards {
    steps: u32,
    approval_polls: u32,
    modify_rounds: u32,
}

enum Transition {
    Next(Step),
    Terminate,
    Halt(PipelineError),
}

pub struct WorkflowEngine {
    settings: PipelineSettings,
    collaborators: HiringCollaborators,
    requirements: RequirementsArtifact,
    interviews: InterviewCoordinator,
    ranking: RankingPolicy,
    scheduling: SchedulingPolicy,
    clock: Clock,
}

impl WorkflowEngine {
    /// Fails on invalid settings, before any step can run.
    pub fn new(
        settings: PipelineSettings,
        collaborators: HiringCollaborators,
        requirements: RequirementsArtifact,
    ) -> Result<Self, PipelineError> {
        settings.validate()?;

        let interviews = InterviewCoordinator::new(
            collaborators.calendar.clone(),
            collaborators.notifier.clone(),
            settings.sender_address.clone(),
            settings.call_timeout,
        );
        let ranking = RankingPolicy::new(settings.top_candidates);

        Ok(Self {
            settings,
            collaborators,
            requirements,
            interviews,
            ranking,
            scheduling: SchedulingPolicy::default(),
            clock: local_now,
        })
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub async fn run(&self, employee: Employee) -> PipelineState {
        self.run_from(PipelineState::new(employee)).await
    }

    /// Execute the graph from its entry step against an arbitrary starting state.
    pub async fn run_from(&self, mut state: PipelineState) -> PipelineState {
        let mut step = Step::GenerateJobPosting;
        let mut guards = LoopGuards::default();

        info!(
            employee = state.employee.as_ref().map(|employee| employee.id.as_str()),
            post_publish = self.settings.post_publish.label(),
            "pipeline run started"
        );

        loop {
            if guards.steps >= self.settings.max_steps {
                self.halt(
                    &mut state,
                    PipelineError::LoopBound {
                        loop_name: "step",
                        limit: self.settings.max_steps,
                    },
                );
                break;
            }
            guards.steps += 1;

            debug!(step = step.name(), "executing step");
            let update = self.execute(step, &state, &guards).await;
            state.apply(update);

            match self.transition(step, &state, &mut guards) {
                Transition::Next(next) => step = next,
                Transition::Terminate => break,
                Transition::Halt(err) => {
                    self.halt(&mut state, err);
                    break;
                }
            }
        }

        info!(
            current_step = state.current_step.label(),
            completed = state.completed,
            candidates = state.candidates.len(),
            selected = state.selected_ids().len(),
            notifications_sent = state.notifications.sent,
            notifications_failed = state.notifications.failed,
            error = state.error_message.as_deref(),
            steps = guards.steps,
            "pipeline run finished"
        );
        state
    }

    async fn execute(&self, step: Step, state: &PipelineState, guards: &LoopGuards) -> StepUpdate {
        match step {
            Step::GenerateJobPosting => self.generate_job_posting(state).await,
            Step::RequestHumanApproval => {
                self.request_human_approval(state, guards.approval_polls == 0)
                    .await
            }
            Step::PostJob => self.post_job(state).await,
            Step::CheckApplicants => self.check_applicants(state).await,
            Step::ModifyJobPosting => self.modify_job_posting(state).await,
            Step::SelectTopCandidates => self.select_top_candidates(state).await,
            Step::ScheduleInterviews => self.schedule_interviews(state).await,
            Step::ConductInterviews => self.conduct_interviews(state).await,
            Step::MakeSalaryOffers => self.make_salary_offers(state).await,
            Step::HandleOfferResponses => self.handle_offer_responses(state).await,
            Step::SendRejectionEmails => self.send_rejection_emails(state).await,
        }
    }

    fn transition(&self, step: Step, state: &PipelineState, guards: &mut LoopGuards) -> Transition {
        match step {
            Step::GenerateJobPosting => Transition::Next(Step::RequestHumanApproval),
            Step::RequestHumanApproval => {
                match route_approval(self.collaborators.approval.as_ref(), state) {
                    ApprovalOutcome::Skip => Transition::Next(Step::PostJob),
                    ApprovalOutcome::Wait => {
                        guards.approval_polls += 1;
                        if guards.approval_polls >= self.settings.max_approval_polls {
                            Transition::Halt(PipelineError::LoopBound {
                                loop_name: "approval",
                                limit: self.settings.max_approval_polls,
                            })
                        } else {
                            Transition::Next(Step::RequestHumanApproval)
                        }
                    }
                }
            }
            Step::PostJob => match route_after_publish(state, self.settings.post_publish) {
                PublishOutcome::Continue => Transition::Next(Step::CheckApplicants),
                PublishOutcome::End => Transition::Terminate,
            },
            Step::CheckApplicants => {
                let rounds_left = guards.modify_rounds < self.settings.max_modify_rounds;
                match route_applicants(state, self.settings.min_applicants, rounds_left) {
                    ApplicantOutcome::Modify => {
                        guards.modify_rounds += 1;
                        Transition::Next(Step::ModifyJobPosting)
                    }
                    ApplicantOutcome::Continue => {
                        if !rounds_left {
                            info!(
                                rounds = guards.modify_rounds,
                                "modify rounds exhausted, continuing with current applicants"
                            );
                        }
                        Transition::Next(Step::SelectTopCandidates)
                    }
                }
            }
            Step::ModifyJobPosting => Transition::Next(Step::CheckApplicants),
            Step::SelectTopCandidates => Transition::Next(Step::ScheduleInterviews),
            Step::ScheduleInterviews => Transition::Next(Step::ConductInterviews),
            Step::ConductInterviews => Transition::Next(Step::MakeSalaryOffers),
            Step::MakeSalaryOffers => Transition::Next(Step::HandleOfferResponses),
            Step::HandleOfferResponses => match route_offer_responses(state) {
                OfferOutcome::Counter => Transition::Next(Step::MakeSalaryOffers),
                OfferOutcome::Complete => Transition::Next(Step::SendRejectionEmails),
            },
            Step::SendRejectionEmails => Transition::Terminate,
        }
    }

    fn halt(&self, state: &mut PipelineState, err: PipelineError) {
        warn!(error = %err, last_step = state.current_step.label(), "pipeline run halted");
        state.apply(StepUpdate::at(Milestone::Halted).with(StatePatch::Error(err.to_string())));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_names_match_graph_labels() {
        assert_eq!(Step::PostJob.name(), "post_job_to_linkedin");
        assert_eq!(Step::HandleOfferResponses.name(), "handle_offer_responses");
    }

    #[test]
    fn settings_reject_zero_top_k() {
        let settings = PipelineSettings {
            top_candidates: 0,
            ..PipelineSettings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(PipelineError::Configuration(_))
        ));
        assert!(PipelineSettings::default().validate().is_ok());
    }
}
