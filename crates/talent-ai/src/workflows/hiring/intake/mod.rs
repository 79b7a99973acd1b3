//! Resume intake: the independently scheduled graph that scores inbound resumes against the
//! persisted requirements, invites the best and turns down the rest.
//!
//! A tick runs load requirements -> fetch unseen -> score all -> rank -> invite -> reject ->
//! confirm replies. Scoring finishes before ranking and ranking before any notification.

mod replies;
mod scheduler;

use std::collections::HashSet;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{info, warn};

pub use replies::{first_future_slot, parse_time_expression, ConfirmationRecord};
pub use scheduler::{IntakeScheduler, IntakeSchedulerHandle};

use super::collaborators::{bounded, HiringCollaborators, InboundResume};
use super::interviews::{deliver, InterviewCoordinator, InvitationOutcome};
use super::notifications::{self, Recipient, INTAKE_JOB_TITLE};
use super::ranking::{top_by, INTAKE_INVITE_COUNT};
use super::requirements::{RequirementsArtifact, RequirementsSource};
use super::scheduling::{local_now, Clock, SchedulingPolicy};
use super::scoring::{RubricBreakdown, ScoringPolicy};
use super::state::NotificationTally;
use replies::ReplyHandler;

#[derive(Debug, Clone)]
pub struct IntakeSettings {
    pub call_timeout: Duration,
    /// Organiser address added to every interview event.
    pub sender_address: String,
    pub handle_replies: bool,
}

impl Default for IntakeSettings {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(30),
            sender_address: "hr@example.com".to_string(),
            handle_replies: true,
        }
    }
}

/// Score card for one inbound resume; lives for a single tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResumeSummary {
    pub from_address: String,
    pub filename: String,
    pub score: u8,
    pub matched: Vec<String>,
    pub missing: Vec<String>,
    pub breakdown: RubricBreakdown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectionRecord {
    pub email: String,
    pub delivered: bool,
}

/// Everything one tick observed and did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntakeReport {
    pub requirements_source: RequirementsSource,
    pub requirements: Vec<String>,
    pub summaries: Vec<ResumeSummary>,
    pub invitations: Vec<InvitationOutcome>,
    pub rejections: Vec<RejectionRecord>,
    pub confirmations: Vec<ConfirmationRecord>,
    /// Set when fetching resumes failed and the tick was abandoned.
    pub fetch_error: Option<String>,
    pub notifications: NotificationTally,
}

impl IntakeReport {
    fn new(requirements: Vec<String>, requirements_source: RequirementsSource) -> Self {
        Self {
            requirements_source,
            requirements,
            summaries: Vec::new(),
            invitations: Vec::new(),
            rejections: Vec::new(),
            confirmations: Vec::new(),
            fetch_error: None,
            notifications: NotificationTally::default(),
        }
    }

    /// Whether the tick produced any outbound side effect.
    pub fn is_quiet(&self) -> bool {
        self.notifications.total() == 0
    }
}

pub struct ResumeIntake {
    settings: IntakeSettings,
    collaborators: HiringCollaborators,
    requirements: RequirementsArtifact,
    interviews: InterviewCoordinator,
    scoring: ScoringPolicy,
    scheduling: SchedulingPolicy,
    clock: Clock,
    tick: Mutex<()>,
}

impl ResumeIntake {
    pub fn new(
        settings: IntakeSettings,
        collaborators: HiringCollaborators,
        requirements: RequirementsArtifact,
    ) -> Self {
        let interviews = InterviewCoordinator::new(
            collaborators.calendar.clone(),
            collaborators.notifier.clone(),
            settings.sender_address.clone(),
            settings.call_timeout,
        );
        let scoring = ScoringPolicy::new(settings.call_timeout);

        Self {
            settings,
            collaborators,
            requirements,
            interviews,
            scoring,
            scheduling: SchedulingPolicy::default(),
            clock: local_now,
            tick: Mutex::new(()),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Run one tick. Concurrent callers queue behind the tick in progress.
    pub async fn run_once(&self) -> IntakeReport {
        let _serialized = self.tick.lock().await;

        let (requirements, source) = self.requirements.load_or_default();
        let mut report = IntakeReport::new(requirements, source);

        let fetched = bounded(
            "resume_source.fetch_unseen",
            self.settings.call_timeout,
            self.collaborators.resumes.fetch_unseen(),
        )
        .await;
        let resumes = match fetched {
            Ok(resumes) => resumes,
            Err(err) => {
                warn!(error = %err, "resume fetch failed, abandoning intake tick");
                report.fetch_error = Some(err.to_string());
                return report;
            }
        };

        report.summaries = self.score_all(&resumes, &report.requirements).await;
        if report.summaries.is_empty() {
            info!("no new resumes");
        } else {
            self.notify_candidates(&mut report).await;
        }

        if self.settings.handle_replies {
            let handler = ReplyHandler {
                generator: self.collaborators.generator.as_ref(),
                notifier: self.collaborators.notifier.as_ref(),
                source: self.collaborators.resumes.as_ref(),
                call_timeout: self.settings.call_timeout,
            };
            report.confirmations = handler.confirm_proposed_slots((self.clock)()).await;
            for confirmation in &report.confirmations {
                report.notifications.record(confirmation.delivered);
            }
        }

        info!(
            resumes = report.summaries.len(),
            invited = report.invitations.len(),
            rejected = report.rejections.len(),
            confirmed = report.confirmations.len(),
            requirements = ?report.requirements_source,
            "intake tick finished"
        );
        report
    }

    async fn score_all(&self, resumes: &[InboundResume], requirements: &[String]) -> Vec<ResumeSummary> {
        let mut summaries = Vec::with_capacity(resumes.len());
        for resume in resumes {
            let scored = self
                .scoring
                .score(self.collaborators.generator.as_ref(), &resume.text, requirements)
                .await;
            summaries.push(ResumeSummary {
                from_address: resume.from_address.trim().to_string(),
                filename: resume.filename.clone(),
                score: scored.score,
                matched: scored.matched,
                missing: scored.missing,
                breakdown: scored.breakdown,
            });
        }
        summaries
    }

    async fn notify_candidates(&self, report: &mut IntakeReport) {
        let addressed: Vec<&ResumeSummary> = report
            .summaries
            .iter()
            .filter(|summary| !summary.from_address.is_empty())
            .collect();
        let invitees: Vec<&ResumeSummary> = top_by(&addressed, INTAKE_INVITE_COUNT, |summary| summary.score)
            .into_iter()
            .copied()
            .collect();
        let invited: HashSet<&str> = invitees
            .iter()
            .map(|summary| summary.from_address.as_str())
            .collect();

        let now = (self.clock)();
        let mut invitations = Vec::with_capacity(invitees.len());
        for (index, summary) in invitees.iter().enumerate() {
            let slot = self.scheduling.slot(now, index);
            let outcome = self
                .interviews
                .invite(
                    Recipient::address_only(&summary.from_address),
                    INTAKE_JOB_TITLE,
                    slot,
                )
                .await;
            invitations.push(outcome);
        }

        let mut rejections = Vec::new();
        for summary in addressed {
            if invited.contains(summary.from_address.as_str()) {
                continue;
            }
            let message = notifications::rejection(
                Recipient::address_only(&summary.from_address),
                INTAKE_JOB_TITLE,
            );
            let delivered = deliver(
                self.collaborators.notifier.as_ref(),
                &message,
                self.settings.call_timeout,
            )
            .await;
            rejections.push(RejectionRecord {
                email: summary.from_address.clone(),
                delivered,
            });
        }

        for invitation in &invitations {
            report.notifications.record(invitation.delivered);
        }
        for rejection in &rejections {
            report.notifications.record(rejection.delivered);
        }
        report.invitations = invitations;
        report.rejections = rejections;
    }
}
