//! Calendar booking plus invitation delivery, shared by the pipeline and intake graphs.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::{info, warn};

use super::collaborators::{bounded, CalendarEvent, CalendarScheduler, Notifier, OutboundMessage};
use super::notifications::{self, Recipient, ScheduledInterview};
use super::scheduling::InterviewSlot;

/// Send one message, logging instead of failing. Returns whether it was delivered.
pub async fn deliver(notifier: &dyn Notifier, message: &OutboundMessage, timeout: Duration) -> bool {
    match bounded("notifier.send", timeout, notifier.send(message)).await {
        Ok(true) => true,
        Ok(false) => {
            warn!(to = %message.to, subject = %message.subject, "notifier declined message");
            false
        }
        Err(err) => {
            warn!(to = %message.to, subject = %message.subject, error = %err, "notification failed");
            false
        }
    }
}

/// Result of inviting one candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvitationOutcome {
    pub email: String,
    /// Booked start time; `None` when the calendar failed and availability was requested.
    pub scheduled_at: Option<NaiveDateTime>,
    pub event_link: Option<String>,
    pub delivered: bool,
}

#[derive(Clone)]
pub struct InterviewCoordinator {
    calendar: Arc<dyn CalendarScheduler>,
    notifier: Arc<dyn Notifier>,
    organiser: String,
    call_timeout: Duration,
}

impl InterviewCoordinator {
    pub fn new(
        calendar: Arc<dyn CalendarScheduler>,
        notifier: Arc<dyn Notifier>,
        organiser: impl Into<String>,
        call_timeout: Duration,
    ) -> Self {
        Self {
            calendar,
            notifier,
            organiser: organiser.into(),
            call_timeout,
        }
    }

    pub fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }

    pub fn call_timeout(&self) -> Duration {
        self.call_timeout
    }

    /// Book `slot` and send an invitation with the details. A calendar failure downgrades to an
    /// availability-request invitation; neither failure is propagated.
    pub async fn invite(
        &self,
        to: Recipient<'_>,
        job_title: &str,
        slot: InterviewSlot,
    ) -> InvitationOutcome {
        let event = CalendarEvent {
            summary: format!("Interview: {}", to.email),
            description: format!("Interview scheduled for candidate {} (auto)", to.email),
            start: slot.start,
            attendees: vec![to.email.to_string(), self.organiser.clone()],
            duration_minutes: slot.duration_minutes,
        };

        let booked = bounded(
            "calendar.create_event",
            self.call_timeout,
            self.calendar.create_event(&event),
        )
        .await;

        let (message, scheduled_at, event_link) = match booked {
            Ok(link) => {
                info!(to = %to.email, start = %slot.start, "interview booked");
                let message = notifications::interview_invitation(
                    to,
                    job_title,
                    Some(ScheduledInterview {
                        start: slot.start,
                        duration_minutes: slot.duration_minutes,
                        link: &link,
                    }),
                );
                (message, Some(slot.start), Some(link))
            }
            Err(err) => {
                warn!(to = %to.email, error = %err, "calendar booking failed, requesting availability");
                (
                    notifications::interview_invitation(to, job_title, None),
                    None,
                    None,
                )
            }
        };

        let delivered = deliver(self.notifier.as_ref(), &message, self.call_timeout).await;

        InvitationOutcome {
            email: to.email.to_string(),
            scheduled_at,
            event_link,
            delivered,
        }
    }
}
