//! Confirming interview times candidates propose in their replies.

use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::{debug, warn};

use crate::workflows::hiring::collaborators::{
    bounded, ContentGenerator, InboundReply, Notifier, ResumeSource,
};
use crate::workflows::hiring::generation::{self, GeneratedExt};
use crate::workflows::hiring::interviews::deliver;
use crate::workflows::hiring::notifications;

const DATETIME_FORMATS: [&str; 11] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %I:%M %p",
    "%B %d, %Y %I:%M %p",
    "%B %d, %Y at %I:%M %p",
    "%b %d, %Y %I:%M %p",
    "%A, %B %d, %Y %I:%M %p",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M %p",
];

/// Parse one extracted time expression. Offsets are dropped and the wall-clock time kept; a
/// bare date means midnight.
pub fn parse_time_expression(expression: &str) -> Option<NaiveDateTime> {
    let text = expression.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.naive_local());
    }
    if let Some(parsed) = DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
    {
        return Some(parsed);
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// First expression that parses to a time after `now`.
pub fn first_future_slot(expressions: &[String], now: NaiveDateTime) -> Option<NaiveDateTime> {
    expressions
        .iter()
        .filter_map(|expression| parse_time_expression(expression))
        .find(|slot| *slot > now)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfirmationRecord {
    pub email: String,
    pub confirmed_at: NaiveDateTime,
    pub delivered: bool,
}

pub(super) struct ReplyHandler<'a> {
    pub generator: &'a dyn ContentGenerator,
    pub notifier: &'a dyn Notifier,
    pub source: &'a dyn ResumeSource,
    pub call_timeout: Duration,
}

impl ReplyHandler<'_> {
    /// Fetch replies and confirm the first future slot each one proposes. Every failure is
    /// logged and skipped.
    pub async fn confirm_proposed_slots(&self, now: NaiveDateTime) -> Vec<ConfirmationRecord> {
        let replies = match bounded(
            "resume_source.fetch_replies",
            self.call_timeout,
            self.source.fetch_replies(),
        )
        .await
        {
            Ok(replies) => replies,
            Err(err) => {
                warn!(error = %err, "could not fetch candidate replies");
                return Vec::new();
            }
        };

        let mut confirmations = Vec::new();
        for reply in replies {
            if let Some(record) = self.confirm(&reply, now).await {
                confirmations.push(record);
            }
        }
        confirmations
    }

    async fn confirm(&self, reply: &InboundReply, now: NaiveDateTime) -> Option<ConfirmationRecord> {
        if reply.from_address.trim().is_empty() {
            return None;
        }

        let raw = bounded(
            "generator.meeting_slots",
            self.call_timeout,
            self.generator.meeting_slots(&reply.body),
        )
        .await;
        let expressions = generation::meeting_slots(raw).settle("meeting_slots");

        let Some(confirmed_at) = first_future_slot(&expressions, now) else {
            debug!(from = %reply.from_address, proposed = expressions.len(), "no usable slot in reply");
            return None;
        };

        let message = notifications::interview_confirmation(&reply.from_address, confirmed_at);
        let delivered = deliver(self.notifier, &message, self.call_timeout).await;

        Some(ConfirmationRecord {
            email: reply.from_address.clone(),
            confirmed_at,
            delivered,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|date| date.and_hms_opt(hour, minute, 0))
            .expect("valid timestamp")
    }

    #[test]
    fn parses_common_expressions() {
        assert_eq!(
            parse_time_expression("2025-06-10T15:30"),
            Some(at(2025, 6, 10, 15, 30))
        );
        assert_eq!(
            parse_time_expression("2025-06-10 03:30 PM"),
            Some(at(2025, 6, 10, 15, 30))
        );
        assert_eq!(
            parse_time_expression("June 10, 2025 at 10:00 AM"),
            Some(at(2025, 6, 10, 10, 0))
        );
        assert_eq!(
            parse_time_expression("2025-06-10T15:30:00+05:30"),
            Some(at(2025, 6, 10, 15, 30))
        );
        assert_eq!(parse_time_expression("2025-06-10"), Some(at(2025, 6, 10, 0, 0)));
        assert_eq!(parse_time_expression("next Tuesday-ish"), None);
    }

    #[test]
    fn first_future_slot_skips_past_and_garbage() {
        let now = at(2025, 6, 9, 12, 0);
        let proposals = vec![
            "whenever".to_string(),
            "2025-06-08 10:00".to_string(),
            "2025-06-11 09:00".to_string(),
            "2025-06-12 09:00".to_string(),
        ];
        assert_eq!(first_future_slot(&proposals, now), Some(at(2025, 6, 11, 9, 0)));
        assert_eq!(first_future_slot(&proposals[..2], now), None);
    }
}
