//! Named message templates rendered into [`OutboundMessage`]s.
//!
//! Bodies are plain text; transports that want HTML wrap them on their side.

use std::fmt::Write;

use chrono::NaiveDateTime;

use super::collaborators::OutboundMessage;
use super::domain::JobPosting;

/// Job title used for invitations and rejections sent by the intake graph.
pub const INTAKE_JOB_TITLE: &str = "Interview - Current Opening";

const SIGNATURE: &str = "Best regards,\nHR Team";

/// Who a candidate-facing message is addressed to.
#[derive(Debug, Clone, Copy)]
pub struct Recipient<'a> {
    pub name: &'a str,
    pub email: &'a str,
}

impl<'a> Recipient<'a> {
    /// Intake senders are only known by address.
    pub fn address_only(email: &'a str) -> Self {
        Self { name: email, email }
    }
}

/// Confirmed interview details included in an invitation.
#[derive(Debug, Clone, Copy)]
pub struct ScheduledInterview<'a> {
    pub start: NaiveDateTime,
    pub duration_minutes: u32,
    pub link: &'a str,
}

/// With `scheduled` present the invitation carries date, time and meeting link; without it the
/// candidate is asked for their availability instead.
pub fn interview_invitation(
    to: Recipient<'_>,
    job_title: &str,
    scheduled: Option<ScheduledInterview<'_>>,
) -> OutboundMessage {
    let mut body = format!(
        "Dear {},\n\nWe are pleased to invite you for an interview for the position of {job_title}.\n\n",
        to.name
    );

    match scheduled {
        Some(interview) => {
            let _ = writeln!(body, "Interview details:");
            let _ = writeln!(body, "- Date: {}", interview.start.format("%B %d, %Y"));
            let _ = writeln!(body, "- Time: {}", interview.start.format("%I:%M %p"));
            let _ = writeln!(body, "- Duration: {} minutes", interview.duration_minutes);
            let _ = writeln!(body, "- Meeting link: {}", interview.link);
            body.push_str(
                "\nIf you need to reschedule, please contact us at least 24 hours in advance.\n",
            );
        }
        None => {
            body.push_str(
                "Please reply with two or three time slots over the coming week that work for you, \
                 and we will confirm one of them.\n",
            );
        }
    }

    body.push_str("\nWe look forward to meeting you!\n\n");
    body.push_str(SIGNATURE);

    OutboundMessage {
        to: to.email.to_string(),
        subject: format!("Interview Invitation - {job_title}"),
        body,
    }
}

pub fn salary_offer(to: Recipient<'_>, job_title: &str, amount: f64) -> OutboundMessage {
    let body = format!(
        "Dear {},\n\nWe are delighted to extend you an offer for the position of {job_title}.\n\n\
         Offer details:\n- Position: {job_title}\n- Annual salary: {}\n- Start date: to be discussed\n\n\
         You have 5 business days to respond. Reply with \"I accept\" to accept this offer, \
         or contact us to discuss any questions.\n\n{SIGNATURE}",
        to.name,
        format_amount(amount)
    );

    OutboundMessage {
        to: to.email.to_string(),
        subject: format!("Job Offer - {job_title}"),
        body,
    }
}

pub fn counter_offer(to: Recipient<'_>, job_title: &str, amount: f64) -> OutboundMessage {
    let body = format!(
        "Dear {},\n\nThank you for your feedback on our initial offer. We would like to present \
         you with an updated offer.\n\n\
         Updated offer details:\n- Position: {job_title}\n- Updated annual salary: {}\n- Start date: to be discussed\n\n\
         You have 3 business days to respond.\n\n{SIGNATURE}",
        to.name,
        format_amount(amount)
    );

    OutboundMessage {
        to: to.email.to_string(),
        subject: format!("Updated Job Offer - {job_title}"),
        body,
    }
}

/// Rejections never disclose a score.
pub fn rejection(to: Recipient<'_>, job_title: &str) -> OutboundMessage {
    let body = format!(
        "Dear {},\n\nThank you for your interest in the {job_title} position.\n\n\
         After careful consideration, we have decided to move forward with other candidates \
         whose qualifications more closely match our current needs. We will keep your resume \
         on file for future opportunities.\n\n\
         We wish you the best in your job search.\n\n{SIGNATURE}",
        to.name
    );

    OutboundMessage {
        to: to.email.to_string(),
        subject: format!("Application Update - {job_title}"),
        body,
    }
}

pub fn approval_request(approver: &str, posting: &JobPosting) -> OutboundMessage {
    let mut body = String::from(
        "A new job posting has been generated and requires your approval before it is published.\n\n",
    );
    let _ = writeln!(body, "Title: {}", posting.title);
    let _ = writeln!(body, "Department: {}", posting.department);
    let _ = writeln!(body, "Location: {}", posting.location);
    let _ = writeln!(
        body,
        "Salary range: {} - {}",
        format_amount(posting.salary_range.min),
        format_amount(posting.salary_range.max)
    );
    let _ = writeln!(body, "\n{}\n\nRequirements:", posting.description);
    for requirement in &posting.requirements {
        let _ = writeln!(body, "- {requirement}");
    }
    body.push_str("\nPlease approve the posting or request modifications.\n\nJob Automation System");

    OutboundMessage {
        to: approver.to_string(),
        subject: "Job Posting Approval Required".to_string(),
        body,
    }
}

/// Confirmation of a slot the candidate proposed; `confirmed` is rendered as `YYYY-MM-DDTHH:MM`.
pub fn interview_confirmation(to: &str, confirmed: NaiveDateTime) -> OutboundMessage {
    let when = confirmed.format("%Y-%m-%dT%H:%M");
    OutboundMessage {
        to: to.to_string(),
        subject: "Interview Confirmation".to_string(),
        body: format!(
            "Hello,\n\nThank you for your reply. Your interview is confirmed for {when}.\n\
             A calendar invitation will follow.\n\n{SIGNATURE}"
        ),
    }
}

/// Two decimal places with thousands separators, e.g. `92,000.00`.
pub fn format_amount(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (index, digit) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{sign}{grouped}.{:02}", cents % 100)
}
