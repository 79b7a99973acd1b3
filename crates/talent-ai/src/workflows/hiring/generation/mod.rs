//! Tolerant parsing of generator payloads.
//!
//! Every parser returns `Result<Parsed, FallbackUsed<Parsed>>`: the error side still carries a
//! usable value built by the deterministic rules in [`fallback`], plus the reason the payload
//! was rejected. Callers settle the result with [`GeneratedExt::settle`], which logs the
//! substitution.

pub mod fallback;

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::warn;

use super::collaborators::ServiceError;
use super::domain::{Candidate, Employee, SalaryRange};

/// A deterministic substitute used because the generator output could not be used.
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackUsed<T> {
    pub value: T,
    pub reason: FallbackReason,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FallbackReason {
    Service(ServiceError),
    EmptyPayload,
    Malformed(String),
    Invalid(&'static str),
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::Service(err) => write!(f, "generator call failed: {err}"),
            FallbackReason::EmptyPayload => write!(f, "generator returned no structured payload"),
            FallbackReason::Malformed(detail) => write!(f, "malformed payload: {detail}"),
            FallbackReason::Invalid(detail) => write!(f, "payload failed validation: {detail}"),
        }
    }
}

pub type Generated<T> = Result<T, FallbackUsed<T>>;

pub trait GeneratedExt<T> {
    /// Take the parsed value, or the fallback after logging why it was needed.
    fn settle(self, operation: &'static str) -> T;
}

impl<T> GeneratedExt<T> for Generated<T> {
    fn settle(self, operation: &'static str) -> T {
        match self {
            Ok(value) => value,
            Err(FallbackUsed { value, reason }) => {
                warn!(operation, %reason, "generator output unusable, using deterministic fallback");
                value
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Shape {
    Object,
    Array,
}

/// Strip code-fence markup and surrounding prose, returning the outermost JSON object or array.
pub(crate) fn extract_payload(raw: &str, shape: Shape) -> Option<&str> {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```") {
        let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
        text = rest.trim();
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest.trim();
    }

    let (open, close) = match shape {
        Shape::Object => ('{', '}'),
        Shape::Array => ('[', ']'),
    };
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

/// Decode the payload as `R`, mapping each failure mode onto a [`FallbackReason`].
pub(crate) fn decode<R: DeserializeOwned>(
    raw: &Result<String, ServiceError>,
    shape: Shape,
) -> Result<R, FallbackReason> {
    let text = match raw {
        Ok(text) => text,
        Err(err) => return Err(FallbackReason::Service(err.clone())),
    };
    let payload = extract_payload(text, shape).ok_or(FallbackReason::EmptyPayload)?;
    serde_json::from_str(payload).map_err(|err| FallbackReason::Malformed(err.to_string()))
}

/// Posting content produced for a departing employee.
#[derive(Debug, Clone, PartialEq)]
pub struct JobDraft {
    pub title: String,
    pub description: String,
    pub requirements: Vec<String>,
    pub salary_range: SalaryRange,
}

#[derive(Debug, Deserialize)]
struct RawJobDraft {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    requirements: Vec<String>,
    salary_range: Option<SalaryRange>,
}

pub fn job_posting(raw: Result<String, ServiceError>, employee: &Employee) -> Generated<JobDraft> {
    let reject = |reason: FallbackReason| {
        let prose = raw.as_ref().ok().map(|text| text.trim()).unwrap_or_default();
        Err(FallbackUsed {
            value: fallback::job_posting(employee, prose),
            reason,
        })
    };

    let parsed: RawJobDraft = match decode(&raw, Shape::Object) {
        Ok(parsed) => parsed,
        Err(reason) => return reject(reason),
    };

    let requirements: Vec<String> = parsed
        .requirements
        .into_iter()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect();

    if parsed.title.trim().is_empty() {
        return reject(FallbackReason::Invalid("missing title"));
    }
    if requirements.is_empty() {
        return reject(FallbackReason::Invalid("missing requirements"));
    }
    let salary_range = match parsed.salary_range {
        Some(range) if range.min > 0.0 && range.min <= range.max => range,
        _ => return reject(FallbackReason::Invalid("salary range missing or inverted")),
    };

    Ok(JobDraft {
        title: parsed.title.trim().to_string(),
        description: parsed.description.trim().to_string(),
        requirements,
        salary_range,
    })
}

/// Score (1–10) the generator assigned to one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateRanking {
    pub candidate_id: String,
    pub score: u8,
}

#[derive(Debug, Deserialize)]
struct RawRanking {
    #[serde(alias = "candidateId", alias = "id")]
    candidate_id: String,
    score: f64,
}

pub fn candidate_rankings(
    raw: Result<String, ServiceError>,
    candidates: &[Candidate],
) -> Generated<Vec<CandidateRanking>> {
    let reject = |reason| {
        Err(FallbackUsed {
            value: fallback::candidate_rankings(candidates),
            reason,
        })
    };

    let parsed: Vec<RawRanking> = match decode(&raw, Shape::Array) {
        Ok(parsed) => parsed,
        Err(reason) => return reject(reason),
    };
    if parsed.is_empty() {
        return reject(FallbackReason::Invalid("empty ranking"));
    }

    Ok(parsed
        .into_iter()
        .map(|entry| CandidateRanking {
            candidate_id: entry.candidate_id,
            score: entry.score.round().clamp(1.0, 10.0) as u8,
        })
        .collect())
}

pub fn interview_questions(raw: Result<String, ServiceError>) -> Generated<Vec<String>> {
    let questions: Vec<String> = match decode::<Vec<String>>(&raw, Shape::Array) {
        Ok(parsed) => parsed
            .into_iter()
            .map(|question| question.trim().to_string())
            .filter(|question| !question.is_empty())
            .collect(),
        Err(reason) => {
            return Err(FallbackUsed {
                value: fallback::interview_questions(),
                reason,
            })
        }
    };

    if questions.is_empty() {
        return Err(FallbackUsed {
            value: fallback::interview_questions(),
            reason: FallbackReason::Invalid("no questions"),
        });
    }
    Ok(questions)
}

#[derive(Debug, Clone, PartialEq)]
pub struct SalaryOfferDraft {
    pub amount: f64,
    pub reasoning: String,
}

#[derive(Debug, Deserialize)]
struct RawSalaryOffer {
    offer_amount: f64,
    #[serde(default)]
    reasoning: String,
}

/// Initial offer; a parsed amount is clamped into the posted salary range.
pub fn salary_offer(
    raw: Result<String, ServiceError>,
    candidate: &Candidate,
    range: &SalaryRange,
) -> Generated<SalaryOfferDraft> {
    let reject = |reason| {
        Err(FallbackUsed {
            value: fallback::salary_offer(candidate, range),
            reason,
        })
    };

    let parsed: RawSalaryOffer = match decode(&raw, Shape::Object) {
        Ok(parsed) => parsed,
        Err(reason) => return reject(reason),
    };
    if !parsed.offer_amount.is_finite() || parsed.offer_amount <= 0.0 {
        return reject(FallbackReason::Invalid("non-positive offer amount"));
    }

    Ok(SalaryOfferDraft {
        amount: parsed.offer_amount.clamp(range.min, range.max.max(range.min)),
        reasoning: parsed.reasoning,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct CounterOfferDraft {
    pub amount: f64,
    pub reasoning: String,
    pub should_counter: bool,
}

#[derive(Debug, Deserialize)]
struct RawCounterOffer {
    counter_offer_amount: f64,
    #[serde(default)]
    reasoning: String,
    should_counter_offer: bool,
}

pub fn counter_offer(
    raw: Result<String, ServiceError>,
    candidate: &Candidate,
    original_offer: f64,
) -> Generated<CounterOfferDraft> {
    let reject = |reason| {
        Err(FallbackUsed {
            value: fallback::counter_offer(candidate, original_offer),
            reason,
        })
    };

    let parsed: RawCounterOffer = match decode(&raw, Shape::Object) {
        Ok(parsed) => parsed,
        Err(reason) => return reject(reason),
    };
    if parsed.should_counter_offer
        && (!parsed.counter_offer_amount.is_finite() || parsed.counter_offer_amount <= 0.0)
    {
        return reject(FallbackReason::Invalid("non-positive counter amount"));
    }

    Ok(CounterOfferDraft {
        amount: parsed.counter_offer_amount,
        reasoning: parsed.reasoning,
        should_counter: parsed.should_counter_offer,
    })
}

/// Time expressions the generator extracted from a reply; empty when nothing usable came back.
pub fn meeting_slots(raw: Result<String, ServiceError>) -> Generated<Vec<String>> {
    match decode::<Vec<String>>(&raw, Shape::Array) {
        Ok(slots) => Ok(slots
            .into_iter()
            .map(|slot| slot.trim().to_string())
            .filter(|slot| !slot.is_empty())
            .collect()),
        Err(reason) => Err(FallbackUsed {
            value: Vec::new(),
            reason,
        }),
    }
}
