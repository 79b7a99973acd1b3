//! Resume scoring against the fixed 100-point rubric.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::collaborators::{bounded, ContentGenerator, ServiceError};
use super::generation::{decode, FallbackReason, FallbackUsed, Generated, GeneratedExt, Shape};

pub const KEYWORDS_MAX: u8 = 30;
pub const SKILLS_MAX: u8 = 25;
pub const EXPERIENCE_MAX: u8 = 20;
pub const EDUCATION_MAX: u8 = 15;
pub const FORMAT_MAX: u8 = 10;
pub const SCORE_MAX: u8 = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RubricBreakdown {
    pub keywords: u8,
    pub skills: u8,
    pub experience: u8,
    pub education: u8,
    pub format: u8,
}

impl RubricBreakdown {
    pub fn total(&self) -> u8 {
        self.keywords + self.skills + self.experience + self.education + self.format
    }

    /// `(label, awarded, cap)` rows in rubric order.
    pub fn lines(&self) -> [(&'static str, u8, u8); 5] {
        [
            ("Keywords", self.keywords, KEYWORDS_MAX),
            ("Skills", self.skills, SKILLS_MAX),
            ("Experience", self.experience, EXPERIENCE_MAX),
            ("Education", self.education, EDUCATION_MAX),
            ("Format", self.format, FORMAT_MAX),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeScore {
    pub score: u8,
    pub matched: Vec<String>,
    pub missing: Vec<String>,
    pub breakdown: RubricBreakdown,
}

#[derive(Debug, Deserialize)]
struct RawScore {
    #[serde(default)]
    score: Option<f64>,
    #[serde(default)]
    matched: Vec<String>,
    #[serde(default)]
    missing: Vec<String>,
    #[serde(default)]
    breakdown: Option<RawBreakdown>,
}

#[derive(Debug, Default, Deserialize)]
struct RawBreakdown {
    #[serde(default)]
    keywords: f64,
    #[serde(default)]
    skills: f64,
    #[serde(default)]
    experience: f64,
    #[serde(default)]
    education: f64,
    #[serde(default)]
    format: f64,
}

fn clamp_points(value: f64, cap: u8) -> u8 {
    if value.is_finite() {
        value.round().clamp(0.0, f64::from(cap)) as u8
    } else {
        0
    }
}

/// Delegates scoring to the generator and never fails: unusable output degrades to
/// [`ScoringPolicy::fallback`].
#[derive(Debug, Clone, Copy)]
pub struct ScoringPolicy {
    call_timeout: Duration,
}

impl ScoringPolicy {
    pub fn new(call_timeout: Duration) -> Self {
        Self { call_timeout }
    }

    pub async fn score(
        &self,
        generator: &dyn ContentGenerator,
        resume_text: &str,
        requirements: &[String],
    ) -> ResumeScore {
        let raw = bounded(
            "generator.score_resume",
            self.call_timeout,
            generator.score_resume(resume_text, requirements),
        )
        .await;
        Self::parse(raw, requirements).settle("score_resume")
    }

    /// Parse a rubric payload. Sub-scores are clamped to their caps; when a breakdown is
    /// present the total is the sum of the clamped sub-scores.
    pub fn parse(raw: Result<String, ServiceError>, requirements: &[String]) -> Generated<ResumeScore> {
        let parsed: RawScore = match decode(&raw, Shape::Object) {
            Ok(parsed) => parsed,
            Err(reason) => {
                return Err(FallbackUsed {
                    value: Self::fallback(requirements),
                    reason,
                })
            }
        };

        let (breakdown, score) = match (parsed.breakdown, parsed.score) {
            (Some(raw), _) => {
                let breakdown = RubricBreakdown {
                    keywords: clamp_points(raw.keywords, KEYWORDS_MAX),
                    skills: clamp_points(raw.skills, SKILLS_MAX),
                    experience: clamp_points(raw.experience, EXPERIENCE_MAX),
                    education: clamp_points(raw.education, EDUCATION_MAX),
                    format: clamp_points(raw.format, FORMAT_MAX),
                };
                (breakdown, breakdown.total())
            }
            (None, Some(score)) => (RubricBreakdown::default(), clamp_points(score, SCORE_MAX)),
            (None, None) => {
                return Err(FallbackUsed {
                    value: Self::fallback(requirements),
                    reason: FallbackReason::Invalid("neither score nor breakdown present"),
                })
            }
        };

        Ok(ResumeScore {
            score,
            matched: parsed.matched,
            missing: parsed.missing,
            breakdown,
        })
    }

    /// Zero score with every requirement reported missing.
    pub fn fallback(requirements: &[String]) -> ResumeScore {
        ResumeScore {
            score: 0,
            matched: Vec::new(),
            missing: requirements.to_vec(),
            breakdown: RubricBreakdown::default(),
        }
    }
}
