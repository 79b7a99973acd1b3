use super::{CandidateRanking, CounterOfferDraft, JobDraft, SalaryOfferDraft};
use crate::workflows::hiring::domain::{Candidate, Employee, SalaryRange};

const INTERVIEW_QUESTIONS: [&str; 5] = [
    "Tell me about your experience in this field.",
    "What are your greatest strengths?",
    "Where do you see yourself in 5 years?",
    "Describe a challenging project you worked on.",
    "Why are you interested in this position?",
];

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn job_posting(employee: &Employee, prose: &str) -> JobDraft {
    let description = if prose.is_empty() {
        format!(
            "We are looking for a {} to join our {} team.",
            employee.position, employee.department
        )
    } else {
        prose.to_string()
    };

    JobDraft {
        title: format!("{} - {}", employee.position, employee.department),
        description,
        requirements: vec![
            format!("Experience in {}", employee.department),
            "Strong communication skills".to_string(),
            "Team player".to_string(),
            "Problem-solving abilities".to_string(),
        ],
        salary_range: SalaryRange {
            min: round_cents(employee.salary * 0.9),
            max: round_cents(employee.salary * 1.2),
        },
    }
}

/// `min(10, experience_years + distinct_skill_count)`.
pub fn candidate_score(candidate: &Candidate) -> u8 {
    let raw = u64::from(candidate.experience_years) + candidate.distinct_skill_count() as u64;
    raw.min(10) as u8
}

pub fn candidate_rankings(candidates: &[Candidate]) -> Vec<CandidateRanking> {
    candidates
        .iter()
        .map(|candidate| CandidateRanking {
            candidate_id: candidate.id.0.clone(),
            score: candidate_score(candidate),
        })
        .collect()
}

pub fn interview_questions() -> Vec<String> {
    INTERVIEW_QUESTIONS
        .iter()
        .map(|question| question.to_string())
        .collect()
}

/// Range minimum plus 5% per year of experience (capped at 30%), never above the range maximum.
pub fn salary_offer(candidate: &Candidate, range: &SalaryRange) -> SalaryOfferDraft {
    let experience_bonus = (f64::from(candidate.experience_years) * 0.05).min(0.3);
    let amount = (range.min * (1.0 + experience_bonus)).min(range.max);

    SalaryOfferDraft {
        amount: round_cents(amount),
        reasoning: format!(
            "Based on {} years of experience and market rates",
            candidate.experience_years
        ),
    }
}

pub fn counter_offer(candidate: &Candidate, original_offer: f64) -> CounterOfferDraft {
    let expected = candidate.expected_salary.unwrap_or(original_offer * 1.1);
    if expected > original_offer {
        CounterOfferDraft {
            amount: round_cents((expected * 0.95).min(original_offer * 1.15)),
            reasoning: "Adjusted based on candidate's expectations".to_string(),
            should_counter: true,
        }
    } else {
        CounterOfferDraft {
            amount: original_offer,
            reasoning: "Original offer already meets the candidate's expectations".to_string(),
            should_counter: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::hiring::domain::Applicant;
    use chrono::Utc;

    fn candidate(years: u32, expected: Option<f64>) -> Candidate {
        Candidate::from_applicant(
            Applicant {
                id: "c".to_string(),
                name: "C".to_string(),
                email: "c@example.com".to_string(),
                phone: String::new(),
                resume_ref: String::new(),
                experience_years: years,
                skills: Vec::new(),
                current_salary: None,
                expected_salary: expected,
            },
            Utc::now(),
        )
    }

    #[test]
    fn salary_offer_applies_capped_experience_bonus() {
        let range = SalaryRange {
            min: 100_000.0,
            max: 200_000.0,
        };
        assert_eq!(salary_offer(&candidate(2, None), &range).amount, 110_000.0);
        assert_eq!(salary_offer(&candidate(12, None), &range).amount, 130_000.0);

        let tight = SalaryRange {
            min: 100_000.0,
            max: 105_000.0,
        };
        assert_eq!(salary_offer(&candidate(4, None), &tight).amount, 105_000.0);
    }

    #[test]
    fn counter_offer_meets_expectations_halfway() {
        let counter = counter_offer(&candidate(3, Some(100_000.0)), 80_000.0);
        assert!(counter.should_counter);
        assert_eq!(counter.amount, 92_000.0);

        let close = counter_offer(&candidate(3, Some(84_000.0)), 80_000.0);
        assert_eq!(close.amount, 79_800.0);
    }

    #[test]
    fn counter_offer_declines_when_expectation_already_met() {
        let counter = counter_offer(&candidate(3, Some(70_000.0)), 80_000.0);
        assert!(!counter.should_counter);
        assert_eq!(counter.amount, 80_000.0);
    }

    #[test]
    fn counter_offer_assumes_ten_percent_when_expectation_unknown() {
        let counter = counter_offer(&candidate(3, None), 80_000.0);
        assert!(counter.should_counter);
        assert_eq!(counter.amount, 83_600.0);
    }

    #[test]
    fn candidate_score_is_capped_at_ten() {
        assert_eq!(candidate_score(&candidate(15, None)), 10);
        assert_eq!(candidate_score(&candidate(0, None)), 0);
    }
}
