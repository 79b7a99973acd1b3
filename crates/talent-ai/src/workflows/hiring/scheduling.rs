//! Interview slot allocation.

use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::Serialize;

/// Source of the local wall-clock time slots are computed from.
pub type Clock = fn() -> NaiveDateTime;

pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InterviewSlot {
    pub start: NaiveDateTime,
    pub duration_minutes: u32,
}

impl InterviewSlot {
    pub fn end(&self) -> NaiveDateTime {
        self.start + Duration::minutes(i64::from(self.duration_minutes))
    }
}

/// Slots start on the first weekday at least `lead_days` after `now`, at `start_hour`, spaced
/// `spacing_minutes` apart. All times are local wall-clock times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulingPolicy {
    pub lead_days: i64,
    pub start_hour: u32,
    pub spacing_minutes: i64,
    pub duration_minutes: u32,
}

impl Default for SchedulingPolicy {
    fn default() -> Self {
        Self {
            lead_days: 2,
            start_hour: 14,
            spacing_minutes: 30,
            duration_minutes: 30,
        }
    }
}

impl SchedulingPolicy {
    pub fn first_slot_day(&self, now: NaiveDateTime) -> NaiveDate {
        let mut day = now.date() + Duration::days(self.lead_days);
        while matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            day = day + Duration::days(1);
        }
        day
    }

    pub fn slot(&self, now: NaiveDateTime, index: usize) -> InterviewSlot {
        let base = self
            .first_slot_day(now)
            .and_time(NaiveTime::MIN)
            + Duration::hours(i64::from(self.start_hour));
        let offset = self.spacing_minutes.saturating_mul(index as i64);

        InterviewSlot {
            start: base + Duration::minutes(offset),
            duration_minutes: self.duration_minutes,
        }
    }

    pub fn slots(&self, now: NaiveDateTime, count: usize) -> Vec<InterviewSlot> {
        (0..count).map(|index| self.slot(now, index)).collect()
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
    fn midweek_requests_land_two_days_out() {
        // Monday 2025-06-02 -> Wednesday.
        let policy = SchedulingPolicy::default();
        let day = policy.first_slot_day(at(2025, 6, 2, 9, 15));
        assert_eq!(day, NaiveDate::from_ymd_opt(2025, 6, 4).expect("valid"));
    }

    #[test]
    fn weekend_targets_roll_to_monday() {
        let policy = SchedulingPolicy::default();
        // Thursday + 2 = Saturday, Friday + 2 = Sunday.
        for now in [at(2025, 6, 5, 11, 0), at(2025, 6, 6, 23, 59)] {
            let day = policy.first_slot_day(now);
            assert_eq!(day.weekday(), Weekday::Mon);
            assert_eq!(day, NaiveDate::from_ymd_opt(2025, 6, 9).expect("valid"));
        }
    }

    #[test]
    fn slots_are_spaced_thirty_minutes_from_two_pm() {
        let policy = SchedulingPolicy::default();
        let slots = policy.slots(at(2025, 6, 2, 16, 45), 3);

        let starts: Vec<_> = slots.iter().map(|slot| slot.start).collect();
        assert_eq!(
            starts,
            vec![
                at(2025, 6, 4, 14, 0),
                at(2025, 6, 4, 14, 30),
                at(2025, 6, 4, 15, 0),
            ]
        );
        assert!(slots.iter().all(|slot| slot.duration_minutes == 30));
        assert_eq!(slots[0].end(), slots[1].start);
    }

    #[test]
    fn slots_never_land_on_weekends() {
        let policy = SchedulingPolicy::default();
        let mut now = at(2025, 6, 1, 8, 0);
        for _ in 0..14 {
            let slot = policy.slot(now, 0);
            assert!(!matches!(slot.start.weekday(), Weekday::Sat | Weekday::Sun));
            assert!(slot.start.date() >= now.date() + Duration::days(2));
            now += Duration::days(1);
        }
    }
}
