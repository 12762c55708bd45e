//! Date gate for the experience letter.
//!
//! The letter unlocks on the internship end date. The state is derived on
//! every request and never stored, because the passage of time is the only
//! input that changes it.

use chrono::{FixedOffset, NaiveDate, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// Source of "today" for unlock checks and month codes.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Wall clock, read as a calendar date at a fixed UTC offset.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    offset: FixedOffset,
}

impl SystemClock {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new(super::model::dates::default_offset())
    }
}

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.offset).date_naive()
    }
}

/// Clock pinned to one date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Returns true iff `today >= end_date`. A missing end date stays locked.
pub fn is_unlocked(end_date: Option<NaiveDate>, today: NaiveDate) -> bool {
    match end_date {
        Some(end) => today >= end,
        None => false,
    }
}

/// Which letters an intern may download right now.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LetterAvailability {
    pub offer_letter: bool,
    pub experience_letter: bool,
    #[schema(value_type = Option<String>, example = "2024-04-10")]
    pub experience_letter_unlocks_on: Option<NaiveDate>,
}

impl LetterAvailability {
    pub fn evaluate(end_date: Option<NaiveDate>, today: NaiveDate) -> Self {
        Self {
            offer_letter: true,
            experience_letter: is_unlocked(end_date, today),
            experience_letter_unlocks_on: end_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_unlocked_after_end_date() {
        assert!(is_unlocked(Some(date(2024, 4, 10)), date(2024, 4, 11)));
        assert!(is_unlocked(Some(date(2023, 12, 31)), date(2024, 4, 11)));
    }

    #[test]
    fn test_unlocked_on_end_date() {
        assert!(is_unlocked(Some(date(2024, 4, 10)), date(2024, 4, 10)));
    }

    #[test]
    fn test_locked_before_end_date() {
        assert!(!is_unlocked(Some(date(2024, 4, 10)), date(2024, 4, 9)));
        assert!(!is_unlocked(Some(date(2025, 1, 1)), date(2024, 4, 9)));
    }

    #[test]
    fn test_missing_end_date_fails_closed() {
        assert!(!is_unlocked(None, date(2099, 1, 1)));
    }

    #[test]
    fn test_availability_always_offers_offer_letter() {
        let locked = LetterAvailability::evaluate(Some(date(2024, 4, 10)), date(2024, 3, 1));
        assert!(locked.offer_letter);
        assert!(!locked.experience_letter);
        assert_eq!(locked.experience_letter_unlocks_on, Some(date(2024, 4, 10)));

        let open = LetterAvailability::evaluate(Some(date(2024, 4, 10)), date(2024, 5, 1));
        assert!(open.experience_letter);
    }
}
