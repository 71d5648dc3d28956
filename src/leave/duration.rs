use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::calendar::NonWorkingDays;
use crate::error::LeaveError;
use crate::model::leave_request::{HalfDay, LeaveCategory};

/// Turns a date range into chargeable working days.
#[derive(Clone)]
pub struct DurationCalculator {
    calendar: Arc<dyn NonWorkingDays>,
}

impl DurationCalculator {
    pub fn new(calendar: Arc<dyn NonWorkingDays>) -> Self {
        Self { calendar }
    }

    /// Walks `start..=end`, skipping non-working days.
    ///
    /// Each working day counts 1, or 0.5 when the category is half-day, or
    /// when a half-day marker is set and the day is the end date. A range
    /// with no working day at all is refused.
    pub fn chargeable_days(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        category: LeaveCategory,
        half_day: Option<HalfDay>,
    ) -> Result<Decimal, LeaveError> {
        if end < start {
            return Err(LeaveError::InvalidRange { start, end });
        }

        let half = Decimal::new(5, 1);
        let total: Decimal = start
            .iter_days()
            .take_while(|date| *date <= end)
            .filter(|date| !self.calendar.is_non_working_day(*date))
            .map(|date| {
                if category == LeaveCategory::HalfDay || (half_day.is_some() && date == end) {
                    half
                } else {
                    Decimal::ONE
                }
            })
            .sum();

        if total.is_zero() {
            return Err(LeaveError::AllNonWorkingDays { start, end });
        }
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::HolidayCalendar;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn calculator() -> DurationCalculator {
        DurationCalculator::new(Arc::new(HolidayCalendar::default()))
    }

    #[test]
    fn friday_to_monday_skips_the_weekend() {
        let days = calculator()
            .chargeable_days(date(1, 12), date(1, 15), LeaveCategory::Ordinary, None)
            .unwrap();
        assert_eq!(days, Decimal::new(2, 0));
    }

    #[test]
    fn half_day_marker_only_halves_the_end_date() {
        let days = calculator()
            .chargeable_days(
                date(1, 8),
                date(1, 10),
                LeaveCategory::CompOff,
                Some(HalfDay::SecondHalf),
            )
            .unwrap();
        assert_eq!(days, Decimal::new(25, 1));
    }

    #[test]
    fn half_day_marker_on_a_weekend_end_date_changes_nothing() {
        let days = calculator()
            .chargeable_days(
                date(1, 12),
                date(1, 13),
                LeaveCategory::Ordinary,
                Some(HalfDay::FirstHalf),
            )
            .unwrap();
        assert_eq!(days, Decimal::ONE);
    }

    #[test]
    fn half_day_category_halves_every_working_day() {
        let days = calculator()
            .chargeable_days(date(1, 8), date(1, 14), LeaveCategory::HalfDay, None)
            .unwrap();
        assert_eq!(days, Decimal::new(25, 1));
    }

    #[test]
    fn holidays_are_skipped() {
        // 2024-01-26 is a Friday holiday
        let days = calculator()
            .chargeable_days(date(1, 25), date(1, 29), LeaveCategory::Ordinary, None)
            .unwrap();
        assert_eq!(days, Decimal::new(2, 0));
    }

    #[test]
    fn weekend_only_range_is_refused() {
        let err = calculator()
            .chargeable_days(date(1, 6), date(1, 7), LeaveCategory::CompOff, None)
            .unwrap_err();
        assert!(matches!(err, LeaveError::AllNonWorkingDays { .. }));
    }

    #[test]
    fn reversed_range_is_refused() {
        let err = calculator()
            .chargeable_days(date(1, 15), date(1, 12), LeaveCategory::Ordinary, None)
            .unwrap_err();
        assert!(matches!(err, LeaveError::InvalidRange { .. }));
    }
}
