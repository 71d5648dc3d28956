use chrono::{Datelike, NaiveDate, Weekday};

/// Answers whether a date is a weekend or holiday.
///
/// Implementations must be pure: the same date always gives the same answer.
pub trait NonWorkingDays: Send + Sync {
    fn is_non_working_day(&self, date: NaiveDate) -> bool;
}

impl<F> NonWorkingDays for F
where
    F: Fn(NaiveDate) -> bool + Send + Sync,
{
    fn is_non_working_day(&self, date: NaiveDate) -> bool {
        self(date)
    }
}

/// Saturdays, Sundays and a fixed list of yearly holidays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HolidayCalendar {
    holidays: Vec<(u32, u32)>,
}

impl HolidayCalendar {
    /// `holidays` are `(month, day)` pairs repeated every year.
    pub fn new(holidays: Vec<(u32, u32)>) -> Self {
        Self { holidays }
    }

    /// Parses a comma separated `MM-DD` list, e.g. `01-26,08-15`.
    pub fn parse(list: &str) -> Result<Self, String> {
        let mut holidays = Vec::new();
        for item in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let (month, day) = item
                .split_once('-')
                .ok_or_else(|| format!("holiday '{item}' must be MM-DD"))?;
            let month: u32 = month
                .parse()
                .map_err(|_| format!("holiday '{item}' has an invalid month"))?;
            let day: u32 = day
                .parse()
                .map_err(|_| format!("holiday '{item}' has an invalid day"))?;
            // 2024 is a leap year so 02-29 is accepted
            if NaiveDate::from_ymd_opt(2024, month, day).is_none() {
                return Err(format!("holiday '{item}' is not a calendar day"));
            }
            holidays.push((month, day));
        }
        Ok(Self::new(holidays))
    }

    pub fn holidays(&self) -> &[(u32, u32)] {
        &self.holidays
    }
}

impl Default for HolidayCalendar {
    fn default() -> Self {
        Self::new(vec![(1, 1), (1, 26), (8, 15), (10, 2), (12, 25)])
    }
}

impl NonWorkingDays for HolidayCalendar {
    fn is_non_working_day(&self, date: NaiveDate) -> bool {
        matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
            || self.holidays.contains(&(date.month(), date.day()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn weekends_and_fixed_holidays_are_off() {
        let cal = HolidayCalendar::default();
        assert!(cal.is_non_working_day(date(2024, 1, 6))); // Saturday
        assert!(cal.is_non_working_day(date(2024, 1, 7))); // Sunday
        assert!(cal.is_non_working_day(date(2024, 1, 26))); // Friday holiday
        assert!(!cal.is_non_working_day(date(2024, 1, 9))); // Tuesday
    }

    #[test]
    fn parses_holiday_list() {
        let cal = HolidayCalendar::parse("05-01, 12-31").unwrap();
        assert_eq!(cal.holidays(), &[(5, 1), (12, 31)]);
        assert!(cal.is_non_working_day(date(2025, 5, 1)));
        assert!(!cal.is_non_working_day(date(2025, 1, 1)));
    }

    #[test]
    fn rejects_malformed_holidays() {
        assert!(HolidayCalendar::parse("0501").is_err());
        assert!(HolidayCalendar::parse("13-01").is_err());
        assert!(HolidayCalendar::parse("02-30").is_err());
        assert!(HolidayCalendar::parse("").unwrap().holidays().is_empty());
    }

    #[test]
    fn closures_act_as_calendars() {
        let never = |_: NaiveDate| false;
        assert!(!never.is_non_working_day(date(2024, 1, 6)));
    }
}
