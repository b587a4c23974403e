use chrono::{Datelike, Duration, NaiveDate};
use model::entities::transaction::Frequency;

/// Returns the number of days in the given month using chrono.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    // Create a date for the first day of the next month
    let next_month_year = year + (month / 12) as i32;
    let next_month = (month % 12) + 1;

    // Get the first day of the next month
    let first_day_next_month = NaiveDate::from_ymd_opt(next_month_year, next_month, 1).unwrap();

    // Go back one day to get the last day of the current month
    let last_day_current_month = first_day_next_month.pred_opt().unwrap();

    // The day of the month is the number of days in the month
    last_day_current_month.day()
}

/// Computes the due date that follows `current` for the given frequency.
///
/// Pure calendar stepping with no side effects. Monthly and yearly steps
/// preserve the day of month where the target month has that day and clamp
/// to the last valid day otherwise (Jan 31 + monthly lands on Feb 29 in a
/// leap year, Feb 28 otherwise).
pub fn next_occurrence(current: NaiveDate, frequency: Frequency) -> NaiveDate {
    match frequency {
        Frequency::Daily => current.succ_opt().unwrap(),
        Frequency::Weekly => current + Duration::days(7),
        Frequency::Biweekly => current + Duration::days(14),
        Frequency::Monthly => {
            // Add one month
            let year = current.year() + (current.month() / 12) as i32;
            let month = (current.month() % 12) + 1;
            let day = std::cmp::min(current.day(), days_in_month(year, month));
            NaiveDate::from_ymd_opt(year, month, day).unwrap()
        }
        Frequency::Yearly => {
            // Add one year
            let year = current.year() + 1;
            let month = current.month();
            let day = std::cmp::min(current.day(), days_in_month(year, month));
            NaiveDate::from_ymd_opt(year, month, day).unwrap()
        }
    }
}
