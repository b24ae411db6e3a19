use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Datelike, NaiveDate, Utc};

/// Half-open reporting period `[start, end)` in calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start >= end {
            return Err(anyhow!(
                "reporting period is empty: start {start} is not before end {end}"
            ));
        }
        Ok(Self { start, end })
    }

    /// The whole calendar month `YYYY-MM`.
    pub fn month(value: &str) -> Result<Self> {
        let first = NaiveDate::parse_from_str(&format!("{}-01", value.trim()), "%Y-%m-%d")
            .with_context(|| format!("invalid month {value:?}, expected YYYY-MM"))?;
        Self::new(first, next_month(first)?)
    }

    /// The calendar month before the one containing `today`.
    pub fn previous_month(today: NaiveDate) -> Result<Self> {
        let this_month = today
            .with_day(1)
            .ok_or_else(|| anyhow!("cannot compute first day of {today}"))?;
        let start = if this_month.month() == 1 {
            NaiveDate::from_ymd_opt(this_month.year() - 1, 12, 1)
        } else {
            NaiveDate::from_ymd_opt(this_month.year(), this_month.month() - 1, 1)
        }
        .ok_or_else(|| anyhow!("cannot compute month before {today}"))?;
        Self::new(start, this_month)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Midnight UTC at the start of the window.
    pub fn since(&self) -> DateTime<Utc> {
        self.start.and_time(chrono::NaiveTime::MIN).and_utc()
    }

    /// Midnight UTC at the (exclusive) end of the window.
    pub fn until(&self) -> DateTime<Utc> {
        self.end.and_time(chrono::NaiveTime::MIN).and_utc()
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.since() && at < self.until()
    }
}

pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .with_context(|| format!("invalid date {value:?}, expected YYYY-MM-DD"))
}

fn next_month(first: NaiveDate) -> Result<NaiveDate> {
    let next = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
    };
    next.ok_or_else(|| anyhow!("cannot compute month after {first}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn month_spans_first_to_first_of_next() {
        let window = DateWindow::month("2025-07").unwrap();
        assert_eq!(window.start(), date(2025, 7, 1));
        assert_eq!(window.end(), date(2025, 8, 1));

        let december = DateWindow::month("2024-12").unwrap();
        assert_eq!(december.end(), date(2025, 1, 1));
    }

    #[test]
    fn previous_month_wraps_the_year() {
        let window = DateWindow::previous_month(date(2026, 1, 17)).unwrap();
        assert_eq!(window.start(), date(2025, 12, 1));
        assert_eq!(window.end(), date(2026, 1, 1));
    }

    #[test]
    fn rejects_empty_or_inverted_periods() {
        assert!(DateWindow::new(date(2025, 8, 1), date(2025, 8, 1)).is_err());
        assert!(DateWindow::new(date(2025, 8, 2), date(2025, 8, 1)).is_err());
        assert!(DateWindow::month("2025-13").is_err());
        assert!(parse_date("07/01/2025").is_err());
    }

    #[test]
    fn end_is_exclusive() {
        let window = DateWindow::month("2025-07").unwrap();
        let last_second = "2025-07-31T23:59:59Z".parse::<DateTime<Utc>>().unwrap();
        let next_midnight = "2025-08-01T00:00:00Z".parse::<DateTime<Utc>>().unwrap();

        assert!(window.contains(window.since()));
        assert!(window.contains(last_second));
        assert!(!window.contains(next_midnight));
        assert_eq!(window.until().to_rfc3339(), "2025-08-01T00:00:00+00:00");
    }
}
