use anyhow::Context;
use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Weekday};
use chrono_tz::Tz;

/// Timestamp format used in the report header.
const HEADER_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// The inclusive timestamp range one run scans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportWindow {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

impl ReportWindow {
    pub fn start_ts(&self) -> i64 {
        self.start.timestamp()
    }

    pub fn end_ts(&self) -> i64 {
        self.end.timestamp()
    }

    /// Both endpoints are in scope.
    #[allow(clippy::cast_precision_loss)]
    pub fn contains(&self, ts: f64) -> bool {
        ts >= self.start_ts() as f64 && ts <= self.end_ts() as f64
    }

    /// Human-readable bounds for the report header.
    pub fn label(&self) -> String {
        format!(
            "{} - {}",
            self.start.format(HEADER_FORMAT),
            self.end.format(HEADER_FORMAT)
        )
    }
}

/// Resolve the window for a run happening on `today`.
///
/// Tuesday through Friday scan yesterday, midnight to midnight minus one
/// second. Monday scans Friday 00:00:00 through Sunday 23:59:59, so messages
/// posted over the weekend land in Monday's report. Saturday and Sunday runs
/// are gated off at the command level, not here.
pub fn resolve(today: NaiveDate, tz: Tz) -> anyhow::Result<ReportWindow> {
    let days_back = if today.weekday() == Weekday::Mon { 3 } else { 1 };
    let start = midnight(today - Duration::days(days_back), tz)?;
    let end = midnight(today, tz)? - Duration::seconds(1);
    anyhow::ensure!(start < end, "window start must precede end");
    Ok(ReportWindow { start, end })
}

pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

fn midnight(date: NaiveDate, tz: Tz) -> anyhow::Result<DateTime<Tz>> {
    let naive = date
        .and_hms_opt(0, 0, 0)
        .context("constructing midnight timestamp")?;
    tz.from_local_datetime(&naive)
        .earliest()
        .with_context(|| format!("midnight does not exist in {tz} on {date}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Tz;

    const UTC: Tz = chrono_tz::UTC;
    const TOKYO: Tz = chrono_tz::Asia::Tokyo;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn tuesday_scans_yesterday() {
        // 2026-08-04 is a Tuesday
        let w = resolve(date(2026, 8, 4), UTC).unwrap();
        assert_eq!(w.start, UTC.with_ymd_and_hms(2026, 8, 3, 0, 0, 0).unwrap());
        assert_eq!(w.end, UTC.with_ymd_and_hms(2026, 8, 3, 23, 59, 59).unwrap());
        assert_eq!(w.end_ts() - w.start_ts(), 86_399);
    }

    #[test]
    fn friday_scans_thursday() {
        let w = resolve(date(2026, 8, 7), UTC).unwrap();
        assert_eq!(w.start, UTC.with_ymd_and_hms(2026, 8, 6, 0, 0, 0).unwrap());
        assert_eq!(w.end, UTC.with_ymd_and_hms(2026, 8, 6, 23, 59, 59).unwrap());
    }

    #[test]
    fn monday_spans_friday_through_sunday() {
        // 2026-08-03 is a Monday; the window reaches back to Friday 07-31
        let w = resolve(date(2026, 8, 3), UTC).unwrap();
        assert_eq!(w.start, UTC.with_ymd_and_hms(2026, 7, 31, 0, 0, 0).unwrap());
        assert_eq!(w.end, UTC.with_ymd_and_hms(2026, 8, 2, 23, 59, 59).unwrap());
        assert_eq!(w.end_ts() - w.start_ts(), 3 * 86_400 - 1);
    }

    #[test]
    fn both_endpoints_are_inclusive() {
        let w = resolve(date(2026, 8, 4), UTC).unwrap();
        let start = w.start_ts() as f64;
        let end = w.end_ts() as f64;
        assert!(w.contains(start));
        assert!(w.contains(end));
        assert!(!w.contains(start - 1.0));
        assert!(!w.contains(end + 1.0));
    }

    #[test]
    fn window_respects_configured_zone() {
        let utc = resolve(date(2026, 8, 4), UTC).unwrap();
        let tokyo = resolve(date(2026, 8, 4), TOKYO).unwrap();
        // Tokyo midnight comes nine hours before UTC midnight
        assert_eq!(utc.start_ts() - tokyo.start_ts(), 9 * 3600);
    }

    #[test]
    fn weekends_are_not_business_days() {
        assert!(is_business_day(date(2026, 8, 3)));
        assert!(is_business_day(date(2026, 8, 7)));
        assert!(!is_business_day(date(2026, 8, 1)));
        assert!(!is_business_day(date(2026, 8, 2)));
    }

    #[test]
    fn header_label_shows_both_bounds() {
        let w = resolve(date(2026, 8, 4), UTC).unwrap();
        assert_eq!(w.label(), "2026/08/03 00:00:00 - 2026/08/03 23:59:59");
    }
}
