//! Local calendar days expressed as UTC ranges.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use summary_core::SummaryDate;

/// The UTC instants bounding one local calendar day, both inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayRange {
    pub start: DateTime<Utc>,
    /// One millisecond before the next local day starts.
    pub end: DateTime<Utc>,
}

/// Compute the UTC range covering `date` in `tz`.
///
/// Returns `None` only for dates at the very end of chrono's range.
pub fn day_range(date: SummaryDate, tz: Tz) -> Option<DayRange> {
    let day = date.naive();
    let start = local_day_start(day, tz)?;
    let next = local_day_start(day.succ_opt()?, tz)?;

    Some(DayRange {
        start,
        end: next - Duration::milliseconds(1),
    })
}

/// Today's calendar date in `tz`.
pub fn today(tz: Tz) -> SummaryDate {
    SummaryDate::new(Utc::now().with_timezone(&tz).date_naive())
}

/// First instant of a local day. Midnight can fall in a DST gap in some
/// zones; the day then starts at the first valid minute after it.
fn local_day_start(day: NaiveDate, tz: Tz) -> Option<DateTime<Utc>> {
    let midnight = day.and_time(NaiveTime::MIN);

    (0..=24 * 60)
        .map(|minutes| midnight + Duration::minutes(minutes))
        .find_map(|local| tz.from_local_datetime(&local).earliest())
        .map(|dt| dt.with_timezone(&Utc))
}
