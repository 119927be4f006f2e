use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};

/// Timestamp for `hour:minute` on `day`. Hour 24 is accepted and lands on
/// the following midnight, so a work day may end at 24.
pub fn day_at(day: NaiveDate, hour: u32, minute: u32) -> DateTime<Utc> {
    let midnight = day.and_time(NaiveTime::default());
    Utc.from_utc_datetime(&midnight)
        + Duration::hours(i64::from(hour))
        + Duration::minutes(i64::from(minute))
}

pub fn format_slot(slot: &DateTime<Utc>) -> String {
    slot.format("%H:%M").to_string()
}
