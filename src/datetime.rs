//! SAS epoch date/time conversions (spec.md §3 "SAS epoch", §4.J, §9
//! "Date/time").
//!
//! SAS stores dates, times, and datetimes as IEEE-754 doubles relative to
//! 1960-01-01T00:00:00 local time. A naive `(instant - epoch).as_seconds()`
//! overcounts across a DST transition, so datetime conversion attaches both
//! endpoints to the local zone and subtracts zoned instants, mirroring the
//! teacher's `convert_sas_time` (which performs the same subtraction on the
//! read side).

use time::{Date, Month, OffsetDateTime, Time, UtcOffset};

use crate::error::{Error, Result};

fn sas_epoch_date() -> Date {
    Date::from_calendar_date(1960, Month::January, 1).expect("1960-01-01 is a valid date")
}

/// The local UTC offset to use for a given local wall-clock instant.
///
/// Falls back to UTC (offset zero) if the platform cannot resolve a local
/// offset — mirroring how a headless/containerised host with no tzdata
/// would behave, rather than failing the whole export.
fn local_offset_for(date: Date, time: Time) -> UtcOffset {
    let naive = OffsetDateTime::new_utc(date, time);
    UtcOffset::local_offset_at(naive).unwrap_or(UtcOffset::UTC)
}

/// Converts a calendar date to SAS's days-since-epoch encoding.
#[must_use]
pub fn date_to_sas(date: Date) -> f64 {
    f64::from((date - sas_epoch_date()).whole_days() as i32)
}

/// Converts a time of day to SAS's seconds-since-midnight encoding.
#[must_use]
pub fn time_to_sas(time: Time) -> f64 {
    let (h, m, s, nanos) = time.as_hms_nano();
    f64::from(h) * 3600.0 + f64::from(m) * 60.0 + f64::from(s) + f64::from(nanos) / 1e9
}

/// Converts a local calendar datetime to SAS's seconds-since-epoch
/// encoding, DST-aware.
///
/// Both the epoch and `dt` are attached to the local zone in effect at
/// their own instant before subtracting, so a transition between them
/// (e.g. a spring-forward that elapses between 1960-01-01 and `dt`) is
/// accounted for exactly once rather than folded into the wall-clock
/// difference.
///
/// # Errors
///
/// Returns [`Error::Invariant`] if the resulting offset arithmetic
/// overflows `time`'s internal duration range; this cannot happen for any
/// date representable by [`time::Date`] in practice and indicates a
/// defect if it does.
pub fn datetime_to_sas(dt: OffsetDateTime) -> Result<f64> {
    let local_date = dt.date();
    let local_time = dt.time();
    let epoch_offset = local_offset_for(sas_epoch_date(), Time::MIDNIGHT);
    let value_offset = local_offset_for(local_date, local_time);

    let epoch_instant = OffsetDateTime::new_in_offset(sas_epoch_date(), Time::MIDNIGHT, epoch_offset);
    let value_instant = OffsetDateTime::new_in_offset(local_date, local_time, value_offset);

    let delta = value_instant - epoch_instant;
    let seconds = delta.as_seconds_f64();
    if !seconds.is_finite() {
        return Err(Error::invariant(
            crate::error::ExportStage::Row { index: 0 },
            "datetime-to-SAS-epoch conversion produced a non-finite value",
        ));
    }
    Ok(seconds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, time};

    #[test]
    fn epoch_date_converts_to_zero() {
        assert_eq!(date_to_sas(sas_epoch_date()), 0.0);
    }

    #[test]
    fn one_day_after_epoch_is_one() {
        assert_eq!(date_to_sas(date!(1960 - 01 - 02)), 1.0);
    }

    #[test]
    fn midnight_is_zero_seconds() {
        assert_eq!(time_to_sas(Time::MIDNIGHT), 0.0);
    }

    #[test]
    fn noon_is_half_a_day_in_seconds() {
        assert_eq!(time_to_sas(time!(12:00:00)), 43_200.0);
    }

    #[test]
    fn datetime_at_epoch_is_zero() {
        let dt = OffsetDateTime::new_utc(sas_epoch_date(), Time::MIDNIGHT);
        assert_eq!(datetime_to_sas(dt).unwrap(), 0.0);
    }

    #[test]
    fn datetime_one_day_later_is_one_day_in_seconds() {
        let dt = OffsetDateTime::new_utc(date!(1960 - 01 - 02), Time::MIDNIGHT);
        assert_eq!(datetime_to_sas(dt).unwrap(), 86_400.0);
    }
}
