use time::error::ComponentRange;
use time::OffsetDateTime;

/// Timestamps are persisted as unix epoch milliseconds so that expiry checks
/// are plain integer comparisons inside SQL.
pub fn to_millis(at: OffsetDateTime) -> i64 {
    (at.unix_timestamp_nanos() / 1_000_000) as i64
}

pub fn from_millis(millis: i64) -> Result<OffsetDateTime, ComponentRange> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
}
