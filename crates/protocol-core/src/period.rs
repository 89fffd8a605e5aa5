// protocol-core/src/period.rs
//
// Pure period/epoch derivations. Core logic never reads an ambient clock;
// every caller passes the current timestamp explicitly so the whole engine
// can be driven with synthetic time in tests.

use crate::types::{PeriodIndex, Timestamp, HOUR_SECONDS, WEEK_SECONDS};
use chrono::{DateTime, Utc};

/// Period index containing `now`.
pub fn period_of(now: Timestamp) -> PeriodIndex {
    now / WEEK_SECONDS
}

/// First second of the given period.
pub fn period_start(period: PeriodIndex) -> Timestamp {
    period * WEEK_SECONDS
}

/// Epochs elapsed since `first_period`. Saturates at zero before emissions start.
pub fn epoch_of(now: Timestamp, first_period: PeriodIndex) -> u64 {
    period_of(now).saturating_sub(first_period)
}

/// True during the final hour before the next period boundary.
pub fn in_final_hour(now: Timestamp) -> bool {
    now % WEEK_SECONDS >= WEEK_SECONDS - HOUR_SECONDS
}

/// Period start rendered as a UTC datetime, for log fields only.
pub fn period_start_utc(period: PeriodIndex) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(period_start(period) as i64, 0)
}
