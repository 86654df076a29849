//! Daily streak tracking.
//!
//! A streak counts consecutive calendar days with at least one check-in. Days
//! are taken in the timezone of the `now` passed in, and the stored
//! last-interaction timestamp is converted into that timezone before its date
//! is compared.

use crate::db::store::RecordStore;
use crate::error::Result;
use crate::libs::level::GamificationPatch;
use chrono::{DateTime, Days, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckIn {
    pub streak: i64,
    /// True when the streak was carried over from yesterday or already
    /// counted today; false when it started over.
    pub extended: bool,
}

/// Decision table for one check-in.
///
/// | last check-in   | streak      | extended |
/// |-----------------|-------------|----------|
/// | never           | 1           | false    |
/// | yesterday       | current + 1 | true     |
/// | today           | current     | true     |
/// | anything else   | 1           | false    |
pub fn next_streak(last: Option<NaiveDate>, today: NaiveDate, current: i64) -> CheckIn {
    let yesterday = today.checked_sub_days(Days::new(1));
    match last {
        Some(last) if Some(last) == yesterday => CheckIn {
            streak: current + 1,
            extended: true,
        },
        Some(last) if last == today => CheckIn {
            streak: current,
            extended: true,
        },
        _ => CheckIn {
            streak: 1,
            extended: false,
        },
    }
}

/// Evaluates and persists a check-in for `user_id` at `now`.
///
/// The last-interaction timestamp is refreshed to `now` on every call, even
/// when the streak is unchanged. A user without a gamification record is
/// treated as never having checked in and gets a record created.
pub fn check_in<S, Tz>(store: &S, user_id: &str, now: &DateTime<Tz>) -> Result<CheckIn>
where
    S: RecordStore + ?Sized,
    Tz: TimeZone,
{
    let today = now.date_naive();
    let record = store.get_gamification(user_id)?;

    let (last, current) = match &record {
        Some(record) => (
            record.last_interaction.map(|at| at.with_timezone(&now.timezone()).date_naive()),
            record.streak_days,
        ),
        None => (None, 0),
    };
    let outcome = next_streak(last, today, current);

    let patch = GamificationPatch {
        streak_days: Some(outcome.streak),
        last_interaction: Some(now.fixed_offset()),
        ..Default::default()
    };
    store.update_gamification(user_id, &patch, now.with_timezone(&Utc))?;

    Ok(outcome)
}
