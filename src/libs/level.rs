//! Experience points and levels.
//!
//! Every level has a fixed XP threshold that must be reached to move past it.
//! The table is hand-tuned up to level 9; from level 10 on every level costs
//! another 5000 XP.
//!
//! ```text
//! level      1    2    3     4     5     6     7      8      9     10     11 ...
//! threshold 100  250  500  1000  2000  4000  7000  10000  15000  20000  25000 ...
//! ```

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Level every new user starts at.
pub const STARTING_LEVEL: i64 = 1;

/// Threshold to leave the starting level.
pub const STARTING_THRESHOLD: i64 = 100;

const THRESHOLDS: [i64; 9] = [100, 250, 500, 1000, 2000, 4000, 7000, 10000, 15000];

/// Highest level covered by the fixed table, and its threshold.
const TABLE_LEVELS: i64 = THRESHOLDS.len() as i64;
const TABLE_TOP: i64 = THRESHOLDS[THRESHOLDS.len() - 1];

/// Per-level increment once the fixed table runs out.
const LATE_LEVEL_STEP: i64 = 5000;

/// XP needed to advance past `level`. Levels below 1 have a threshold of 0.
pub fn threshold_for(level: i64) -> i64 {
    match level {
        l if l < 1 => 0,
        l if l <= TABLE_LEVELS => THRESHOLDS[(l - 1) as usize],
        l => TABLE_TOP.saturating_add((l - TABLE_LEVELS).saturating_mul(LATE_LEVEL_STEP)),
    }
}

/// First level whose threshold lies above `xp`, for totals past the fixed table.
fn late_level_for(xp: i64) -> i64 {
    TABLE_LEVELS + (xp - TABLE_TOP) / LATE_LEVEL_STEP + 1
}

/// Advances `level` while `xp` meets the current threshold.
///
/// Steps through the fixed table one level at a time and jumps straight to
/// the target level past it. A saturated threshold stops the climb.
pub fn recompute_level(xp: i64, level: i64, threshold: i64) -> (i64, i64) {
    let mut level = level.max(STARTING_LEVEL);
    let mut threshold = threshold;
    while xp >= threshold && threshold < i64::MAX {
        level = if level >= TABLE_LEVELS && xp >= TABLE_TOP {
            (level + 1).max(late_level_for(xp))
        } else {
            level + 1
        };
        threshold = threshold_for(level);
    }
    (level, threshold)
}

/// Level an account with `xp` points would be at when starting from scratch.
pub fn level_for_xp(xp: i64) -> (i64, i64) {
    recompute_level(xp, STARTING_LEVEL, STARTING_THRESHOLD)
}

/// Gamification state of one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gamification {
    pub user_id: String,
    pub xp: i64,
    pub level: i64,
    pub next_level_xp: i64,
    pub streak_days: i64,
    pub last_interaction: Option<DateTime<FixedOffset>>,
}

impl Gamification {
    /// Zeroed record of a freshly registered user.
    pub fn new(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            xp: 0,
            level: STARTING_LEVEL,
            next_level_xp: STARTING_THRESHOLD,
            streak_days: 0,
            last_interaction: None,
        }
    }

    /// Credits `points` and levels up as far as the new total allows.
    pub fn award(&mut self, points: i64) {
        self.xp = self.xp.saturating_add(points.max(0));
        let (level, threshold) = recompute_level(self.xp, self.level, self.next_level_xp);
        self.level = level;
        self.next_level_xp = threshold;
    }

    /// Share of the way from the current level's floor to the next threshold, in percent.
    pub fn progress_percent(&self) -> f64 {
        let floor = threshold_for(self.level - 1);
        let span = self.next_level_xp - floor;
        if span <= 0 {
            return 0.0;
        }
        (((self.xp - floor) as f64 / span as f64) * 100.0).clamp(0.0, 100.0)
    }
}

/// Fields of a gamification update. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GamificationPatch {
    pub xp: Option<i64>,
    pub level: Option<i64>,
    pub next_level_xp: Option<i64>,
    pub streak_days: Option<i64>,
    pub last_interaction: Option<DateTime<FixedOffset>>,
}

impl GamificationPatch {
    pub fn progress(record: &Gamification) -> Self {
        Self {
            xp: Some(record.xp),
            level: Some(record.level),
            next_level_xp: Some(record.next_level_xp),
            ..Default::default()
        }
    }

    pub fn apply(&self, record: &mut Gamification) {
        if let Some(xp) = self.xp {
            record.xp = xp;
        }
        if let Some(level) = self.level {
            record.level = level;
        }
        if let Some(next_level_xp) = self.next_level_xp {
            record.next_level_xp = next_level_xp;
        }
        if let Some(streak_days) = self.streak_days {
            record.streak_days = streak_days;
        }
        if let Some(last_interaction) = self.last_interaction {
            record.last_interaction = Some(last_interaction);
        }
    }
}
