/// Time-decayed popularity score
///
/// `score = view_count * decay_factor ^ age_days` where
/// `decay_factor = target_fraction ^ (1 / half_life_days)`, so a post's
/// weight falls to `target_fraction` of its raw count after `half_life_days`.
use chrono::{DateTime, Utc};
use thiserror::Error;

pub const SECONDS_PER_DAY: f64 = 86_400.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoringError {
    #[error("decay target fraction must be in (0, 1), got {0}")]
    InvalidTargetFraction(f64),
    #[error("decay half-life must be a positive number of days, got {0}")]
    InvalidHalfLife(f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecayScorer {
    decay_factor: f64,
}

impl DecayScorer {
    pub fn new(target_fraction: f64, half_life_days: f64) -> Result<Self, ScoringError> {
        if !(target_fraction > 0.0 && target_fraction < 1.0) {
            return Err(ScoringError::InvalidTargetFraction(target_fraction));
        }
        if !(half_life_days.is_finite() && half_life_days > 0.0) {
            return Err(ScoringError::InvalidHalfLife(half_life_days));
        }

        Ok(Self {
            decay_factor: target_fraction.powf(1.0 / half_life_days),
        })
    }

    /// Per-day multiplier, strictly between 0 and 1.
    pub fn decay_factor(&self) -> f64 {
        self.decay_factor
    }

    pub fn score(&self, view_count: u64, age_days: f64) -> f64 {
        if view_count == 0 {
            return 0.0;
        }
        // future-dated posts and NaN ages count as brand new
        let age = if age_days.is_nan() || age_days < 0.0 {
            0.0
        } else {
            age_days
        };
        view_count as f64 * self.decay_factor.powf(age)
    }

    /// Score a post published at `published`, as seen at `now`.
    ///
    /// A post without a publish date is treated as infinitely old.
    pub fn score_at(
        &self,
        view_count: u64,
        published: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> f64 {
        match published {
            Some(published) => self.score(view_count, age_days(now, published)),
            None => 0.0,
        }
    }
}

/// Fractional days elapsed between `published` and `now`.
pub fn age_days(now: DateTime<Utc>, published: DateTime<Utc>) -> f64 {
    (now - published).num_milliseconds() as f64 / 1000.0 / SECONDS_PER_DAY
}
