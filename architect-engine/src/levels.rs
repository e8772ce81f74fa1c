//! Level curve, level-up resolution, and rank titles.
use serde::{Deserialize, Serialize};

use crate::constants::{LEVEL_CURVE_BASE, LEVEL_CURVE_EXPONENT};
use crate::numbers::{floor_f64_to_u64, unit_ratio};
use crate::progression::UserProgression;

/// XP requirement curve `floor(base * level^exponent)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelCurve {
    #[serde(default = "LevelCurve::default_base")]
    pub base: f64,
    #[serde(default = "LevelCurve::default_exponent")]
    pub exponent: f64,
}

impl LevelCurve {
    const fn default_base() -> f64 {
        LEVEL_CURVE_BASE
    }

    const fn default_exponent() -> f64 {
        LEVEL_CURVE_EXPONENT
    }

    /// XP needed to clear `level`. Levels below 1 require nothing.
    #[must_use]
    pub fn xp_required(&self, level: u32) -> u64 {
        if level == 0 {
            return 0;
        }
        floor_f64_to_u64(self.base * f64::from(level).powf(self.exponent))
    }

    /// Convert surplus in-level XP into levels. Returns the number of levels gained.
    ///
    /// Terminates because a validated curve is strictly increasing and at least
    /// `base` for every level.
    pub fn resolve_level_ups(&self, progression: &mut UserProgression) -> u32 {
        let mut gained = 0;
        loop {
            let required = self.xp_required(progression.level);
            if required == 0 || progression.xp < required {
                break;
            }
            progression.xp -= required;
            progression.level = progression.level.saturating_add(1);
            gained += 1;
        }
        if gained > 0 {
            log::info!(
                "level up: +{gained} -> level {} ({} xp carried)",
                progression.level,
                progression.xp
            );
        }
        gained
    }

    /// Progress through the current level for display.
    #[must_use]
    pub fn progress(&self, progression: &UserProgression) -> LevelProgress {
        let required = self.xp_required(progression.level);
        LevelProgress {
            level: progression.level,
            rank: rank_title(progression.level),
            xp: progression.xp,
            required,
            fraction: unit_ratio(progression.xp, required),
        }
    }
}

impl Default for LevelCurve {
    fn default() -> Self {
        Self {
            base: Self::default_base(),
            exponent: Self::default_exponent(),
        }
    }
}

/// Snapshot of how far a user is into their current level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelProgress {
    pub level: u32,
    pub rank: &'static str,
    pub xp: u64,
    pub required: u64,
    pub fraction: f32,
}

/// Rank title shown next to the level.
#[must_use]
pub const fn rank_title(level: u32) -> &'static str {
    match level {
        0..=4 => "Novice",
        5..=9 => "Apprentice",
        10..=14 => "Journeyman",
        15..=19 => "Adept",
        20..=24 => "Expert",
        25..=29 => "Master",
        30..=39 => "Grandmaster",
        40..=49 => "Legend",
        _ => "Mythic",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_curve_matches_power_law() {
        let curve = LevelCurve::default();
        assert_eq!(curve.xp_required(0), 0);
        assert_eq!(curve.xp_required(1), 100);
        assert_eq!(curve.xp_required(2), 282);
        assert_eq!(curve.xp_required(3), 519);
        for level in 1..200 {
            assert!(curve.xp_required(level + 1) > curve.xp_required(level));
        }
    }

    #[test]
    fn resolve_level_ups_carries_remainder() {
        let curve = LevelCurve::default();
        let mut progression = UserProgression {
            xp: 100 + 282 + 5,
            ..UserProgression::default()
        };
        let gained = curve.resolve_level_ups(&mut progression);
        assert_eq!(gained, 2);
        assert_eq!(progression.level, 3);
        assert_eq!(progression.xp, 5);
    }

    #[test]
    fn resolve_level_ups_is_noop_below_requirement() {
        let curve = LevelCurve::default();
        let mut progression = UserProgression {
            xp: 99,
            ..UserProgression::default()
        };
        assert_eq!(curve.resolve_level_ups(&mut progression), 0);
        assert_eq!(progression.level, 1);
        assert_eq!(progression.xp, 99);
    }

    #[test]
    fn rank_titles_follow_bands() {
        assert_eq!(rank_title(1), "Novice");
        assert_eq!(rank_title(5), "Apprentice");
        assert_eq!(rank_title(14), "Journeyman");
        assert_eq!(rank_title(30), "Grandmaster");
        assert_eq!(rank_title(49), "Legend");
        assert_eq!(rank_title(50), "Mythic");
    }

    #[test]
    fn progress_reports_fraction() {
        let curve = LevelCurve::default();
        let progression = UserProgression {
            xp: 50,
            ..UserProgression::default()
        };
        let progress = curve.progress(&progression);
        assert_eq!(progress.required, 100);
        assert_eq!(progress.rank, "Novice");
        assert!((progress.fraction - 0.5).abs() < f32::EPSILON);
    }
}
