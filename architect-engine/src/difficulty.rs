//! Difficulty tiers and their base XP values.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::{EASY_XP, EPIC_XP, HARD_XP, MEDIUM_XP};
use crate::error::EngineError;

/// Difficulty tier attached to every task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Epic,
}

impl Difficulty {
    pub const ALL: [Self; 4] = [Self::Easy, Self::Medium, Self::Hard, Self::Epic];

    /// Stored label, matching the persisted task column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "EASY",
            Self::Medium => "MEDIUM",
            Self::Hard => "HARD",
            Self::Epic => "EPIC",
        }
    }

    /// Base XP used when no reward configuration overrides it.
    #[must_use]
    pub const fn default_xp(self) -> u64 {
        match self {
            Self::Easy => EASY_XP,
            Self::Medium => MEDIUM_XP,
            Self::Hard => HARD_XP,
            Self::Epic => EPIC_XP,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();
        Self::ALL
            .into_iter()
            .find(|tier| tier.as_str().eq_ignore_ascii_case(label))
            .ok_or_else(|| EngineError::InvalidDifficulty {
                label: s.to_string(),
            })
    }
}

/// Base XP per difficulty tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyXp {
    #[serde(default = "DifficultyXp::default_easy")]
    pub easy: u64,
    #[serde(default = "DifficultyXp::default_medium")]
    pub medium: u64,
    #[serde(default = "DifficultyXp::default_hard")]
    pub hard: u64,
    #[serde(default = "DifficultyXp::default_epic")]
    pub epic: u64,
}

impl DifficultyXp {
    const fn default_easy() -> u64 {
        Difficulty::Easy.default_xp()
    }

    const fn default_medium() -> u64 {
        Difficulty::Medium.default_xp()
    }

    const fn default_hard() -> u64 {
        Difficulty::Hard.default_xp()
    }

    const fn default_epic() -> u64 {
        Difficulty::Epic.default_xp()
    }

    #[must_use]
    pub const fn for_tier(&self, tier: Difficulty) -> u64 {
        match tier {
            Difficulty::Easy => self.easy,
            Difficulty::Medium => self.medium,
            Difficulty::Hard => self.hard,
            Difficulty::Epic => self.epic,
        }
    }
}

impl Default for DifficultyXp {
    fn default() -> Self {
        Self {
            easy: Self::default_easy(),
            medium: Self::default_medium(),
            hard: Self::default_hard(),
            epic: Self::default_epic(),
        }
    }
}
