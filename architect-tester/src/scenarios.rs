use anyhow::{Result, ensure};
use std::ops::RangeInclusive;

use crate::simulation::SimulationSummary;

const HOUR: i64 = 3_600_000;
const MINUTE: i64 = 60_000;
const SECOND: i64 = 1_000;

/// How a simulated user plays each day.
#[derive(Debug, Clone)]
pub struct PlayPattern {
    pub tasks_per_day: RangeInclusive<u32>,
    /// Gap between consecutive completions on the same day.
    pub spacing_millis: RangeInclusive<i64>,
    /// Draw titles from this many recurring chores; `None` makes every title unique.
    pub title_pool: Option<usize>,
    pub skip_day_chance: f64,
    pub revert_chance: f64,
    pub min_days: u32,
}

impl PlayPattern {
    const fn daily(tasks_per_day: RangeInclusive<u32>, spacing_millis: RangeInclusive<i64>) -> Self {
        Self {
            tasks_per_day,
            spacing_millis,
            title_pool: None,
            skip_day_chance: 0.0,
            revert_chance: 0.0,
            min_days: 1,
        }
    }
}

pub type Expectation = fn(&SimulationSummary) -> Result<()>;

#[derive(Debug, Clone)]
pub struct Scenario {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub pattern: PlayPattern,
    pub expectations: Vec<Expectation>,
}

impl Scenario {
    /// Days to simulate when the caller asked for `requested`.
    pub fn days(&self, requested: u32) -> u32 {
        requested.max(self.pattern.min_days)
    }
}

pub fn catalog() -> Vec<Scenario> {
    vec![
        Scenario {
            key: "steady",
            name: "Steady Habits",
            description: "A few distinct tasks every day, hours apart",
            pattern: PlayPattern::daily(2..=4, 2 * HOUR..=4 * HOUR),
            expectations: vec![unbroken_streak],
        },
        Scenario {
            key: "burst",
            name: "Burst Clicking",
            description: "Many completions seconds apart to trigger velocity damping",
            pattern: PlayPattern::daily(6..=9, SECOND..=3 * SECOND),
            expectations: vec![velocity_damped],
        },
        Scenario {
            key: "grind",
            name: "Daily Grind",
            description: "Twenty-plus tasks a day walking through every diminishing tier",
            pattern: PlayPattern::daily(18..=24, MINUTE..=5 * MINUTE),
            expectations: vec![deepest_tier_reached],
        },
        Scenario {
            key: "repeat",
            name: "Recurring Chores",
            description: "The same few titles over and over inside the repetition window",
            pattern: PlayPattern {
                title_pool: Some(2),
                ..PlayPattern::daily(3..=5, HOUR..=3 * HOUR)
            },
            expectations: vec![repeats_detected],
        },
        Scenario {
            key: "gap",
            name: "Patchy Attendance",
            description: "Randomly skipped days and occasional reverts",
            pattern: PlayPattern {
                skip_day_chance: 0.3,
                revert_chance: 0.1,
                ..PlayPattern::daily(1..=3, HOUR..=4 * HOUR)
            },
            expectations: vec![gaps_reset_streak],
        },
        Scenario {
            key: "marathon",
            name: "Marathon Streak",
            description: "Daily completions for over a month to hit every milestone",
            pattern: PlayPattern {
                min_days: 45,
                ..PlayPattern::daily(1..=2, 3 * HOUR..=6 * HOUR)
            },
            expectations: vec![unbroken_streak, milestones_paid],
        },
    ]
}

pub fn find_scenario(key: &str) -> Option<Scenario> {
    let key = key.trim().to_lowercase();
    catalog().into_iter().find(|scenario| scenario.key == key)
}

pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    catalog()
        .into_iter()
        .map(|scenario| (scenario.key, scenario.description))
        .collect()
}

fn unbroken_streak(summary: &SimulationSummary) -> Result<()> {
    ensure!(
        summary.streak_resets == 0,
        "expected no streak resets, saw {}",
        summary.streak_resets
    );
    ensure!(
        summary.best_streak == summary.days_simulated,
        "best streak {} should match {} simulated days",
        summary.best_streak,
        summary.days_simulated
    );
    Ok(())
}

fn velocity_damped(summary: &SimulationSummary) -> Result<()> {
    ensure!(
        summary.damped_completions > 0,
        "no completion was damped by the velocity window"
    );
    Ok(())
}

fn deepest_tier_reached(summary: &SimulationSummary) -> Result<()> {
    ensure!(
        summary.deep_tier_completions > 0,
        "no completion reached the deepest daily tier"
    );
    Ok(())
}

fn repeats_detected(summary: &SimulationSummary) -> Result<()> {
    ensure!(summary.repeats > 0, "no repeated titles were detected");
    ensure!(
        summary.repeat_criticals == 0,
        "{} repeated completions rolled a critical",
        summary.repeat_criticals
    );
    Ok(())
}

fn gaps_reset_streak(summary: &SimulationSummary) -> Result<()> {
    ensure!(
        summary.streak_resets == summary.gaps_after_activity,
        "{} streak resets for {} gaps after activity",
        summary.streak_resets,
        summary.gaps_after_activity
    );
    Ok(())
}

fn milestones_paid(summary: &SimulationSummary) -> Result<()> {
    let expected_weekly = summary.days_simulated / 7;
    ensure!(
        summary.weekly_payouts == expected_weekly,
        "expected {expected_weekly} weekly payouts, saw {}",
        summary.weekly_payouts
    );
    ensure!(
        summary.monthly_payouts == u32::from(summary.days_simulated >= 30),
        "monthly milestone paid {} times over {} days",
        summary.monthly_payouts,
        summary.days_simulated
    );
    Ok(())
}
