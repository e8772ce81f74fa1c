use anyhow::{Context, Result};
use architect_engine::constants::MILLIS_PER_DAY;
use architect_engine::{
    Clock, CompletionOutcome, Difficulty, EpochMillis, ManualClock, MemoryStore, PayoutKind,
    ProgressionEngine, ProgressionTracker, RevertOutcome, RewardConfig, StreakTransition,
    TaskRecord, completion_stats, epoch_day,
};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::scenarios::{PlayPattern, Scenario};

/// First simulated day: 2024-01-01 UTC.
const SIM_START_DAY: i64 = 19_723;
const DAY_START_OFFSET: std::ops::Range<i64> = 6 * 3_600_000..8 * 3_600_000;
/// Simulated tasks fall due at noon of the day they are created.
const DUE_OFFSET: i64 = 12 * 3_600_000;
const SIM_USER: &str = "sim_user";
const CHORES: [&str; 8] = [
    "Water plants",
    "Inbox zero",
    "Morning run",
    "Read a chapter",
    "Meal prep",
    "Stretch",
    "Budget review",
    "Call family",
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub days_simulated: u32,
    pub completions: u32,
    pub reverts: u32,
    pub total_xp: u64,
    pub level: u32,
    pub rank: String,
    pub best_streak: u32,
    pub streak_resets: u32,
    pub gaps_after_activity: u32,
    pub criticals: u32,
    pub repeats: u32,
    pub repeat_criticals: u32,
    pub damped_completions: u32,
    pub deep_tier_completions: u32,
    pub weekly_payouts: u32,
    pub monthly_payouts: u32,
    pub busiest_day: usize,
    pub on_time: usize,
    pub overdue: usize,
    pub violations: Vec<String>,
}

/// Per-step invariant bookkeeping.
#[derive(Debug, Default)]
struct InvariantChecker {
    last_total: u64,
    last_day: Option<i64>,
    last_streak: u32,
    streak_run: u32,
    weekly_claims: HashSet<(u32, u32)>,
}

impl InvariantChecker {
    fn after_completion(
        &mut self,
        engine: &ProgressionEngine,
        outcome: &CompletionOutcome,
        now: EpochMillis,
    ) -> Vec<String> {
        let mut violations = Vec::new();
        let progression = &outcome.progression;
        let today = epoch_day(now);

        if progression.total_xp < self.last_total {
            violations.push(format!(
                "total xp fell from {} to {} on a completion",
                self.last_total, progression.total_xp
            ));
        }
        check_level(engine, progression.level, progression.xp, &mut violations);

        if self.last_day == Some(today)
            && (outcome.streak != StreakTransition::SameDay
                || progression.daily_streak != self.last_streak)
        {
            violations.push(format!(
                "second completion on day {today} moved streak {} -> {} ({:?})",
                self.last_streak, progression.daily_streak, outcome.streak
            ));
        }
        if outcome.is_repeat && outcome.is_critical {
            violations.push("repeated title rolled a critical".to_string());
        }

        if matches!(outcome.streak, StreakTransition::Started | StreakTransition::Reset) {
            self.streak_run += 1;
        }
        for payout in outcome.payouts.iter().filter(|p| p.kind == PayoutKind::Weekly) {
            if !self.weekly_claims.insert((self.streak_run, payout.streak)) {
                violations.push(format!("weekly bonus paid twice at streak {}", payout.streak));
            }
        }

        self.last_total = progression.total_xp;
        self.last_day = Some(today);
        self.last_streak = progression.daily_streak;
        violations
    }

    fn after_revert(&mut self, engine: &ProgressionEngine, outcome: &RevertOutcome) -> Vec<String> {
        let mut violations = Vec::new();
        let expected = self.last_total.saturating_sub(outcome.xp_removed);
        if outcome.progression.total_xp != expected {
            violations.push(format!(
                "revert left total xp at {} instead of {expected}",
                outcome.progression.total_xp
            ));
        }
        check_level(engine, outcome.progression.level, outcome.progression.xp, &mut violations);
        self.last_total = outcome.progression.total_xp;
        violations
    }
}

fn check_level(engine: &ProgressionEngine, level: u32, xp: u64, violations: &mut Vec<String>) {
    let required = engine.xp_required_for_level(level);
    if level < 1 || xp >= required {
        violations.push(format!(
            "level invariant broken: level {level} holds {xp} of {required} xp"
        ));
    }
}

/// Drives one scenario for one seed against a fresh tracker.
pub struct Simulator {
    cfg: RewardConfig,
    verbose: bool,
}

impl Simulator {
    pub const fn new(cfg: RewardConfig, verbose: bool) -> Self {
        Self { cfg, verbose }
    }

    pub fn run(&self, scenario: &Scenario, seed: u64, requested_days: u32) -> Result<SimulationSummary> {
        let days = scenario.days(requested_days);
        let start = SIM_START_DAY * MILLIS_PER_DAY;
        let tracker = ProgressionTracker::new(
            self.cfg.clone(),
            MemoryStore::new(),
            ManualClock::new(start),
            seed,
        )
        .context("reward configuration rejected by the tracker")?;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut checker = InvariantChecker::default();
        let mut summary = SimulationSummary {
            days_simulated: days,
            ..SimulationSummary::default()
        };
        let mut completed_ids: Vec<String> = Vec::new();
        let mut played_any = false;
        let mut skipped_since_play = false;
        let mut title_counter = 0_usize;

        for day in 0..i64::from(days) {
            let pattern = &scenario.pattern;
            if rng.gen_bool(pattern.skip_day_chance) {
                skipped_since_play = played_any;
                continue;
            }
            if skipped_since_play {
                summary.gaps_after_activity += 1;
                skipped_since_play = false;
            }
            played_any = true;

            let mut now = start + day * MILLIS_PER_DAY + rng.gen_range(DAY_START_OFFSET);
            let tasks_today = rng.gen_range(pattern.tasks_per_day.clone());
            for index in 0..tasks_today {
                if index > 0 {
                    now += rng.gen_range(pattern.spacing_millis.clone());
                }
                let title = next_title(pattern, &mut rng, &mut title_counter);
                let difficulty = *Difficulty::ALL
                    .choose(&mut rng)
                    .unwrap_or(&Difficulty::Easy);
                let due_at = start + day * MILLIS_PER_DAY + DUE_OFFSET;
                let task =
                    TaskRecord::new(SIM_USER, title.clone(), difficulty, now).with_due_at(due_at);
                let task_id = task.id.clone();
                tracker.store().insert_task(task);
                tracker.clock().set(now);

                let outcome = tracker
                    .complete_task(SIM_USER, &task_id)
                    .with_context(|| format!("completing '{title}' on day {day}"))?;
                self.tally(&mut summary, &outcome);
                for violation in checker.after_completion(tracker.engine(), &outcome, now) {
                    summary.violations.push(format!("day {day} '{title}': {violation}"));
                }
                completed_ids.push(task_id);

                if pattern.revert_chance > 0.0
                    && rng.gen_bool(pattern.revert_chance)
                    && let Some(revert_id) = completed_ids.pop()
                {
                    let reverted = tracker
                        .revert_task(SIM_USER, &revert_id)
                        .with_context(|| format!("reverting '{title}' on day {day}"))?;
                    summary.reverts += 1;
                    for violation in checker.after_revert(tracker.engine(), &reverted) {
                        summary.violations.push(format!("day {day} revert: {violation}"));
                    }
                }
            }
        }

        let stats = completion_stats(
            &tracker.store().tasks_for_user(SIM_USER),
            tracker.clock().now(),
        );
        summary.busiest_day = stats.best_day.map_or(0, |best| best.completions);
        summary.on_time = stats.on_time;
        summary.overdue = stats.overdue;
        let expected_completed = summary.completions.saturating_sub(summary.reverts);
        if u32::try_from(stats.total_completed).ok() != Some(expected_completed) {
            summary.violations.push(format!(
                "store holds {} completed tasks, expected {expected_completed}",
                stats.total_completed
            ));
        }

        let progress = tracker.level_progress(SIM_USER)?;
        summary.total_xp = tracker.progression(SIM_USER)?.total_xp;
        summary.level = progress.level;
        summary.rank = progress.rank.to_string();

        if self.verbose {
            println!(
                "   seed {seed}: {} completions, level {} ({}), best streak {}",
                summary.completions, summary.level, summary.rank, summary.best_streak
            );
        }
        Ok(summary)
    }

    fn tally(&self, summary: &mut SimulationSummary, outcome: &CompletionOutcome) {
        let breakdown = &outcome.breakdown;
        summary.completions += 1;
        summary.best_streak = summary.best_streak.max(outcome.progression.daily_streak);
        if outcome.streak == StreakTransition::Reset {
            summary.streak_resets += 1;
        }
        if outcome.is_critical {
            summary.criticals += 1;
        }
        if outcome.is_repeat {
            summary.repeats += 1;
            if outcome.is_critical {
                summary.repeat_criticals += 1;
            }
        }
        if breakdown.after_velocity < breakdown.after_repetition {
            summary.damped_completions += 1;
        }
        // Counter is post-increment, so exceeding the threshold means this task was tiered down.
        if outcome.progression.tasks_completed_today > self.cfg.tiers.half_threshold {
            summary.deep_tier_completions += 1;
        }
        for payout in &outcome.payouts {
            match payout.kind {
                PayoutKind::Weekly => summary.weekly_payouts += 1,
                PayoutKind::Monthly => summary.monthly_payouts += 1,
            }
        }
    }
}

fn next_title(pattern: &PlayPattern, rng: &mut ChaCha8Rng, counter: &mut usize) -> String {
    match pattern.title_pool {
        Some(pool) => {
            let pool = pool.clamp(1, CHORES.len());
            CHORES[rng.gen_range(0..pool)].to_string()
        }
        None => {
            *counter += 1;
            format!("{} #{counter}", CHORES[*counter % CHORES.len()])
        }
    }
}
