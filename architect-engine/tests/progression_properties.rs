use architect_engine::{
    CompletionOutcome, CompletionRequest, Difficulty, EpochMillis, ProgressionEngine,
    RecentCompletion, RngRolls, RollSource, ScriptedRolls, StreakTransition, TaskRecord,
    UserProgression, VelocityWindow, epoch_day,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const DAY: EpochMillis = 86_400_000;
const HOUR: EpochMillis = 3_600_000;
const DAY_ZERO: EpochMillis = 19_500 * DAY + 7 * HOUR;

struct Player {
    engine: ProgressionEngine,
    progression: UserProgression,
    velocity: VelocityWindow,
    history: Vec<RecentCompletion>,
}

impl Player {
    fn new() -> Self {
        let engine = ProgressionEngine::default();
        let velocity = engine.new_velocity_window();
        Self {
            engine,
            progression: UserProgression::default(),
            velocity,
            history: Vec::new(),
        }
    }

    fn complete_with(
        &mut self,
        title: &str,
        difficulty: Difficulty,
        now: EpochMillis,
        rolls: &mut dyn RollSource,
    ) -> CompletionOutcome {
        let task = TaskRecord::new("local_user", title, difficulty, now);
        let outcome = self
            .engine
            .complete_task(
                CompletionRequest {
                    progression: &self.progression,
                    task: &task,
                    recent: &self.history,
                    velocity: &self.velocity,
                    now,
                },
                rolls,
            )
            .unwrap();
        self.progression = outcome.progression.clone();
        self.velocity = outcome.velocity.clone();
        self.history.push(RecentCompletion::new(title, now));
        outcome
    }

    fn complete(&mut self, title: &str, difficulty: Difficulty, now: EpochMillis) -> CompletionOutcome {
        self.complete_with(title, difficulty, now, &mut ScriptedRolls::never_crit())
    }

    fn level_invariant_holds(&self) -> bool {
        self.progression.xp < self.engine.xp_required_for_level(self.progression.level)
    }
}

#[test]
fn fresh_user_easy_completion_scenario() {
    let mut player = Player::new();
    let outcome = player.complete("Water plants", Difficulty::Easy, DAY_ZERO);
    assert_eq!(outcome.awarded_xp, 100);
    assert!(!outcome.is_critical);
    assert_eq!(outcome.bonus_xp, 0);
    assert_eq!(outcome.progression.daily_streak, 1);
    assert_eq!(outcome.progression.tasks_completed_today, 1);
    assert_eq!(outcome.progression.total_xp, 100);
}

#[test]
fn repeated_title_within_day_keeps_quarter() {
    let mut player = Player::new();
    player.complete("Water plants", Difficulty::Easy, DAY_ZERO);
    let outcome = player.complete("  water PLANTS", Difficulty::Easy, DAY_ZERO + HOUR);
    assert!(outcome.is_repeat);
    assert_eq!(outcome.breakdown.tiered, 100);
    assert_eq!(outcome.awarded_xp, 25);
    assert!(!outcome.is_critical);
}

#[test]
fn repeat_outside_window_is_full_value() {
    let mut player = Player::new();
    player.complete("Water plants", Difficulty::Easy, DAY_ZERO);
    let outcome = player.complete("Water plants", Difficulty::Easy, DAY_ZERO + 25 * HOUR);
    assert!(!outcome.is_repeat);
    assert_eq!(outcome.breakdown.after_repetition, 100);
}

#[test]
fn repetition_suppresses_criticals_for_any_seed() {
    for seed in 0..64 {
        let mut player = Player::new();
        let mut rolls = RngRolls(StdRng::seed_from_u64(seed));
        player.complete_with("Laundry", Difficulty::Medium, DAY_ZERO, &mut rolls);
        let outcome = player.complete_with("laundry", Difficulty::Medium, DAY_ZERO + HOUR, &mut rolls);
        assert!(outcome.is_repeat);
        assert!(!outcome.is_critical, "seed {seed} produced a repeat critical");
    }
}

#[test]
fn critical_threshold_boundary() {
    let mut hit = Player::new();
    let outcome = hit.complete_with(
        "Taxes",
        Difficulty::Epic,
        DAY_ZERO,
        &mut ScriptedRolls::new([0.19, 0.999]),
    );
    assert!(outcome.is_critical);
    assert!(outcome.awarded_xp >= 2_990);
    assert!(outcome.awarded_xp < 3_000);

    let mut miss = Player::new();
    let outcome = miss.complete_with(
        "Taxes",
        Difficulty::Epic,
        DAY_ZERO,
        &mut ScriptedRolls::new([0.21, 0.999]),
    );
    assert!(!outcome.is_critical);
    assert_eq!(outcome.awarded_xp, 1_000);
}

#[test]
fn seventh_task_full_eighth_half() {
    let mut player = Player::new();
    let mut awards = Vec::new();
    for index in 0..9 {
        let outcome = player.complete(
            &format!("Chore {index}"),
            Difficulty::Medium,
            DAY_ZERO + i64::from(index) * HOUR,
        );
        awards.push(outcome.breakdown.tiered);
    }
    assert_eq!(awards[6], 250);
    assert_eq!(awards[7], 125);
    assert_eq!(awards[8], 125);
}

#[test]
fn grind_tier_after_fifteen() {
    let mut player = Player::new();
    let mut last = None;
    for index in 0..16 {
        last = Some(player.complete(
            &format!("Sprint {index}"),
            Difficulty::Hard,
            DAY_ZERO + i64::from(index) * 60_000,
        ));
    }
    let last = last.unwrap();
    assert_eq!(last.breakdown.tiered, 50);
    assert_eq!(player.progression.tasks_completed_today, 16);
}

#[test]
fn same_day_streak_is_idempotent() {
    let mut once = Player::new();
    once.complete("A", Difficulty::Easy, DAY_ZERO);

    let mut twice = Player::new();
    twice.complete("A", Difficulty::Easy, DAY_ZERO);
    let second = twice.complete("B", Difficulty::Easy, DAY_ZERO + 5 * HOUR);

    assert_eq!(second.streak, StreakTransition::SameDay);
    assert_eq!(once.progression.daily_streak, twice.progression.daily_streak);
}

#[test]
fn skipped_day_resets_streak_and_monthly_claim() {
    let mut player = Player::new();
    player.progression = UserProgression {
        daily_streak: 34,
        last_completion_day: Some(epoch_day(DAY_ZERO) - 1),
        monthly_milestone_claimed: true,
        weekly_streak_claimed: true,
        today_reset_day: epoch_day(DAY_ZERO) - 1,
        ..UserProgression::default()
    };
    player.complete("Day N", Difficulty::Easy, DAY_ZERO);
    assert_eq!(player.progression.daily_streak, 35);

    let outcome = player.complete("Day N+2", Difficulty::Easy, DAY_ZERO + 2 * DAY);
    assert_eq!(outcome.streak, StreakTransition::Reset);
    assert_eq!(outcome.progression.daily_streak, 1);
    assert!(!outcome.progression.monthly_milestone_claimed);
    assert!(!outcome.progression.weekly_streak_claimed);
}

#[test]
fn weekly_payout_fires_once_per_cycle() {
    let mut player = Player::new();
    let mut weekly_payouts = 0;
    for day in 0..14 {
        for slot in 0..2 {
            let now = DAY_ZERO + day * DAY + slot * 4 * HOUR;
            let outcome = player.complete(&format!("Task {day}-{slot}"), Difficulty::Easy, now);
            weekly_payouts += outcome.payouts.len();
            if day == 6 && slot == 0 {
                assert_eq!(outcome.progression.daily_streak, 7);
                assert_eq!(outcome.bonus_xp, 500);
            }
            if day == 6 && slot == 1 {
                assert_eq!(outcome.bonus_xp, 0);
            }
        }
    }
    assert_eq!(player.progression.daily_streak, 14);
    assert_eq!(weekly_payouts, 2);
}

#[test]
fn month_long_streak_pays_monthly_once() {
    let mut player = Player::new();
    let mut monthly = 0;
    for day in 0..40 {
        let outcome = player.complete(&format!("Habit {day}"), Difficulty::Easy, DAY_ZERO + day * DAY);
        monthly += outcome
            .payouts
            .iter()
            .filter(|payout| payout.xp == 2_500)
            .count();
        if day == 29 {
            assert!(outcome.progression.monthly_milestone_claimed);
        }
    }
    assert_eq!(monthly, 1);
    assert!(player.level_invariant_holds());
}

#[test]
fn velocity_damping_steps_down_and_floors() {
    let mut player = Player::new();
    let mut velocity = Vec::new();
    for index in 0..6 {
        let outcome = player.complete(
            &format!("Burst {index}"),
            Difficulty::Easy,
            DAY_ZERO + i64::from(index) * 1_000,
        );
        velocity.push(outcome.breakdown.after_velocity);
    }
    assert_eq!(velocity, vec![100, 90, 80, 70, 60, 60]);
}

#[test]
fn streak_bonus_applies_after_velocity() {
    let mut player = Player::new();
    player.progression = UserProgression {
        daily_streak: 2,
        last_completion_day: Some(epoch_day(DAY_ZERO) - 1),
        today_reset_day: epoch_day(DAY_ZERO) - 1,
        ..UserProgression::default()
    };
    player.complete("Warmup", Difficulty::Medium, DAY_ZERO);
    let outcome = player.complete("Second", Difficulty::Medium, DAY_ZERO + 1_000);
    assert_eq!(outcome.breakdown.after_velocity, 225);
    assert_eq!(outcome.awarded_xp, 281);

    player.complete("Third", Difficulty::Medium, DAY_ZERO + HOUR);
    let fourth = player.complete("Fourth", Difficulty::Medium, DAY_ZERO + 2 * HOUR);
    assert!(!fourth.breakdown.streak_bonus);
    assert_eq!(fourth.awarded_xp, 250);
}

#[test]
fn clock_regression_never_advances_streak() {
    let mut player = Player::new();
    player.complete("Today", Difficulty::Easy, DAY_ZERO);
    let before = player.progression.clone();

    let outcome = player.complete("Yesterday?", Difficulty::Easy, DAY_ZERO - 2 * DAY);
    assert_eq!(outcome.streak, StreakTransition::ClockRegression);
    assert_eq!(outcome.progression.daily_streak, before.daily_streak);
    assert_eq!(outcome.progression.last_completion_day, before.last_completion_day);
    assert_eq!(outcome.progression.today_reset_day, before.today_reset_day);
    assert_eq!(
        outcome.progression.tasks_completed_today,
        before.tasks_completed_today + 1
    );
}

#[test]
fn revert_hard_task_scenario() {
    let engine = ProgressionEngine::default();
    let mut task = TaskRecord::new("local_user", "Ship release", Difficulty::Hard, DAY_ZERO);
    task.mark_completed(DAY_ZERO);
    let progression = UserProgression {
        level: 2,
        xp: 200,
        total_xp: 700,
        ..UserProgression::default()
    };
    let outcome = engine.revert_task(&progression, &task).unwrap();
    assert_eq!(outcome.progression.xp, 0);
    assert_eq!(outcome.progression.total_xp, 200);
    assert_eq!(outcome.task.completed_at, None);
    assert!(!outcome.task.is_completed());
}

#[test]
fn random_play_keeps_total_monotonic_and_levels_valid() {
    let titles = ["Run", "Read", "Cook", "Code", "Call mom", "Budget"];
    for seed in 0..16_u64 {
        let mut driver = StdRng::seed_from_u64(seed);
        let mut rolls = RngRolls(StdRng::seed_from_u64(seed ^ 0xA5A5));
        let mut player = Player::new();
        let mut now = DAY_ZERO;
        let mut last_total = 0;
        for _ in 0..300 {
            now += driver.gen_range(500..30 * HOUR);
            let title = titles[driver.gen_range(0..titles.len())];
            let difficulty = Difficulty::ALL[driver.gen_range(0..Difficulty::ALL.len())];
            let outcome = player.complete_with(title, difficulty, now, &mut rolls);
            assert!(outcome.progression.total_xp >= last_total);
            if outcome.is_repeat {
                assert!(!outcome.is_critical);
            }
            last_total = outcome.progression.total_xp;
            assert!(player.level_invariant_holds(), "seed {seed} broke level invariant");
        }
    }
}
