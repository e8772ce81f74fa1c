use architect_engine::{
    Clock, Difficulty, ManualClock, MemoryStore, ProgressionTracker, RewardConfig, TaskRecord,
    TrackerError,
};

const START: i64 = 19_800 * 86_400_000 + 10 * 3_600_000;

fn seeded_tracker(users: &[&str], tasks_per_user: usize) -> ProgressionTracker<MemoryStore, ManualClock> {
    let tracker = ProgressionTracker::new(
        RewardConfig::default(),
        MemoryStore::new(),
        ManualClock::new(START),
        0xD15C,
    )
    .unwrap();
    for user in users {
        for index in 0..tasks_per_user {
            tracker.store().insert_task(TaskRecord::new(
                *user,
                format!("{user} errand {index}"),
                Difficulty::Medium,
                START,
            ));
        }
    }
    tracker
}

#[test]
fn users_progress_independently_across_threads() {
    let users = ["ada", "grace", "linus", "margaret"];
    let tracker = seeded_tracker(&users, 12);

    std::thread::scope(|scope| {
        for user in users {
            let tracker = &tracker;
            scope.spawn(move || {
                for task in tracker.store().tasks_for_user(user) {
                    tracker.complete_task(user, &task.id).unwrap();
                }
            });
        }
    });

    for user in users {
        let progression = tracker.progression(user).unwrap();
        assert_eq!(progression.tasks_completed_today, 12);
        assert_eq!(progression.daily_streak, 1);
        assert!(progression.total_xp > 0);
        assert!(
            tracker
                .store()
                .tasks_for_user(user)
                .iter()
                .all(TaskRecord::is_completed)
        );
    }
}

#[test]
fn racing_completions_of_one_task_award_once() {
    let tracker = seeded_tracker(&["solo"], 1);
    let task_id = tracker.store().tasks_for_user("solo")[0].id.clone();

    let results: Vec<Result<_, TrackerError>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| tracker.complete_task("solo", &task_id)))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect()
    });

    let successes = results.iter().filter(|result| result.is_ok()).count();
    assert_eq!(successes, 1);
    assert!(
        results
            .iter()
            .filter_map(|result| result.as_ref().err())
            .all(|err| matches!(err, TrackerError::TaskAlreadyCompleted { .. }))
    );
    assert_eq!(tracker.progression("solo").unwrap().tasks_completed_today, 1);
}

#[test]
fn same_seed_replays_identical_rewards() {
    let run = || {
        let tracker = seeded_tracker(&["replay"], 20);
        tracker
            .store()
            .tasks_for_user("replay")
            .iter()
            .map(|task| {
                tracker.clock().advance(45 * 60_000);
                tracker.complete_task("replay", &task.id).unwrap().awarded_xp
            })
            .collect::<Vec<_>>()
    };
    assert_eq!(run(), run());
}

#[test]
fn revert_after_completion_restores_pending_state() {
    let tracker = seeded_tracker(&["undo"], 2);
    let tasks = tracker.store().tasks_for_user("undo");
    tracker.complete_task("undo", &tasks[0].id).unwrap();
    tracker.clock().advance(60_000);
    tracker.complete_task("undo", &tasks[1].id).unwrap();

    let before = tracker.progression("undo").unwrap().total_xp;
    let reverted = tracker.revert_task("undo", &tasks[1].id).unwrap();
    assert_eq!(reverted.xp_removed, 250);
    assert_eq!(
        tracker.progression("undo").unwrap().total_xp,
        before.saturating_sub(250)
    );
    assert!(matches!(
        tracker.revert_task("undo", &tasks[1].id),
        Err(TrackerError::TaskNotCompleted { .. })
    ));
    assert_eq!(tracker.clock().now(), START + 60_000);
}
