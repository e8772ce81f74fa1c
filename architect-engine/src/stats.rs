//! Completion statistics bucketed by epoch-day and epoch-week.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::constants::{DAYS_PER_WEEK, STATS_TRAILING_DAYS};
use crate::progression::{EpochMillis, epoch_day};
use crate::task::TaskRecord;

/// Completions landing in one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketCount {
    /// Epoch-day or epoch-week index, depending on the bucket.
    pub bucket: i64,
    pub completions: usize,
}

/// Aggregate view over a user's completed tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CompletionStats {
    pub total_completed: usize,
    /// One entry per day for the trailing window, today first.
    pub trailing_days: Vec<BucketCount>,
    pub best_day: Option<BucketCount>,
    /// Busiest `floor(epoch_day / 7)` week.
    pub best_week: Option<BucketCount>,
    pub on_time: usize,
    pub overdue: usize,
}

/// Summarize completed tasks relative to `now`.
///
/// Ties for best day or week go to the earliest bucket.
#[must_use]
pub fn completion_stats(tasks: &[TaskRecord], now: EpochMillis) -> CompletionStats {
    let mut by_day: BTreeMap<i64, usize> = BTreeMap::new();
    let mut by_week: BTreeMap<i64, usize> = BTreeMap::new();
    let mut stats = CompletionStats::default();

    for task in tasks.iter().filter(|task| task.is_completed()) {
        let Some(completed_at) = task.completed_at else {
            continue;
        };
        stats.total_completed += 1;
        let day = epoch_day(completed_at);
        *by_day.entry(day).or_default() += 1;
        *by_week.entry(day.div_euclid(DAYS_PER_WEEK)).or_default() += 1;

        match task.due_at {
            Some(due) if completed_at <= due => stats.on_time += 1,
            Some(_) => stats.overdue += 1,
            None => {}
        }
    }

    let today = epoch_day(now);
    stats.trailing_days = (0..STATS_TRAILING_DAYS)
        .map(|offset| {
            let bucket = today - i64::try_from(offset).unwrap_or(0);
            BucketCount {
                bucket,
                completions: by_day.get(&bucket).copied().unwrap_or(0),
            }
        })
        .collect();
    stats.best_day = busiest(&by_day);
    stats.best_week = busiest(&by_week);
    stats
}

fn busiest(buckets: &BTreeMap<i64, usize>) -> Option<BucketCount> {
    let mut best: Option<BucketCount> = None;
    for (&bucket, &completions) in buckets {
        if best.is_none_or(|current| completions > current.completions) {
            best = Some(BucketCount {
                bucket,
                completions,
            });
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MILLIS_PER_DAY;
    use crate::difficulty::Difficulty;

    fn completed(day: i64, due_day: Option<i64>) -> TaskRecord {
        let mut task = TaskRecord::new("u", "t", Difficulty::Easy, 0);
        if let Some(due) = due_day {
            task = task.with_due_at(due * MILLIS_PER_DAY);
        }
        task.mark_completed(day * MILLIS_PER_DAY + 1_000);
        task
    }

    #[test]
    fn buckets_days_and_weeks() {
        let tasks = vec![
            completed(700, None),
            completed(700, None),
            completed(701, None),
            completed(703, None),
            completed(703, None),
            completed(703, None),
            TaskRecord::new("u", "pending", Difficulty::Hard, 0),
        ];
        let stats = completion_stats(&tasks, 703 * MILLIS_PER_DAY);
        assert_eq!(stats.total_completed, 6);
        assert_eq!(stats.trailing_days.len(), 30);
        assert_eq!(stats.trailing_days[0], BucketCount { bucket: 703, completions: 3 });
        assert_eq!(stats.trailing_days[2].completions, 1);
        assert_eq!(stats.best_day, Some(BucketCount { bucket: 703, completions: 3 }));
        assert_eq!(stats.best_week, Some(BucketCount { bucket: 100, completions: 6 }));
    }

    #[test]
    fn ties_prefer_earliest_bucket() {
        let tasks = vec![completed(10, None), completed(12, None)];
        let stats = completion_stats(&tasks, 12 * MILLIS_PER_DAY);
        assert_eq!(stats.best_day.map(|b| b.bucket), Some(10));
    }

    #[test]
    fn counts_on_time_and_overdue() {
        let tasks = vec![
            completed(5, Some(6)),
            completed(7, Some(6)),
            completed(7, None),
        ];
        let stats = completion_stats(&tasks, 7 * MILLIS_PER_DAY);
        assert_eq!(stats.on_time, 1);
        assert_eq!(stats.overdue, 1);
    }

    #[test]
    fn empty_history_has_no_best() {
        let stats = completion_stats(&[], 0);
        assert_eq!(stats.total_completed, 0);
        assert!(stats.best_day.is_none());
        assert!(stats.trailing_days.iter().all(|d| d.completions == 0));
    }
}
