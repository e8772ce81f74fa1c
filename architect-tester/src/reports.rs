use anyhow::Result;
use chrono::Utc;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::time::Duration;

use crate::simulation::SimulationSummary;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_key: String,
    pub scenario_name: String,
    pub seed: u64,
    pub passed: bool,
    pub failures: Vec<String>,
    pub summary: SimulationSummary,
    #[serde(with = "duration_serde")]
    pub duration: Duration,
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    generated_at: String,
    passed: usize,
    failed: usize,
    results: &'a [ScenarioResult],
}

fn pass_counts(results: &[ScenarioResult]) -> (usize, usize) {
    let passed = results.iter().filter(|r| r.passed).count();
    (passed, results.len() - passed)
}

fn success_rate(results: &[ScenarioResult]) -> f64 {
    let (passed, _) = pass_counts(results);
    if results.is_empty() {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let rate = (passed as f64 / results.len() as f64) * 100.0;
    rate
}

pub fn generate_console_report(
    out: &mut dyn Write,
    results: &[ScenarioResult],
    total_duration: Duration,
) -> Result<()> {
    let (passed, failed) = pass_counts(results);
    writeln!(out)?;
    writeln!(out, "{}", "📊 Progression Simulation Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "=================================".cyan())?;
    writeln!(out, "Total runs: {}", results.len())?;
    writeln!(out, "Passed: {}", passed.to_string().green())?;
    writeln!(out, "Failed: {}", failed.to_string().red())?;
    writeln!(out, "Success rate: {:.1}%", success_rate(results))?;
    writeln!(out, "Total time: {total_duration:?}")?;
    writeln!(out)?;

    for result in results {
        let status = if result.passed {
            "✅ PASS".green()
        } else {
            "❌ FAIL".red()
        };
        let summary = &result.summary;
        writeln!(
            out,
            "{} {} (seed {})",
            status,
            result.scenario_name.bold(),
            result.seed
        )?;
        writeln!(
            out,
            "   {} days, {} completions, {} reverts, {:?}",
            summary.days_simulated, summary.completions, summary.reverts, result.duration
        )?;
        writeln!(
            out,
            "   Level {} {} | {} total xp | best streak {}",
            summary.level, summary.rank, summary.total_xp, summary.best_streak
        )?;
        writeln!(
            out,
            "   Criticals {} | repeats {} | damped {} | weekly {} | monthly {}",
            summary.criticals,
            summary.repeats,
            summary.damped_completions,
            summary.weekly_payouts,
            summary.monthly_payouts
        )?;
        writeln!(
            out,
            "   Busiest day {} | on time {} | overdue {}",
            summary.busiest_day, summary.on_time, summary.overdue
        )?;
        if !result.failures.is_empty() {
            writeln!(out, "   Failures:")?;
            for failure in &result.failures {
                writeln!(out, "     • {}", failure.red())?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

pub fn generate_json_report(out: &mut dyn Write, results: &[ScenarioResult]) -> Result<()> {
    let (passed, failed) = pass_counts(results);
    let report = JsonReport {
        generated_at: Utc::now().to_rfc3339(),
        passed,
        failed,
        results,
    };
    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out)?;
    Ok(())
}

pub fn generate_markdown_report(out: &mut dyn Write, results: &[ScenarioResult]) -> Result<()> {
    let (passed, failed) = pass_counts(results);
    writeln!(out, "# Life Architect Progression Simulation\n")?;
    writeln!(out, "_Generated {}_\n", Utc::now().format("%Y-%m-%d %H:%M:%S UTC"))?;
    writeln!(out, "## Summary\n")?;
    writeln!(out, "- **Total runs**: {}", results.len())?;
    writeln!(out, "- **Passed**: {passed}")?;
    writeln!(out, "- **Failed**: {failed}")?;
    writeln!(out, "- **Success rate**: {:.1}%\n", success_rate(results))?;

    writeln!(out, "## Runs\n")?;
    writeln!(
        out,
        "| Status | Scenario | Seed | Days | Completions | Level | Total XP | Best streak | Weekly | Monthly |"
    )?;
    writeln!(out, "|---|---|---|---|---|---|---|---|---|---|")?;
    for result in results {
        let status = if result.passed { "✅" } else { "❌" };
        let s = &result.summary;
        writeln!(
            out,
            "| {status} | {} | {} | {} | {} | {} | {} | {} | {} | {} |",
            result.scenario_name,
            result.seed,
            s.days_simulated,
            s.completions,
            s.level,
            s.total_xp,
            s.best_streak,
            s.weekly_payouts,
            s.monthly_payouts
        )?;
    }

    let failing: Vec<&ScenarioResult> = results.iter().filter(|r| !r.passed).collect();
    if !failing.is_empty() {
        writeln!(out, "\n## Failures\n")?;
        for result in failing {
            writeln!(out, "### {} (seed {})\n", result.scenario_name, result.seed)?;
            for failure in &result.failures {
                writeln!(out, "- {failure}")?;
            }
            writeln!(out)?;
        }
    }
    Ok(())
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u128::deserialize(deserializer)?;
        Ok(Duration::from_millis(u64::try_from(millis).unwrap_or(0)))
    }
}
