//! End-of-run summary output

use anyhow::{Context, Result};
use colored::Colorize;
use qnaload_core::{LatencyStats, RunSummary};
use qnaload_runner::RunOutcome;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// Render the check list followed by aligned metric lines
pub fn render_summary(outcome: &RunOutcome) -> String {
    let summary = &outcome.summary;
    let mut out = String::new();

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "  run {} {} after {}",
        summary.run_id,
        outcome.stop_reason,
        format_elapsed(summary)
    );
    let _ = writeln!(out);

    for count in &summary.checks {
        if count.fails == 0 {
            let _ = writeln!(out, "     {} {}", "✓".green(), count.name);
        } else {
            let _ = writeln!(out, "     {} {}", "✗".red(), count.name);
            let _ = writeln!(
                out,
                "      ↳  {:.0}% ✓ {} / ✗ {}",
                count.pass_rate() * 100.0,
                count.passes,
                count.fails
            );
        }
    }
    let _ = writeln!(out);

    metric(
        &mut out,
        "checks",
        format!(
            "{:.2}% {} {} {} {}",
            summary.check_pass_rate() * 100.0,
            "✓".green(),
            summary.checks_passed(),
            "✗".red(),
            summary.checks_failed()
        ),
    );
    metric(&mut out, "http_req_duration", format_latency(&summary.latency));
    metric(
        &mut out,
        "http_reqs",
        format!(
            "{} {:.2}/s",
            summary.total_requests, summary.requests_per_second
        ),
    );
    metric(
        &mut out,
        "http_req_failed",
        format!(
            "{} timeouts={} failed={}",
            summary.errors.total(),
            summary.errors.timeouts,
            summary.errors.failures
        ),
    );
    if !summary.status_codes.is_empty() {
        let codes: Vec<String> = summary
            .status_codes
            .iter()
            .map(|(code, count)| format!("{}={}", code, count))
            .collect();
        metric(&mut out, "http_status", codes.join(" "));
    }
    metric(&mut out, "iterations", summary.total_requests.to_string());
    metric(&mut out, "vus_max", summary.peak_workers.to_string());
    metric(&mut out, "vus_spawned", summary.workers_spawned.to_string());

    if outcome.forced_stops > 0 {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "  {} {} workers were aborted with requests in flight",
            "!".yellow(),
            outcome.forced_stops
        );
    }

    out
}

/// Write the summary as pretty JSON
pub fn write_summary_json(path: &Path, summary: &RunSummary) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).context("Failed to create summary directory")?;
        }
    }

    let json = serde_json::to_string_pretty(summary).context("Failed to serialize summary")?;
    fs::write(path, json).with_context(|| format!("Failed to write summary to {:?}", path))?;
    Ok(())
}

fn metric(out: &mut String, name: &str, value: String) {
    let _ = writeln!(out, "     {:.<32}: {}", name, value);
}

fn format_latency(latency: &LatencyStats) -> String {
    format!(
        "avg={} min={} med={} max={} p(90)={} p(95)={} p(99)={}",
        format_ms(latency.avg_ms),
        format_ms(latency.min_ms),
        format_ms(latency.median_ms),
        format_ms(latency.max_ms),
        format_ms(latency.p90_ms),
        format_ms(latency.p95_ms),
        format_ms(latency.p99_ms)
    )
}

fn format_ms(ms: f64) -> String {
    if ms >= 1000.0 {
        format!("{:.2}s", ms / 1000.0)
    } else {
        format!("{:.2}ms", ms)
    }
}

fn format_elapsed(summary: &RunSummary) -> String {
    format!("{:.1}s", summary.elapsed.as_secs_f64())
}
