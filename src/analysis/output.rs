use super::compare::{Metric, AI_ADOPTION_KEY};
use crate::model::{AnalysisReport, PeriodInfo};
use anyhow::Result;
use console::style;

pub fn output_json(report: &AnalysisReport) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

pub fn output_summary(report: &AnalysisReport, top: usize, rank_by: Metric) -> Result<()> {
    let meta = &report.metadata;

    println!("{}", style("Before/After Productivity Analysis").bold());
    println!("{}", "─".repeat(60));
    println!("Organization:  {}", style(&meta.organization).cyan());
    println!("Adoption date: {}", style(meta.ai_adoption_date.format("%Y-%m-%d")).cyan());
    print_period("Before", &meta.analysis_periods.before);
    print_period("After", &meta.analysis_periods.after);
    println!(
        "Sampling:      {} (limit {}), active days {}",
        meta.sample_policy, meta.detail_sample_limit, meta.active_days
    );

    let stats = &report.comparison.analysis_stats;
    println!(
        "\nUsers analyzed: {} of {} active in both periods (min {} commits)",
        style(stats.qualified_users).yellow(),
        stats.common_users,
        stats.min_commits_threshold
    );

    if report.comparison.summary.is_empty() {
        println!("\nNo contributors with sufficient activity in both periods.");
        return Ok(());
    }

    println!("\n{}", style("Productivity changes").bold());
    for metric in Metric::ALL {
        if let Some(s) = report.comparison.summary.get(metric.key()) {
            println!(
                "  {:<24} avg {:>+8.1}%  median {:>+8.1}%  improved {}/{}  declined {}",
                metric.label(),
                s.avg_improvement_pct,
                s.median_improvement_pct,
                style(s.users_improved).green(),
                s.total_users,
                style(s.users_declined).red()
            );
        }
    }
    if let Some(s) = report.comparison.summary.get(AI_ADOPTION_KEY) {
        println!(
            "  {:<24} avg {:>+8.1}pp median {:>+8.1}pp",
            "AI assistance adoption", s.avg_improvement_pct, s.median_improvement_pct
        );
    }

    println!("\n{} ({})", style("Top performers").bold(), rank_by.label().to_lowercase());
    println!(
        "{:<24} {:>10} {:>10} {:>10} {:>10}",
        style("Contributor").bold(),
        style("Before").bold(),
        style("After").bold(),
        style("Change").bold(),
        style("AI pp").bold()
    );
    for c in report.comparison.ranked(rank_by).into_iter().take(top) {
        println!(
            "{:<24} {:>10.1} {:>10.1} {:>+9.1}% {:>+10.1}",
            c.contributor,
            rank_by.rate(&c.before),
            rank_by.rate(&c.after),
            rank_by.improvement(&c.improvements),
            c.improvements.ai_adoption_change_pct
        );
    }
    if report.comparison.user_comparisons.len() > top {
        println!("\n... and {} more contributors", report.comparison.user_comparisons.len() - top);
    }

    Ok(())
}

fn print_period(label: &str, period: &PeriodInfo) {
    println!(
        "{:<14} {} to {} ({} weeks)",
        format!("{label}:"),
        style(period.start.format("%Y-%m-%d")).dim(),
        style(period.end.format("%Y-%m-%d")).dim(),
        period.weeks
    );
    for repo in &period.repositories {
        let mut notes = Vec::new();
        if !repo.complete {
            notes.push("listing incomplete");
        }
        if repo.truncated {
            notes.push("sample rate limited");
        }
        println!(
            "    {:<22} {:>5} commits, {:>4} sized, {:>3} unattributed {}",
            repo.repository,
            repo.listed,
            repo.sampled,
            repo.unattributed,
            style(notes.join(", ")).yellow()
        );
    }
}
