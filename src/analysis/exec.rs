use super::aggregate::Aggregator;
use super::compare::{compare, Metric};
use super::output::{output_json, output_summary};
use crate::config::Settings;
use crate::model::{AnalysisPeriods, AnalysisReport, PeriodInfo, ReportMetadata, SCHEMA_VERSION};
use crate::snapshot::SnapshotSource;
use crate::source::CommitSource;
use anyhow::Context;
use chrono::Utc;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone)]
pub struct AnalyzeArgs {
    pub snapshot: Option<PathBuf>,
    pub json: bool,
    pub output: Option<PathBuf>,
    pub top: usize,
    pub rank_by: Metric,
}

pub fn exec(mut settings: Settings, args: AnalyzeArgs) -> anyhow::Result<()> {
    let report = match &args.snapshot {
        Some(path) => {
            let source = SnapshotSource::load(path)
                .with_context(|| format!("Failed to load snapshot {}", path.display()))?;
            settings.resolve_team(&source).context("Failed to resolve team members")?;
            run(&source, &settings)
        }
        None => {
            let client = crate::github::connect(&settings).context("Failed to set up GitHub client")?;
            settings.resolve_team(&client).context("Failed to resolve team members")?;
            run(&client, &settings)
        }
    };

    if let Some(path) = &args.output {
        std::fs::write(path, serde_json::to_string_pretty(&report)?)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        info!(path = %path.display(), "report written");
    }

    if args.json {
        output_json(&report)?;
    } else {
        output_summary(&report, args.top, args.rank_by)?;
        if let Some(path) = &args.output {
            println!("\nDetailed results saved to: {}", path.display());
        }
    }

    Ok(())
}

/// Aggregates both windows from `source` and compares them.
pub fn run<S: CommitSource + ?Sized>(source: &S, settings: &Settings) -> AnalysisReport {
    let aggregator = Aggregator::new(source, &settings.aggregate);

    info!(start = %settings.before.start, end = %settings.before.end, "aggregating before window");
    let before = aggregator.aggregate(&settings.repositories, &settings.before);
    info!(start = %settings.after.start, end = %settings.after.end, "aggregating after window");
    let after = aggregator.aggregate(&settings.repositories, &settings.after);

    let comparison = compare(&before.contributors, &after.contributors, &settings.compare);
    info!(
        qualified = comparison.analysis_stats.qualified_users,
        common = comparison.analysis_stats.common_users,
        "comparison complete"
    );

    AnalysisReport {
        version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        metadata: ReportMetadata {
            organization: settings.organization.clone(),
            ai_adoption_date: settings.adoption_date,
            analysis_periods: AnalysisPeriods {
                before: PeriodInfo {
                    start: settings.before.start,
                    end: settings.before.end,
                    weeks: settings.compare.before_weeks,
                    repositories: before.repositories,
                },
                after: PeriodInfo {
                    start: settings.after.start,
                    end: settings.after.end,
                    weeks: settings.compare.after_weeks,
                    repositories: after.repositories,
                },
            },
            repositories_analyzed: settings.repositories.clone(),
            sample_policy: settings.aggregate.policy.name().to_string(),
            detail_sample_limit: settings.aggregate.detail_limit,
            active_days: settings.aggregate.active_days.name().to_string(),
            source: source.describe(),
        },
        comparison,
    }
}
