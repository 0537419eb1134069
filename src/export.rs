use crate::analysis::Aggregator;
use crate::config::Settings;
use crate::snapshot::{Recorder, Snapshot};
use anyhow::Context;
use console::style;
use std::path::PathBuf;

/// Fetches both windows from GitHub and writes the raw listings and sampled
/// details as a snapshot that `analyze --snapshot` can replay.
pub fn exec(mut settings: Settings, output: Option<PathBuf>) -> anyhow::Result<()> {
    let client = crate::github::connect(&settings).context("Failed to set up GitHub client")?;
    let recorder = Recorder::new(&client, &settings.organization);
    settings.resolve_team(&recorder).context("Failed to resolve team members")?;

    let aggregator = Aggregator::new(&recorder, &settings.aggregate);
    aggregator.aggregate(&settings.repositories, &settings.before);
    aggregator.aggregate(&settings.repositories, &settings.after);

    let snapshot = recorder.into_snapshot();
    match output {
        Some(path) => {
            snapshot
                .save(&path)
                .with_context(|| format!("Failed to write snapshot to {}", path.display()))?;
            output_summary(&snapshot);
            println!("\nSnapshot saved to: {}", path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&snapshot)?),
    }

    Ok(())
}

fn output_summary(snapshot: &Snapshot) {
    println!("{}", style("Export Summary").bold());
    println!("{}", "─".repeat(50));
    for repo in &snapshot.repositories {
        println!(
            "{:<30} {:>6} commits {:>6} details",
            repo.name,
            style(repo.commits.len()).cyan(),
            style(repo.details.len()).green()
        );
    }
}
