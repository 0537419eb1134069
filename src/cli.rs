use crate::analysis::{ActiveDays, AnalyzeArgs, Metric, SamplePolicy};
use crate::config::{Config, Overrides, Settings};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "uplift")]
#[command(about = "Before/after productivity analysis of GitHub history around a tool adoption date")]
#[command(version)]
pub struct Cli {
    #[clap(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Clone)]
pub struct CommonArgs {
    #[arg(long, help = "Path to JSON configuration", default_value = "config.json")]
    pub config: PathBuf,

    #[arg(long, help = "Directory for the commit detail cache")]
    pub cache: Option<PathBuf>,

    #[arg(long = "repo", help = "Repository to analyze (repeatable, replaces configured list)")]
    pub repos: Vec<String>,

    #[arg(long, help = "Adoption date (RFC3339, YYYY-MM-DD, or 'N weeks ago')")]
    pub adoption_date: Option<String>,

    #[arg(long, help = "Length of the before window in weeks")]
    pub before_weeks: Option<f64>,

    #[arg(long, help = "Length of the after window in weeks")]
    pub after_weeks: Option<f64>,

    #[arg(long, help = "Minimum commits in both windows for a contributor to qualify")]
    pub min_commits: Option<u64>,

    #[arg(long, help = "Commit details fetched per repository and window")]
    pub sample_limit: Option<usize>,

    #[arg(long, value_enum, help = "Which commits get detail requests")]
    pub sample_policy: Option<SamplePolicy>,

    #[arg(long, value_enum, help = "How active days combine across repositories")]
    pub active_days: Option<ActiveDays>,

    #[arg(long, help = "Organization team slug whose members are analyzed")]
    pub team: Option<String>,

    #[arg(long, help = "Log filter when RUST_LOG is unset", default_value = "warn")]
    pub log_level: String,

    #[arg(long, short, help = "Hide progress spinners")]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compare contributor activity before and after the adoption date
    Analyze {
        #[arg(long, help = "Replay a snapshot instead of calling the API")]
        snapshot: Option<PathBuf>,

        #[arg(long, help = "Output as JSON")]
        json: bool,

        #[arg(long, help = "Also write the JSON report to this file")]
        output: Option<PathBuf>,

        #[arg(long, help = "Contributors listed in the top performer table", default_value_t = 5)]
        top: usize,

        #[arg(long, value_enum, help = "Metric used to rank contributors", default_value = "commits-per-week")]
        rank_by: Metric,
    },
    /// Record commit listings and sampled details for offline analysis
    Export {
        #[arg(long, help = "Snapshot file (stdout when omitted)")]
        output: Option<PathBuf>,
    },
    /// Check which API endpoints the token can reach
    Check {
        #[arg(long, help = "Output as JSON")]
        json: bool,
    },
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn execute(self) -> Result<()> {
        let show_progress = !self.common.quiet && !self.emits_json_on_stdout();
        let mut settings = self.common.settings()?;
        settings.aggregate.show_progress = show_progress;

        match self.command {
            Commands::Analyze { snapshot, json, output, top, rank_by } => crate::analysis::exec(
                settings,
                AnalyzeArgs { snapshot, json, output, top, rank_by },
            ),
            Commands::Export { output } => crate::export::exec(settings, output),
            Commands::Check { json } => crate::check::exec(settings, json),
        }
    }

    fn emits_json_on_stdout(&self) -> bool {
        match &self.command {
            Commands::Analyze { json, .. } | Commands::Check { json } => *json,
            Commands::Export { output } => output.is_none(),
        }
    }
}

impl CommonArgs {
    pub fn settings(&self) -> Result<Settings> {
        let config = Config::load(&self.config)?;
        let overrides = Overrides {
            repositories: self.repos.clone(),
            adoption_date: self.adoption_date.clone(),
            before_weeks: self.before_weeks,
            after_weeks: self.after_weeks,
            min_commits: self.min_commits,
            sample_limit: self.sample_limit,
            sample_policy: self.sample_policy,
            active_days: self.active_days,
            team: self.team.clone(),
            cache_dir: self.cache.clone(),
        };
        Settings::resolve(config, overrides).context("Invalid configuration")
    }
}
