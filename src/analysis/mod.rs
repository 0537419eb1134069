pub mod aggregate;
pub mod compare;
pub mod exec;
pub mod extrapolate;
pub mod output;
pub mod sample;
pub mod score;

pub use aggregate::{ActiveDays, AggregateSettings, Aggregator};
pub use compare::{compare, improvement_pct, rates, CompareSettings, Metric};
pub use exec::{exec, run, AnalyzeArgs};
pub use extrapolate::estimate_total;
pub use output::{output_json, output_summary};
pub use sample::{Pacing, SampleOutcome, SamplePolicy, Sampler};
pub use score::score;
