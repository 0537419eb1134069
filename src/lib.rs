pub mod analysis;
pub mod cache;
pub mod check;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod github;
pub mod model;
pub mod snapshot;
pub mod source;
pub mod util;
