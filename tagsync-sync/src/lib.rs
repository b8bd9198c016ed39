//! # tagsync-sync
//!
//! Run orchestration: scan both trees, pair, sync each pair, publish once.
//!
//! Build a [`RunConfig`], then call [`pipeline::run`] (or the two phases
//! [`pipeline::sync`] and [`pipeline::publish`] separately to report between
//! them).

pub mod config;
pub mod error;
pub mod pipeline;

pub use config::RunConfig;
pub use error::PipelineError;
pub use pipeline::{Publication, RunReport, SyncReport};
