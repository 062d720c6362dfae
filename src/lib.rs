//! Synheart Trend - On-device aggregation of health samples into chart series
//!
//! Trend turns a batch of timestamped samples into a fixed-cardinality chart
//! series through a deterministic pipeline: bucketing → averaging → axis
//! generation → alignment with zero fill → payload encoding.
//!
//! ## Modules
//!
//! - **Engine**: [`bucketer`], [`axis`] and [`aligner`] implement the
//!   aggregation itself and are pure functions of their inputs
//! - **Surroundings**: [`labels`], [`query`], [`schema`], [`encoder`] and
//!   [`pipeline`] turn raw JSON into chart payloads

pub mod aligner;
pub mod axis;
pub mod bucketer;
pub mod config;
pub mod encoder;
pub mod error;
pub mod labels;
pub mod pipeline;
pub mod query;
pub mod schema;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use aligner::{Aggregation, SeriesAligner};
pub use bucketer::TimeBucketer;
pub use config::ChartConfig;
pub use error::ComputeError;
pub use pipeline::{samples_to_chart, ChartProcessor};
pub use types::{AxisPoint, AxisSeries, BucketKey, ChartTimezone, Granularity, Orientation, Sample};

// Schema exports
pub use schema::{SampleAdapter, SampleBatch, SCHEMA_VERSION};

/// Trend version embedded in all chart payloads
pub const TREND_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for chart payloads
pub const PRODUCER_NAME: &str = "synheart-trend";
