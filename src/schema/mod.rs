//! trend.sample_batch.v1 input schema
//!
//! This module defines the input envelope for sample batches along with the
//! adapters that parse and validate it.

mod adapter;
mod batch;

pub use adapter::*;
pub use batch::*;
