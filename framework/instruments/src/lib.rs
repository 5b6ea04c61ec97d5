//! Aggregation of Flow stage records into metric primitives, and their exposition for scraping.

mod aggregator;
mod exposition;
mod histogram;
mod state;

pub use aggregator::MetricAggregator;
pub use exposition::{MetricsExposition, OPENMETRICS_CONTENT_TYPE};
pub use histogram::{DurationHistogram, DEFAULT_BUCKETS};
pub use state::AggregateState;
