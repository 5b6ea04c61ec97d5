use std::sync::Arc;

use prometheus_client::collector::Collector;
use prometheus_client::encoding::{DescriptorEncoder, EncodeLabelSet, EncodeMetric};
use prometheus_client::metrics::counter::ConstCounter;
use prometheus_client::metrics::gauge::ConstGauge;
use prometheus_client::metrics::MetricType;
use prometheus_client::registry::Registry;

use crate::aggregator::MetricAggregator;

/// Content type of the text produced by [MetricsExposition::encode].
pub const OPENMETRICS_CONTENT_TYPE: &str =
    "application/openmetrics-text; version=1.0.0; charset=utf-8";

const STAGE_DURATION: &str = "flow_stage_duration_seconds";
const STAGE_SUCCESS: &str = "flow_stage_success";
const STAGE_FAILURE: &str = "flow_stage_failure";
const PIPELINE_DURATION: &str = "flow_pipeline_duration_seconds";

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
struct StageLabels {
    stage: String,
}

impl StageLabels {
    fn new(stage: &str) -> Self {
        Self {
            stage: stage.to_string(),
        }
    }
}

/// Renders the aggregate state of a [MetricAggregator] in the OpenMetrics text format.
///
/// Every encode takes a single snapshot, so one scrape always reports one consistent state.
#[derive(Debug)]
pub struct MetricsExposition {
    registry: Registry,
}

impl MetricsExposition {
    pub fn new(aggregator: Arc<MetricAggregator>) -> Self {
        let mut registry = Registry::default();
        registry.register_collector(Box::new(StageMetricsCollector { aggregator }));

        Self { registry }
    }

    pub fn encode(&self) -> Result<String, std::fmt::Error> {
        let mut buffer = String::new();
        prometheus_client::encoding::text::encode(&mut buffer, &self.registry)?;
        Ok(buffer)
    }
}

#[derive(Debug)]
struct StageMetricsCollector {
    aggregator: Arc<MetricAggregator>,
}

impl Collector for StageMetricsCollector {
    fn encode(&self, mut encoder: DescriptorEncoder) -> Result<(), std::fmt::Error> {
        let snapshot = self.aggregator.snapshot();

        {
            let mut metric_encoder = encoder.encode_descriptor(
                STAGE_DURATION,
                "Duration of Flow stages",
                None,
                MetricType::Histogram,
            )?;
            for (stage, histogram) in snapshot.histograms() {
                let labels = StageLabels::new(stage);
                // The text encoder renders `f64::MAX` as the `+Inf` bucket.
                let buckets = histogram
                    .buckets()
                    .iter()
                    .map(|(bound, count)| {
                        let bound = if bound.is_infinite() { f64::MAX } else { *bound };
                        (bound, *count)
                    })
                    .collect::<Vec<_>>();
                metric_encoder.encode_family(&labels)?.encode_histogram::<()>(
                    histogram.sum(),
                    histogram.count(),
                    &buckets,
                    None,
                )?;
            }
        }

        {
            let mut metric_encoder = encoder.encode_descriptor(
                STAGE_SUCCESS,
                "Total successful Flow stage executions",
                None,
                MetricType::Counter,
            )?;
            for (stage, count) in snapshot.success_counts() {
                let labels = StageLabels::new(stage);
                ConstCounter::new(count).encode(metric_encoder.encode_family(&labels)?)?;
            }
        }

        {
            let mut metric_encoder = encoder.encode_descriptor(
                STAGE_FAILURE,
                "Total failed Flow stage executions",
                None,
                MetricType::Counter,
            )?;
            for (stage, count) in snapshot.failure_counts() {
                let labels = StageLabels::new(stage);
                ConstCounter::new(count).encode(metric_encoder.encode_family(&labels)?)?;
            }
        }

        let gauge = ConstGauge::new(snapshot.pipeline_total_duration());
        let metric_encoder = encoder.encode_descriptor(
            PIPELINE_DURATION,
            "Total duration of Flow pipeline",
            None,
            gauge.metric_type(),
        )?;
        gauge.encode(metric_encoder)?;

        Ok(())
    }
}
