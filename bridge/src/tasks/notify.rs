use flow_summary_model::RunSummary;
use serde_json::Value;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::exchange::{keys, Exchange, ExchangeError};

#[derive(Debug, Tabled)]
pub struct NotifyRow {
    #[tabled(rename = "Records")]
    pub records: u64,
    #[tabled(rename = "Duration (s)", display = "float2")]
    pub duration: f64,
    #[tabled(rename = "Throughput (records/s)")]
    pub throughput: String,
    #[tabled(rename = "Succeeded")]
    pub succeeded: bool,
}

impl From<&RunSummary> for NotifyRow {
    fn from(summary: &RunSummary) -> Self {
        Self {
            records: summary.records_processed,
            duration: summary.total_duration,
            throughput: summary
                .throughput()
                .map(|t| format!("{t:.2}"))
                .unwrap_or_else(|| "n/a".to_string()),
            succeeded: summary.all_stages_succeeded,
        }
    }
}

fn float2(n: &f64) -> String {
    format!("{:.2}", n)
}

/// Reports the outcome of a run from the values the extract step published.
pub struct NotifyTask;

impl NotifyTask {
    /// Rebuild the [RunSummary] published for this run.
    pub fn summary<E>(exchange: &E) -> Result<RunSummary, ExchangeError>
    where
        E: Exchange,
    {
        let records_processed = pull_extracted(exchange, keys::RECORDS_PROCESSED, Value::as_u64)?;
        let total_duration = pull_extracted(exchange, keys::FLOW_DURATION, Value::as_f64)?;
        let all_stages_succeeded = pull_extracted(exchange, keys::FLOW_SUCCESS, Value::as_bool)?;

        Ok(RunSummary {
            records_processed,
            total_duration,
            all_stages_succeeded,
        })
    }

    pub fn render(summary: &RunSummary) -> String {
        let mut table = Table::new([NotifyRow::from(summary)]);
        table.with(Style::modern());
        table.to_string()
    }

    pub fn run<E>(exchange: &E) -> Result<RunSummary, ExchangeError>
    where
        E: Exchange,
    {
        let summary = Self::summary(exchange)?;
        println!("\nPipeline completed");
        println!("{}", Self::render(&summary));

        Ok(summary)
    }
}

fn pull_extracted<E, T>(
    exchange: &E,
    key: &str,
    convert: impl Fn(&Value) -> Option<T>,
) -> Result<T, ExchangeError>
where
    E: Exchange,
{
    let value =
        exchange
            .pull(keys::EXTRACT_TASK, key)?
            .ok_or_else(|| ExchangeError::MissingKey {
                task_id: keys::EXTRACT_TASK.to_string(),
                key: key.to_string(),
            })?;

    convert(&value).ok_or_else(|| ExchangeError::UnexpectedValue {
        task_id: keys::EXTRACT_TASK.to_string(),
        key: key.to_string(),
        value,
    })
}
