use anyhow::Context;

use crate::cli::{BridgeCli, BridgeCommand};
use crate::exchange::FileExchange;
use crate::result_bridge::ResultBridge;
use crate::tasks::{ExtractTask, FlowPipeline, NotifyTask, PrepareTask};

/// Execute the step selected on the command line.
pub fn run(cli: BridgeCli) -> anyhow::Result<()> {
    match cli.command {
        BridgeCommand::Prepare {
            input_files,
            batch_size,
            threshold,
            output,
        } => {
            let run_id = match cli.run_id {
                Some(run_id) => run_id,
                None => {
                    let run_id = nanoid::nanoid!();
                    println!("FLOW_RUN_ID={run_id}");
                    run_id
                }
            };
            let mut exchange = FileExchange::new(cli.exchange_file, run_id);

            PrepareTask::default()
                .input_files(input_files)
                .batch_size(batch_size)
                .threshold(threshold)
                .output(output)
                .run(&mut exchange)?;
        }
        BridgeCommand::Run { pipeline, flow_bin } => {
            FlowPipeline::new(pipeline).flow_bin(flow_bin).run()?;
        }
        BridgeCommand::Extract {
            metrics_file,
            results_file,
        } => {
            let run_id = cli.run_id.context("A run id is required to extract results")?;
            let mut exchange = FileExchange::new(cli.exchange_file, run_id);

            ExtractTask::new(ResultBridge::new(metrics_file, results_file)).run(&mut exchange)?;
        }
        BridgeCommand::Notify => {
            let run_id = cli.run_id.context("A run id is required to notify")?;
            let exchange = FileExchange::new(cli.exchange_file, run_id);

            NotifyTask::run(&exchange)?;
        }
    }

    Ok(())
}
