use clap::Args;
use comfy_table::Table;
use kubestrap::bootstrap::{Orchestrator, RunReport};
use kubestrap::{AnsibleRunner, FileInventoryWriter};

use crate::cli::{secret_notice, topology_without};
use crate::progress::ConsoleProgress;

#[derive(Args, Debug)]
pub struct BootstrapArgs {
    /// Leave this worker out of the run (repeatable)
    #[arg(long = "skip-worker", value_name = "ADDRESS")]
    pub skip_workers: Vec<String>,
}

pub async fn execute(args: BootstrapArgs, global: &crate::cli::GlobalFlags) -> anyhow::Result<()> {
    let config = global.load_config()?;
    println!("{}", secret_notice(&config));
    let topology = topology_without(&config, &args.skip_workers)?;

    let runner = AnsibleRunner::new(&config.inventory_path);
    let writer = FileInventoryWriter::new(&config.inventory_path);

    println!(
        "Bootstrapping cluster: control plane {}, {} worker(s)",
        topology.control_plane(),
        topology.workers().len()
    );

    let mut orchestrator =
        Orchestrator::new(&config, &topology, &runner, &writer).with_progress(ConsoleProgress);
    let result = orchestrator.run().await;

    println!();
    println!("{}", summary_table(orchestrator.report()));

    result?;

    let advisories = orchestrator.report().advisories().count();
    if advisories > 0 {
        println!("Cluster ready with {} warning(s)", advisories);
    } else {
        println!("Cluster ready");
    }
    Ok(())
}

fn summary_table(report: &RunReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["STAGE", "STATUS", "DETAIL"]);
    for record in report.records() {
        table.add_row(vec![
            record.stage.to_string(),
            record.status.to_string(),
            record.detail.clone().unwrap_or_default(),
        ]);
    }
    table
}
