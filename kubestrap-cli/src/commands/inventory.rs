use clap::Args;
use kubestrap::inventory::{self, FileInventoryWriter, InventoryWriter, render_ini};

use crate::cli::{secret_notice, topology_without};

#[derive(Args, Debug)]
pub struct InventoryArgs {
    /// Leave this worker out of the inventory (repeatable)
    #[arg(long = "skip-worker", value_name = "ADDRESS")]
    pub skip_workers: Vec<String>,

    /// Print the inventory to stdout instead of writing the file
    #[arg(long)]
    pub print: bool,
}

pub async fn execute(args: InventoryArgs, global: &crate::cli::GlobalFlags) -> anyhow::Result<()> {
    let config = global.load_config()?;
    let topology = topology_without(&config, &args.skip_workers)?;
    let groups = inventory::build(&topology)?;

    if args.print {
        // stdout carries only the inventory so it can be redirected to a file
        eprintln!("{}", secret_notice(&config));
        print!("{}", render_ini(&groups));
        return Ok(());
    }

    println!("{}", secret_notice(&config));
    let writer = FileInventoryWriter::new(&config.inventory_path);
    writer.write(&groups)?;
    println!(
        "Wrote {} ({} host(s))",
        writer.path().display(),
        groups.control_plane.len() + groups.workers.len()
    );
    Ok(())
}
