use anyhow::Context;
use clap::Args;
use std::path::PathBuf;
use tokio::io::AsyncReadExt;

#[derive(Args, Debug)]
pub struct JoinCommandArgs {
    /// File holding `kubeadm init` output; reads stdin when omitted
    pub file: Option<PathBuf>,
}

pub async fn execute(args: JoinCommandArgs, _global: &crate::cli::GlobalFlags) -> anyhow::Result<()> {
    let text = match &args.file {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut text = String::new();
            tokio::io::stdin()
                .read_to_string(&mut text)
                .await
                .context("failed to read stdin")?;
            text
        }
    };

    let token = kubestrap::token::extract(&text)?;
    println!("{}", token);
    Ok(())
}
