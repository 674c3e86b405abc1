use comfy_table::Table;
use kubestrap::bootstrap::{RESET_POLICY, Stage};

pub async fn execute(_global: &crate::cli::GlobalFlags) -> anyhow::Result<()> {
    let mut table = Table::new();
    table.set_header(vec!["STEP", "STAGE", "ON FAILURE", "DESCRIPTION"]);

    for stage in Stage::ALL {
        let step = stage
            .step()
            .map(|(n, total)| format!("{}/{}", n, total))
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            step,
            stage.to_string(),
            stage.policy().to_string(),
            stage.description().to_string(),
        ]);
    }

    println!("{table}");
    println!("Reset of earlier runs before init: {}", RESET_POLICY);
    Ok(())
}
