use anyhow::Result;
use clap::Parser;
use radar_agent::{build_scheduler, config::Cli, shutdown_signal, telemetry, Settings};
use radar_kubehub::KubeStore;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_tracing();
    telemetry::init_metrics();
    let cli = Cli::parse();
    let settings = Settings::from_cli(&cli);

    // Without credentials no cycle can ever succeed.
    let client = match radar_kubehub::connect().await {
        Ok(c) => c,
        Err(e) => {
            error!(error = ?e, "cannot obtain cluster credentials");
            return Err(e);
        }
    };
    let scheduler = build_scheduler(&settings, KubeStore::new(client));

    if settings.once {
        let outcome = scheduler.run_cycle().await;
        info!(outcome = outcome.label(), "single cycle finished");
        return Ok(());
    }

    let cycles = scheduler.run(shutdown_signal()).await;
    info!(cycles, "fluxradar stopped");
    Ok(())
}
