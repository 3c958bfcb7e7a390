use anyhow::Context;
use bubbletea_rs::Program;
use lifecycle_widgets::{logging, App, Config, Error};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    config.validate()?;
    logging::init(&config).context("failed to set up logging")?;

    info!(
        seconds = config.seconds,
        interval_ms = config.interval_ms,
        heavy_iterations = config.heavy_iterations,
        "starting lifecycle demo"
    );
    config.install()?;

    let program = Program::<App>::builder()
        .alt_screen(true)
        .build()
        .map_err(|e| Error::Runtime(e.to_string()))?;

    if let Err(e) = program.run().await {
        error!(error = %e, "program exited with an error");
        return Err(Error::Runtime(e.to_string()).into());
    }

    info!("lifecycle demo finished");
    Ok(())
}
