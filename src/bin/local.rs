use log::{error, info};
use std::process;

use cube_query_builder::{
    client::LocalCubeApi,
    config::{BackendConfig, SelectionConfig},
    Console, SelectionController,
};
use tokio::io::{stdin, stdout, BufReader};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let backend_config = BackendConfig::new().map_err(|e| {
        error!("Failed to initialize backend config: {}", e);
        e
    })?;
    info!(
        "Backend options: {}",
        serde_json::to_string(&backend_config.create_options())?
    );

    let selection_config = SelectionConfig::new().map_err(|e| {
        error!("Failed to initialize selection config: {}", e);
        e
    })?;

    let controller = SelectionController::new(LocalCubeApi::mock(), selection_config);
    let console = Console::new(controller);

    if let Err(e) = console.run(BufReader::new(stdin()), stdout()).await {
        error!("Console encountered an error: {}", e);
        process::exit(1);
    }

    Ok(())
}
