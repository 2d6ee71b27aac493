use log::error;
use std::process;

use cube_query_builder::{
    client::HttpCubeApi,
    config::{ApiConfig, SelectionConfig},
    Console, SelectionController,
};
use tokio::io::{stdin, stdout, BufReader};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let api_config = ApiConfig::new().map_err(|e| {
        error!("Failed to initialize API config: {}", e);
        e
    })?;

    let selection_config = SelectionConfig::new().map_err(|e| {
        error!("Failed to initialize selection config: {}", e);
        e
    })?;

    let client = HttpCubeApi::new(api_config).map_err(|e| {
        error!("Failed to create Cube API client: {}", e);
        e
    })?;

    let controller = SelectionController::new(client, selection_config);
    let console = Console::new(controller);

    if let Err(e) = console.run(BufReader::new(stdin()), stdout()).await {
        error!("Console encountered an error: {}", e);
        process::exit(1);
    }

    Ok(())
}
