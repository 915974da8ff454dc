use std::path::PathBuf;

use anyhow::{Context, Result};
use travelplanner::{PlannerConfig, TravelPlanner, telemetry, web};

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = PlannerConfig::load_from_path(config_path).context("Failed to load configuration")?;

    telemetry::init(&config.logging)?;

    let planner = TravelPlanner::from_config(&config)?;
    web::run(planner, &config.server.host, config.server.port).await
}
