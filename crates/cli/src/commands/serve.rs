//! `panelforge serve`: start the HTTP API server.

use std::path::Path;
use std::sync::Arc;

use panelforge_gateway::{GatewayState, Runtime};

use super::load_config;

pub async fn run(config_path: Option<&Path>, port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = load_config(config_path)?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    let runtime = Runtime::from_config(&config)?;

    println!("PanelForge Gateway");
    println!("   Listening:    {}:{}", config.gateway.host, config.gateway.port);
    println!("   Store:        {}", config.store.resolved_path().display());
    println!("   Capabilities: {}", runtime.assistant.registry().len());

    let state = Arc::new(GatewayState::from(&runtime));
    panelforge_gateway::start(&config.gateway.host, config.gateway.port, state).await?;

    Ok(())
}
