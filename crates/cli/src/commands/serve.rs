//! `uigen serve`: Start the HTTP gateway.

use uigen_config::AppConfig;

pub async fn run(
    port_override: Option<u16>,
    host_override: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }
    if let Some(host) = host_override {
        config.gateway.host = host;
    }

    if !config.has_api_key() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set ANTHROPIC_API_KEY (or UIGEN_API_KEY), or add `api_key` to:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    println!("UIGen Gateway");
    println!("   Listening: {}", config.bind_addr());
    println!("   Model:     {}", config.model);
    println!("   Store:     {}", config.store.backend);

    uigen_gateway::start(config).await?;

    Ok(())
}
