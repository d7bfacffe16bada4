use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use health_agents_backend::config_manager::Config;
use health_agents_backend::routes;
use health_agents_backend::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("health_agents_backend=debug,tower_http=debug")),
        )
        .init();

    // Load configuration - try multiple paths
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| std::path::PathBuf::from("."));

    let config_paths: Vec<String> = vec![
        std::env::var("CONFIG_PATH").ok(),
        Some("conf.jsonld".to_string()),
        exe_dir.join("conf.jsonld").to_str().map(|s| s.to_string()),
        Some("conf.yaml".to_string()),
        exe_dir.join("conf.yaml").to_str().map(|s| s.to_string()),
    ]
    .into_iter()
    .flatten()
    .collect();

    let (config, loaded_path) = Config::load_first(&config_paths)?;
    info!("Loaded configuration from: {}", loaded_path);

    std::fs::create_dir_all(&config.system_config.storage_dir)?;

    let app_state = AppState::new(config.clone())?;
    let app = routes::app(app_state);

    let addr = config.system_config.bind_addr();
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
