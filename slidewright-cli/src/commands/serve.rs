use std::sync::Arc;

use colored::Colorize;
use slidewright_core::{serve, AppState, GeminiClient, SlidewrightConfig, SlidewrightError};
use tracing::warn;

pub async fn handle_serve_command(
    mut config: SlidewrightConfig,
    host: Option<String>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    config.validate().map_err(SlidewrightError::from)?;

    if config.require_api_key().is_err() {
        warn!("No API key configured; /api/generate-slides will fail until GOOGLE_API_KEY is set");
    }

    let content = Arc::new(GeminiClient::from_config(&config));
    let state = AppState::from_config(&config, content).await?;

    println!("{}", "Starting Slidewright API server...".cyan().bold());
    println!(
        "  {} Listening on http://{}",
        "→".blue(),
        config.bind_address()
    );
    println!(
        "  {} Text model: {}, image model: {}",
        "→".blue(),
        config.generation.text_model,
        if config.generation.generate_images {
            config.generation.image_model.as_str()
        } else {
            "disabled"
        }
    );
    println!("  {} Press Ctrl+C to stop", "→".blue());
    println!();

    serve(&config, state).await?;

    println!("{} {}", "✓".green().bold(), "Server stopped".green());
    Ok(())
}
