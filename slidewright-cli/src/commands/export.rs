use std::path::PathBuf;

use colored::Colorize;
use slidewright_core::{
    export, open_store, ExportDocument, ExportFormat, ExportSettings, SlidewrightConfig,
};

pub async fn handle_export_command(
    config: &SlidewrightConfig,
    id: &str,
    format: &str,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let format: ExportFormat = format.parse()?;
    let store = open_store(config).await?;
    let presentation = store.require(id).await?;

    let artifact = export(
        &ExportDocument::from(&presentation),
        format,
        &ExportSettings::from(&config.export),
    )?;

    let path = output.unwrap_or_else(|| PathBuf::from(&artifact.filename));
    tokio::fs::write(&path, &artifact.bytes).await?;

    println!(
        "{} Exported '{}' as {} to {} ({} bytes)",
        "✓".green().bold(),
        presentation.name.bold(),
        format,
        path.display().to_string().bold(),
        artifact.bytes.len()
    );

    Ok(())
}
