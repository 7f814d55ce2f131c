use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use colored::Colorize;
use serde_json::Value;
use slidewright_core::{
    export_pptx, open_store, ChatMessage, ExportSettings, GeminiClient, GenerateSlidesRequest,
    PresentationUpdate, SlideGenerator, SlidewrightConfig, FALLBACK_ERROR_MESSAGE,
};

use super::presentations::print_slides_table;

#[derive(Args)]
pub struct GenerateArgs {
    #[arg(help = "What the deck should be about")]
    pub prompt: String,

    #[arg(
        short = 'n',
        long = "slides",
        value_name = "N",
        help = "Number of slides (1-20, default 5)"
    )]
    pub slides: Option<String>,

    #[arg(
        long = "continue",
        value_name = "ID",
        help = "Revise a saved presentation, keeping its conversation"
    )]
    pub continue_id: Option<String>,

    #[arg(long, value_name = "NAME", help = "Save the result as a new presentation")]
    pub save: Option<String>,

    #[arg(short, long, help = "Also write the deck to a .pptx file")]
    pub output: Option<PathBuf>,

    #[arg(
        short,
        long,
        default_value = "text",
        help = "Output format (text, json)"
    )]
    pub format: String,
}

pub async fn handle_generate_command(
    config: &SlidewrightConfig,
    args: GenerateArgs,
) -> anyhow::Result<()> {
    let json = args.format == "json";
    let store = open_store(config).await?;

    let existing = match &args.continue_id {
        Some(id) => Some(store.require(id).await?),
        None => None,
    };

    let mut messages = existing
        .as_ref()
        .map(|p| p.messages.clone())
        .unwrap_or_default();
    messages.push(ChatMessage::user(args.prompt.clone()));

    let mut request = GenerateSlidesRequest::new(args.prompt.clone());
    if let Some(p) = &existing {
        request = request.with_previous_slides(p.slides.clone());
    }
    if let Some(count) = args.slides {
        request.slide_count = Value::String(count);
    }

    let generator =
        SlideGenerator::from_config(Arc::new(GeminiClient::from_config(config)), config);

    if !json {
        println!("{}", "Generating slides...".cyan().bold());
        println!("  {} {}", "You:".bold(), args.prompt);
    }

    let response = match generator.generate(&request).await {
        Ok(response) => response,
        Err(e) => {
            e.log();
            messages.push(ChatMessage::assistant(FALLBACK_ERROR_MESSAGE));

            // the failed turn stays in the saved conversation
            if let Some(p) = &existing {
                let update = PresentationUpdate {
                    messages: Some(messages),
                    ..Default::default()
                };
                store.update(&p.id, update).await?;
            }

            if json {
                let output = serde_json::json!({
                    "message": FALLBACK_ERROR_MESSAGE,
                    "error": e.detail(),
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                println!("  {} {}", "AI:".bold(), FALLBACK_ERROR_MESSAGE.red());
                println!();
            }
            return Err(e.into());
        }
    };

    messages.push(ChatMessage::assistant(response.message.clone()));

    let saved = match (existing, args.save) {
        (Some(p), _) => {
            let update = PresentationUpdate {
                name: None,
                messages: Some(messages),
                slides: Some(response.slides.clone()),
            };
            store.update(&p.id, update).await?
        }
        (None, Some(name)) => Some(store.save(&name, messages, response.slides.clone()).await?),
        (None, None) => None,
    };

    if let Some(path) = &args.output {
        let artifact = export_pptx(&response.slides, &ExportSettings::from(&config.export))?;
        tokio::fs::write(path, &artifact.bytes).await?;
    }

    if json {
        let mut output = serde_json::to_value(&response)?;
        if let (Some(p), Value::Object(map)) = (&saved, &mut output) {
            map.insert("presentationId".to_string(), Value::String(p.id.clone()));
        }
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("  {} {}", "AI:".bold(), response.message.green());
    println!();

    if response.slides.is_empty() {
        println!("{}", "The model returned no slides.".yellow());
    } else {
        print_slides_table(&response.slides);
    }

    if let Some(p) = &saved {
        println!();
        println!(
            "{} Saved as '{}' ({})",
            "✓".green().bold(),
            p.name.bold(),
            p.id.dimmed()
        );
    }

    if let Some(path) = &args.output {
        println!(
            "{} Wrote {}",
            "✓".green().bold(),
            path.display().to_string().bold()
        );
    }

    Ok(())
}
