use clap::{Parser, Subcommand};
use colored::Colorize;
use slidewright_core::{CliErrorDisplay, LoggingConfig, SlidewrightConfig, SlidewrightError};
use std::process::ExitCode;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

use commands::{
    handle_export_command, handle_generate_command, handle_presentations_command,
    handle_serve_command, GenerateArgs, PresentationsCommand,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const NAME: &str = env!("CARGO_PKG_NAME");

#[derive(Parser)]
#[command(name = "slidewright")]
#[command(version = VERSION)]
#[command(about = "Slidewright - turn a prompt into a slide deck")]
#[command(long_about = r#"
Slidewright sends a prompt to a Gemini model, turns the reply into slides,
illustrates the slides that ask for an image, and keeps every deck together
with the conversation that produced it.

Set GOOGLE_API_KEY (or GEMINI_API_KEY), then try
'slidewright generate "quarterly sales report" --slides 3 --save Q3'.
Run 'slidewright serve' to expose the same operations over HTTP.
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Run the HTTP API server")]
    Serve {
        #[arg(long, help = "Address to bind (overrides server.host)")]
        host: Option<String>,

        #[arg(short, long, help = "Port to listen on (overrides server.port)")]
        port: Option<u16>,
    },

    #[command(about = "Generate slides from a prompt")]
    Generate(GenerateArgs),

    #[command(about = "Manage saved presentations")]
    Presentations {
        #[command(subcommand)]
        action: Option<PresentationsCommand>,
    },

    #[command(about = "Export a saved presentation as PPTX, JSON or a chat transcript")]
    Export {
        #[arg(help = "Presentation ID")]
        id: String,

        #[arg(short, long, default_value = "pptx", help = "Export format (pptx, json, chat)")]
        format: String,

        #[arg(short, long, help = "Output path (defaults to the export's filename)")]
        output: Option<std::path::PathBuf>,
    },

    #[command(about = "Show the effective configuration")]
    Config {
        #[arg(
            short,
            long,
            default_value = "text",
            help = "Output format (text, json)"
        )]
        format: String,
    },

    #[command(about = "Show version information")]
    Version {
        #[arg(short, long)]
        detailed: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match SlidewrightConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), SlidewrightError::from(e));
            return ExitCode::FAILURE;
        }
    };

    init_logging(cli.verbose, &config.logging);

    match run(cli, config).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<SlidewrightError>() {
                Some(err) => eprint!("{}: {}", "Error".red().bold(), CliErrorDisplay::new(err)),
                None => eprintln!("{}: {}", "Error".red().bold(), e),
            }
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool, logging: &LoggingConfig) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level))
    };

    // stdout carries command output, so logs go to stderr
    if logging.json_format {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .with(filter)
            .init();
    }
}

async fn run(cli: Cli, config: SlidewrightConfig) -> anyhow::Result<()> {
    match cli.command {
        Commands::Serve { host, port } => handle_serve_command(config, host, port).await,
        Commands::Generate(args) => handle_generate_command(&config, args).await,
        Commands::Presentations { action } => handle_presentations_command(&config, action).await,
        Commands::Export { id, format, output } => {
            handle_export_command(&config, &id, &format, output).await
        }
        Commands::Config { format } => cmd_config(&config, &format),
        Commands::Version { detailed } => cmd_version(detailed),
    }
}

fn cmd_config(config: &SlidewrightConfig, format: &str) -> anyhow::Result<()> {
    let config = config.redacted();

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let storage_path = config
        .storage_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "-".to_string());

    println!("{}", "Slidewright Configuration".cyan().bold());
    println!("{}", "═".repeat(40).dimmed());
    println!();

    println!("  {}", "Server".yellow().bold());
    println!("    {:<18} {}", "Address:", config.bind_address());
    println!("    {:<18} {}", "Permissive CORS:", config.server.cors_permissive);
    println!();

    println!("  {}", "Generation".yellow().bold());
    println!(
        "    {:<18} {}",
        "API key:",
        config
            .generation
            .api_key
            .as_deref()
            .map(|k| k.green().to_string())
            .unwrap_or_else(|| "not set".red().to_string())
    );
    println!("    {:<18} {}", "API base:", config.generation.api_base);
    println!("    {:<18} {}", "Text model:", config.generation.text_model);
    println!("    {:<18} {}", "Image model:", config.generation.image_model);
    println!(
        "    {:<18} {}s",
        "Timeout:", config.generation.request_timeout_secs
    );
    println!("    {:<18} {}", "Images:", config.generation.generate_images);
    println!(
        "    {:<18} {}",
        "Strict fields:", config.generation.require_slide_fields
    );
    println!();

    println!("  {}", "Storage".yellow().bold());
    println!("    {:<18} {}", "Backend:", config.storage.backend);
    println!("    {:<18} {}", "Path:", storage_path);
    println!();

    println!("  {}", "Logging".yellow().bold());
    println!("    {:<18} {}", "Level:", config.logging.level);
    println!("    {:<18} {}", "JSON:", config.logging.json_format);

    Ok(())
}

fn cmd_version(detailed: bool) -> anyhow::Result<()> {
    if detailed {
        println!("{}", "Slidewright Version Information".cyan().bold());
        println!("{}", "═".repeat(40).dimmed());
        println!("  {:<15} {}", "Version:".bold(), VERSION);
        println!("  {:<15} {}", "Name:".bold(), NAME);
        println!("  {:<15} Apache-2.0", "License:".bold());
        println!();
        println!("  {}", "Export Formats:".bold());
        println!("    ▣ PowerPoint (.pptx)");
        println!("    {{}} JSON");
        println!("    ≡ Chat transcript (.txt)");
        println!();
        println!("  {}", "Build Information:".bold());
        println!("    Rust Edition: 2021");
        #[cfg(debug_assertions)]
        println!("    Build:        Debug");
        #[cfg(not(debug_assertions))]
        println!("    Build:        Release");
    } else {
        println!("slidewright {}", VERSION);
    }

    Ok(())
}
