use clap::Subcommand;
use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, Color, Table};
use slidewright_core::{
    open_store, MessageRole, PresentationStore, PresentationUpdate, Slide, SlidewrightConfig,
    SlidewrightError,
};

#[derive(Subcommand)]
pub enum PresentationsCommand {
    #[command(about = "List saved presentations, newest first")]
    List {
        #[arg(
            short,
            long,
            default_value = "text",
            help = "Output format (text, json)"
        )]
        format: String,
    },

    #[command(about = "Show a presentation's slides and conversation")]
    Show {
        #[arg(help = "Presentation ID")]
        id: String,

        #[arg(
            short,
            long,
            default_value = "text",
            help = "Output format (text, json)"
        )]
        format: String,
    },

    #[command(about = "Rename a presentation")]
    Rename {
        #[arg(help = "Presentation ID")]
        id: String,

        #[arg(help = "New name")]
        name: String,
    },

    #[command(about = "Delete a presentation")]
    Delete {
        #[arg(help = "Presentation ID")]
        id: String,
    },
}

pub async fn handle_presentations_command(
    config: &SlidewrightConfig,
    cmd: Option<PresentationsCommand>,
) -> anyhow::Result<()> {
    let store = open_store(config).await?;

    match cmd.unwrap_or(PresentationsCommand::List {
        format: "text".to_string(),
    }) {
        PresentationsCommand::List { format } => cmd_list(store.as_ref(), &format).await,
        PresentationsCommand::Show { id, format } => cmd_show(store.as_ref(), &id, &format).await,
        PresentationsCommand::Rename { id, name } => cmd_rename(store.as_ref(), &id, &name).await,
        PresentationsCommand::Delete { id } => cmd_delete(store.as_ref(), &id).await,
    }
}

async fn cmd_list(store: &dyn PresentationStore, format: &str) -> anyhow::Result<()> {
    let presentations = store.list().await?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&presentations)?);
        return Ok(());
    }

    if presentations.is_empty() {
        println!("{}", "No saved presentations.".yellow());
        println!(
            "{}",
            "Create one with: slidewright generate \"<prompt>\" --save <name>".dimmed()
        );
        return Ok(());
    }

    println!("{}", "Presentations".cyan().bold());
    println!();

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("ID").fg(Color::White),
            Cell::new("Name").fg(Color::White),
            Cell::new("Slides").fg(Color::White),
            Cell::new("Messages").fg(Color::White),
            Cell::new("Updated").fg(Color::White),
        ]);

    for p in &presentations {
        table.add_row(vec![
            Cell::new(&p.id),
            Cell::new(truncate_string(&p.name, 30)),
            Cell::new(p.slides.len()),
            Cell::new(p.messages.len()),
            Cell::new(p.updated_at.format("%Y-%m-%d %H:%M").to_string()),
        ]);
    }

    println!("{table}");
    println!();
    println!("  Total: {} presentation(s)", presentations.len());

    Ok(())
}

async fn cmd_show(store: &dyn PresentationStore, id: &str, format: &str) -> anyhow::Result<()> {
    let presentation = store.require(id).await?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&presentation)?);
        return Ok(());
    }

    println!("{}", presentation.name.cyan().bold());
    println!("{}", "═".repeat(40).dimmed());
    println!("  {:<10} {}", "ID:".bold(), presentation.id);
    println!(
        "  {:<10} {}",
        "Created:".bold(),
        presentation.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!(
        "  {:<10} {}",
        "Updated:".bold(),
        presentation.updated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!();

    if presentation.slides.is_empty() {
        println!("  {}", "No slides.".yellow());
    } else {
        print_slides_table(&presentation.slides);
    }

    if !presentation.messages.is_empty() {
        println!();
        println!("  {}", "Conversation".yellow().bold());
        for message in &presentation.messages {
            let speaker = match message.role {
                MessageRole::User => message.role.speaker().blue().bold(),
                MessageRole::Assistant => message.role.speaker().green().bold(),
            };
            println!(
                "    {} {} {}",
                message.timestamp.format("%H:%M").to_string().dimmed(),
                speaker,
                message.content
            );
        }
    }

    Ok(())
}

async fn cmd_rename(store: &dyn PresentationStore, id: &str, name: &str) -> anyhow::Result<()> {
    let updated = store
        .update(id, PresentationUpdate::rename(name))
        .await?
        .ok_or_else(|| SlidewrightError::PresentationNotFound(id.to_string()))?;

    println!(
        "{} Renamed {} to '{}'",
        "✓".green().bold(),
        updated.id.dimmed(),
        updated.name.bold()
    );
    Ok(())
}

async fn cmd_delete(store: &dyn PresentationStore, id: &str) -> anyhow::Result<()> {
    if !store.delete(id).await? {
        return Err(SlidewrightError::PresentationNotFound(id.to_string()).into());
    }

    println!("{} Deleted presentation {}", "✓".green().bold(), id);
    Ok(())
}

pub(crate) fn print_slides_table(slides: &[Slide]) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("#").fg(Color::White),
            Cell::new("Title").fg(Color::White),
            Cell::new("Layout").fg(Color::White),
            Cell::new("Content").fg(Color::White),
            Cell::new("Image").fg(Color::White),
        ]);

    for (index, slide) in slides.iter().enumerate() {
        let image = if slide.has_image() {
            Cell::new("✓").fg(Color::Green)
        } else if slide.wants_image().is_some() {
            Cell::new("✗").fg(Color::Red)
        } else {
            Cell::new("-")
        };

        table.add_row(vec![
            Cell::new(index + 1),
            Cell::new(truncate_string(&slide.title, 30)),
            Cell::new(slide.layout.to_string()),
            Cell::new(truncate_string(&first_line(&slide.content), 40)),
            image,
        ]);
    }

    println!("{table}");
}

fn first_line(text: &str) -> String {
    let mut lines = text.lines();
    let first = lines.next().unwrap_or("").to_string();
    if lines.next().is_some() {
        format!("{} …", first)
    } else {
        first
    }
}

fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
