use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use futures::executor::block_on;

use mapview::config::load_app_config;
use mapview::document::intrinsic_size;
use mapview::storage::{unix_millis_now, DocumentId, DocumentStore, JsonFileStore};
use mapview::{logging, open_store};

#[derive(Parser)]
#[command(name = "mapview")]
#[command(about = "Manage map documents and their saved views")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store a map document
    Import {
        file: PathBuf,
        /// Display name; defaults to the file stem
        name: Option<String>,
    },
    /// List documents, most recently opened first
    List,
    /// Print a document's size and saved view
    Show { id: String },
    /// Delete a document
    Forget { id: String },
}

fn main() -> anyhow::Result<()> {
    logging::init();
    let cli = Cli::parse();

    let config = load_app_config();
    let store = open_store(&config).context("failed to open document store")?;

    match cli.command {
        Commands::Import { file, name } => import(&store, &file, name.as_deref()),
        Commands::List => list(&store),
        Commands::Show { id } => show(&store, &DocumentId::new(id)),
        Commands::Forget { id } => forget(&store, &DocumentId::new(id)),
    }
}

fn import(store: &JsonFileStore, file: &Path, name: Option<&str>) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let name = match name {
        Some(name) => name.to_string(),
        None => file
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("untitled")
            .to_string(),
    };
    let id = block_on(store.create_document(&name, &content, unix_millis_now()))
        .context("failed to store document")?;
    println!("{id}");
    Ok(())
}

fn list(store: &JsonFileStore) -> anyhow::Result<()> {
    let documents = block_on(store.list_documents()).context("failed to list documents")?;
    for summary in documents {
        let opened = summary
            .last_opened_at
            .map_or_else(|| "never".to_string(), |ms| ms.to_string());
        println!("{}\t{}\t{}", summary.id, opened, summary.name);
    }
    Ok(())
}

fn show(store: &JsonFileStore, id: &DocumentId) -> anyhow::Result<()> {
    let Some(record) = block_on(store.get_document(id)).context("failed to read document")? else {
        bail!("no document with id {id}");
    };
    let size = intrinsic_size(&record.content);
    println!("name: {}", record.name);
    println!("size: {} x {}", size.width, size.height);
    match record.saved_view.and_then(|view| view.to_transform()) {
        Some(transform) => println!(
            "view: scale {} rotation {}deg at ({}, {})\ncss: {}",
            transform.scale(),
            transform.rotation(),
            transform.position().x,
            transform.position().y,
            transform.affine()
        ),
        None => println!("view: fit to viewport"),
    }
    Ok(())
}

fn forget(store: &JsonFileStore, id: &DocumentId) -> anyhow::Result<()> {
    block_on(store.delete_document(id)).with_context(|| format!("failed to delete {id}"))?;
    tracing::info!(id = %id, "document deleted");
    Ok(())
}
