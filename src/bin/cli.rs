use std::env;
use std::path::Path;

use clap::{Parser, Subcommand};
use curio_store::sdk::Client;
use curio_store::{CatalogReader, CatalogWriter, ItemDraft};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Daemon address; falls back to CURIO_STORE_ADDR, then 127.0.0.1:7010.
    #[arg(short, long)]
    addr: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Clone)]
enum Commands {
    /// Upload an image and create a new catalog item referencing it.
    Create { title: String, description: String, image: String },
    /// List all items, newest first.
    List,
    /// Show one item by id.
    Get { id: String },
    /// Delete an item (and its image) by id.
    Delete { id: String },
}

fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|s| s.to_str()) {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let addr = cli
        .addr
        .or_else(|| env::var("CURIO_STORE_ADDR").ok())
        .unwrap_or_else(|| "127.0.0.1:7010".to_string());
    let client = Client::connect(&addr).await?;

    match cli.command {
        Commands::Create { title, description, image } => {
            let path = Path::new(&image);
            let data = tokio::fs::read(path).await?;
            let name = path
                .file_name()
                .and_then(|s| s.to_str())
                .unwrap_or("upload.bin");
            let url = client.upload(name, content_type_for(path), &data).await?;
            let item = client.create(ItemDraft { title, description, image_url: url }).await?;
            println!("{}", serde_json::to_string_pretty(&item)?);
        }
        Commands::List => {
            let items = client.list().await?;
            println!("{}", serde_json::to_string_pretty(&items)?);
        }
        Commands::Get { id } => {
            let item = client.get(&id).await?;
            println!("{}", serde_json::to_string_pretty(&item)?);
        }
        Commands::Delete { id } => {
            if client.remove(&id).await? {
                println!("OK");
            } else {
                println!("not found");
            }
        }
    }

    Ok(())
}
