use std::env;
use std::sync::Arc;

use clap::Parser;
use curio_store::engine::{FsAssetStore, MemStore};
use curio_store::server::Router;
use tokio::signal;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long)]
    asset_dir: Option<String>,

    #[arg(short, long)]
    port: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let asset_dir = args
        .asset_dir
        .or_else(|| env::var("CURIO_ASSET_DIR").ok())
        .unwrap_or_else(|| "assets".to_string());

    let port = args
        .port
        .or_else(|| env::var("CURIO_PORT").ok())
        .unwrap_or_else(|| "7010".to_string());

    let assets = Arc::new(FsAssetStore::new(&asset_dir)?);
    let store = Arc::new(MemStore::new());

    let router = Router::new(store.clone(), assets);

    println!("Starting Curio Store Daemon...");
    println!("Engine started. Records are volatile; assets stored under {}.", asset_dir);
    println!("Curio Engine listening on :{} (TCP)", port);

    tokio::select! {
        res = router.listen(&port) => {
            if let Err(e) = res {
                eprintln!("TCP Server failed: {}", e);
            }
        }
        _ = signal::ctrl_c() => {
            println!("\nShutdown signal received. Discarding {} record(s). Exiting.", store.len());
        }
    }

    Ok(())
}
