use std::sync::Arc;

use log::{error, info, warn};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;

use crate::{AssetStore, Catalog, Error, ItemDraft, Result};

pub struct Router {
    store: Arc<dyn Catalog>,
    assets: Arc<dyn AssetStore>,
    semaphore: Arc<Semaphore>,
}

impl Router {
    pub fn new(store: Arc<dyn Catalog>, assets: Arc<dyn AssetStore>) -> Self {
        Self {
            store,
            assets,
            semaphore: Arc::new(Semaphore::new(100)),
        }
    }

    pub async fn listen(&self, port: &str) -> Result<()> {
        let listener = TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
        info!("Curio Store listening on port {}", port);

        loop {
            let (socket, _) = listener.accept().await?;
            let store = self.store.clone();
            let assets = self.assets.clone();
            let sem = self.semaphore.clone();

            tokio::spawn(async move {
                let _permit = match sem.try_acquire() {
                    Ok(p) => p,
                    Err(_) => {
                        error!("Server busy: too many concurrent connections. Rejecting...");
                        // Ensure it's closed
                        let mut socket = socket;
                        let _ = socket.shutdown().await;
                        return;
                    }
                };

                if let Err(e) = handle_connection(socket, store, assets).await {
                    error!("Connection error: {}", e);
                }
            });
        }
    }
}

/// Rejects drafts the factory must never see.
///
/// The store and factory assume pre-validated input; every empty required
/// field is caught here, at the boundary.
fn validate_draft(draft: &ItemDraft) -> Result<()> {
    if draft.title.trim().is_empty() || draft.description.trim().is_empty() {
        return Err(Error::InvalidInput(
            "title and description are required".to_string(),
        ));
    }
    if draft.image_url.trim().is_empty() {
        return Err(Error::InvalidInput("image reference is required".to_string()));
    }
    Ok(())
}

pub async fn handle_connection(
    mut socket: TcpStream,
    store: Arc<dyn Catalog>,
    assets: Arc<dyn AssetStore>,
) -> Result<()> {
    let (reader, mut writer) = socket.split();
    let mut reader = BufReader::new(reader);
    let mut line = String::new();

    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line).await?;
        if bytes_read == 0 {
            break;
        }

        let parts: Vec<&str> = line.trim().split_whitespace().collect();
        if parts.is_empty() {
            continue;
        }

        let command = parts[0].to_uppercase();
        let response = match command.as_str() {
            "CREATE" => {
                if parts.len() < 2 {
                    "ERR missing arguments".to_string()
                } else {
                    let draft_str = parts[1..].join(" ");
                    match serde_json::from_str::<ItemDraft>(&draft_str) {
                        Ok(draft) => match validate_draft(&draft) {
                            Ok(()) => match store.create(draft).await {
                                Ok(item) => format!("OK {}", serde_json::to_string(&item)?),
                                Err(e) => format!("ERR {}", e.to_string().to_lowercase()),
                            },
                            Err(e) => format!("ERR {}", e.to_string().to_lowercase()),
                        },
                        Err(_) => "ERR invalid json draft".to_string(),
                    }
                }
            }
            "LIST" => match store.list().await {
                Ok(items) => format!("OK {}", serde_json::to_string(&items)?),
                Err(e) => format!("ERR {}", e.to_string().to_lowercase()),
            },
            "GET" => {
                if parts.len() < 2 {
                    "ERR missing arguments".to_string()
                } else {
                    match store.get(parts[1]).await {
                        Ok(item) => format!("OK {}", serde_json::to_string(&item)?),
                        Err(e) => format!("ERR {}", e.to_string().to_lowercase()),
                    }
                }
            }
            "DEL" => {
                if parts.len() < 2 {
                    "ERR missing arguments".to_string()
                } else {
                    match store.get(parts[1]).await {
                        Ok(item) => {
                            // Best effort: the record must go even if the
                            // asset cannot.
                            if let Err(e) = assets.delete(&item.image_url).await {
                                warn!("Could not delete asset {}: {}", item.image_url, e);
                            }
                            match store.remove(parts[1]).await {
                                Ok(removed) => format!("OK {}", removed),
                                Err(e) => format!("ERR {}", e.to_string().to_lowercase()),
                            }
                        }
                        Err(Error::NotFound) => "OK false".to_string(),
                        Err(e) => format!("ERR {}", e.to_string().to_lowercase()),
                    }
                }
            }
            "UPLOAD" => {
                if parts.len() < 4 {
                    "ERR missing arguments".to_string()
                } else {
                    let (name, content_type) = (parts[1], parts[2]);
                    if !content_type.starts_with("image/") {
                        "ERR invalid input: file must be an image".to_string()
                    } else {
                        match hex::decode(parts[3]) {
                            Ok(data) => match assets.put(name, content_type, &data).await {
                                Ok(url) => format!("OK {}", serde_json::to_string(&url)?),
                                Err(e) => format!("ERR {}", e.to_string().to_lowercase()),
                            },
                            Err(_) => "ERR invalid hex payload".to_string(),
                        }
                    }
                }
            }
            "PING" => "PONG".to_string(),
            "QUIT" => break,
            _ => "ERR unknown command".to_string(),
        };

        writer.write_all(format!("{}\n", response).as_bytes()).await?;
    }
    Ok(())
}
