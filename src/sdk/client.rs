use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::Mutex;

use crate::{CatalogReader, CatalogWriter, Error, Item, ItemDraft, Result};

/// Remote catalog client speaking the daemon's line protocol.
///
/// Implements the same traits as the embedded engine, so callers can hold
/// an `Arc<dyn Catalog>` without caring which mode they run in.
pub struct Client {
    addr: String,
    inner: Mutex<Option<ClientInner>>,
}

struct ClientInner {
    reader: BufReader<tokio::net::tcp::OwnedReadHalf>,
    writer: tokio::net::tcp::OwnedWriteHalf,
}

impl Client {
    pub async fn connect(addr: &str) -> Result<Self> {
        let inner = Client::connect_inner(addr).await?;
        Ok(Self {
            addr: addr.to_string(),
            inner: Mutex::new(Some(inner)),
        })
    }

    async fn send_and_receive(&self, cmd: String) -> Result<String> {
        let mut inner_guard = self.inner.lock().await;

        // Retry logic
        for i in 0..3 {
            if inner_guard.is_none() {
                match Client::connect_inner(&self.addr).await {
                    Ok(inner) => *inner_guard = Some(inner),
                    Err(e) => {
                        if i == 2 {
                            return Err(e);
                        }
                        tokio::time::sleep(std::time::Duration::from_millis((i + 1) * 200)).await;
                        continue;
                    }
                }
            }

            let inner = inner_guard.as_mut().unwrap();
            if inner
                .writer
                .write_all(format!("{}\n", cmd).as_bytes())
                .await
                .is_err()
            {
                *inner_guard = None;
                continue;
            }

            let mut resp = String::new();
            match inner.reader.read_line(&mut resp).await {
                Ok(0) => {
                    *inner_guard = None;
                    continue;
                }
                Ok(_) => {
                    let resp = resp.trim();
                    if let Some(msg) = resp.strip_prefix("ERR ") {
                        // Absence is a normal negative result, not a
                        // transport failure.
                        if msg == "item not found" {
                            return Err(Error::NotFound);
                        }
                        return Err(Error::Internal(msg.to_string()));
                    }
                    return Ok(resp.to_string());
                }
                Err(_) => {
                    *inner_guard = None;
                    continue;
                }
            }
        }

        Err(Error::Internal("failed after 3 attempts".to_string()))
    }

    async fn connect_inner(addr: &str) -> Result<ClientInner> {
        let stream = TcpStream::connect(addr).await?;
        let (reader, writer) = stream.into_split();
        Ok(ClientInner {
            reader: BufReader::new(reader),
            writer,
        })
    }

    fn payload(resp: &str) -> Result<&str> {
        resp.strip_prefix("OK ")
            .ok_or_else(|| Error::Internal("Invalid response".to_string()))
    }

    /// Uploads a binary asset and returns the URL the daemon stored it
    /// under. The payload travels hex-encoded on the wire.
    pub async fn upload(&self, name: &str, content_type: &str, data: &[u8]) -> Result<String> {
        let resp = self
            .send_and_receive(format!("UPLOAD {} {} {}", name, content_type, hex::encode(data)))
            .await?;
        Ok(serde_json::from_str(Self::payload(&resp)?)?)
    }
}

#[async_trait]
impl CatalogReader for Client {
    async fn get(&self, id: &str) -> Result<Item> {
        let resp = self.send_and_receive(format!("GET {}", id)).await?;
        Ok(serde_json::from_str(Self::payload(&resp)?)?)
    }

    async fn list(&self) -> Result<Vec<Item>> {
        let resp = self.send_and_receive("LIST".to_string()).await?;
        Ok(serde_json::from_str(Self::payload(&resp)?)?)
    }
}

#[async_trait]
impl CatalogWriter for Client {
    async fn create(&self, draft: ItemDraft) -> Result<Item> {
        let draft_str = serde_json::to_string(&draft)?;
        let resp = self.send_and_receive(format!("CREATE {}", draft_str)).await?;
        Ok(serde_json::from_str(Self::payload(&resp)?)?)
    }

    async fn remove(&self, id: &str) -> Result<bool> {
        let resp = self.send_and_receive(format!("DEL {}", id)).await?;
        Ok(serde_json::from_str(Self::payload(&resp)?)?)
    }
}
