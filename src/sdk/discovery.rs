use std::env;
use std::sync::Arc;

use crate::engine::MemStore;
use crate::sdk::Client;
use crate::{Catalog, Result};

/// Initializes a [`Catalog`] based on the environment.
///
/// `connect` automatically detects whether to talk to a remote daemon or
/// run an embedded engine:
///
/// 1. If the `CURIO_STORE_ADDR` environment variable is set, it attempts to
///    connect to that address in **Remote Mode**.
/// 2. Otherwise, it initializes a fresh [`MemStore`] in **Embedded Mode**.
///    The embedded store is volatile; its records last exactly as long as
///    the owning process.
///
/// # Examples
///
/// ```no_run
/// use curio_store::sdk;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let catalog = sdk::connect().await?;
///     Ok(())
/// }
/// ```
pub async fn connect() -> Result<Arc<dyn Catalog>> {
    if let Ok(addr) = env::var("CURIO_STORE_ADDR") {
        if !addr.is_empty() {
            match Client::connect(&addr).await {
                Ok(client) => return Ok(Arc::new(client)),
                Err(e) => {
                    log::warn!("Could not reach {}, falling back to embedded mode: {}", addr, e);
                }
            }
        }
    }

    Ok(Arc::new(MemStore::new()))
}
