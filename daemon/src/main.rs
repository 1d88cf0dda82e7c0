mod config;
mod protocol;
mod server;

use std::sync::Arc;

use anyhow::Result;
use config::{DaemonConfig, StorageBackend};
use roulette_core::clock::SystemClock;
use roulette_core::storage::{JsonFileStore, KeyValueStore, MemoryStore};
use roulette_core::{HistoryHook, HistoryStore};
use server::BiasServer;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = DaemonConfig::load()?;
    info!(
        socket = %config.server.socket_path.display(),
        storage_backend = ?config.storage.backend,
        storage_path = %config.storage.path.display(),
        history_key = %config.storage.history_key,
        use_history = config.bias.use_history,
        strength = config.bias.strength,
        window_days = config.bias.window_days,
        winner_fields = ?config.hook.winner_fields,
        "loaded roulette bias config"
    );

    let backend: Arc<dyn KeyValueStore> = match config.storage.backend {
        StorageBackend::File => Arc::new(JsonFileStore::new(config.storage.path.clone())),
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
    };
    let store = HistoryStore::new(backend, Arc::new(SystemClock))
        .with_key(config.storage.history_key.clone());
    let hook = HistoryHook::new(Arc::new(store), Arc::new(config.bias.clone()))
        .with_sources(config.hook.winner_sources())
        .with_reset_confirmation(config.hook.reset_confirmation.clone());

    let server = BiasServer::new(config.server.clone(), hook);
    server.run().await
}
