//! Entry point for the paige coaching-session backend (spec §6): loads
//! configuration, wires every core collaborator to the shared action
//! log and broadcast channel, and serves the UI hub's websocket plus
//! the tool surface's HTTP transport on one axum router.

mod observer_manager;
mod tool_routes;
mod ui_wiring;

use std::sync::Arc;

use paige_action_log::ActionLogStore;
use paige_buffer_cache::BufferCache;
use paige_coaching::CoachingPipeline;
use paige_config::Config;
use paige_memory_store::InMemoryMemoryStore;
use paige_memory_store::MemoryStore;
use paige_memory_store::NoopMemoryStore;
use paige_model_client::ModelClient;
use paige_model_client::NoopModelClient;
use paige_protocol::ServerMessage;
use paige_session::SessionRegistry;
use paige_tools::ToolContext;
use paige_ui_hub::Hub;
use paige_ui_hub::SessionLookup;
use std::time::Duration;
use tokio::sync::broadcast;

/// Adapts [`SessionRegistry`] to the UI hub's [`SessionLookup`] seam;
/// lives here because neither the trait nor the type belong to this
/// crate.
struct SessionLookupAdapter(Arc<SessionRegistry>);

impl SessionLookup for SessionLookupAdapter {
    fn active_session_id(&self) -> Option<u64> {
        self.0.active_session().map(|s| s.id)
    }
}

/// Network capabilities advertised in the connection handshake
/// (spec §4.1). Kept as a constant since no feature in this process
/// is conditionally enabled at runtime.
const CAPABILITIES: &[&str] = &["coaching", "review", "tools"];
const FEATURE_FLAGS: &[&str] = &[];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    paige_otel::init_tracing();

    let config = paige_config::load_from_env()?;
    tracing::info!(port = config.port, project_dir = %config.project_dir.display(), "starting paige");

    let action_log = Arc::new(ActionLogStore::open(&config.data_dir)?);
    let (broadcast_tx, _rx) = broadcast::channel::<ServerMessage>(256);

    let session_registry = SessionRegistry::new(
        action_log.clone(),
        broadcast_tx.clone(),
        Duration::from_millis(config.session_idle_ms),
    );
    let buffer_cache = Arc::new(BufferCache::new());

    // The real network model provider is an out-of-scope collaborator
    // (spec §1) implemented elsewhere; this process never fabricates
    // one, regardless of whether an API key is configured.
    let model_client: Arc<dyn ModelClient> = Arc::new(NoopModelClient);
    let memory_store: Arc<dyn MemoryStore> = if config.model_api_key.is_some() {
        Arc::new(InMemoryMemoryStore::new())
    } else {
        Arc::new(NoopMemoryStore::new())
    };

    let coaching = Arc::new(CoachingPipeline::new(
        action_log.clone(),
        memory_store,
        model_client.clone(),
        broadcast_tx.clone(),
    ));

    let tool_context = Arc::new(ToolContext::new(
        config.project_dir.clone(),
        action_log.clone(),
        session_registry.clone(),
        buffer_cache.clone(),
        broadcast_tx.clone(),
    ));
    let tool_registry = Arc::new(paige_tools::build_registry());

    let _observer_manager = observer_manager::start(
        action_log.clone(),
        model_client,
        broadcast_tx.clone(),
        config.observer,
    );

    let (hub, _relay_task) = Hub::start(broadcast_tx.clone());

    paige_ui_hub::register_handshake(
        &hub,
        format!("paige-{}", env!("CARGO_PKG_VERSION")),
        env!("CARGO_PKG_VERSION").to_string(),
        CAPABILITIES.iter().map(|s| s.to_string()).collect(),
        FEATURE_FLAGS.iter().map(|s| s.to_string()).collect(),
        Arc::new(SessionLookupAdapter(session_registry.clone())),
    )
    .await;

    let wiring = ui_wiring::Wiring {
        project_dir: config.project_dir.clone(),
        action_log: action_log.clone(),
        session_registry: session_registry.clone(),
        buffer_cache: buffer_cache.clone(),
        coaching,
        broadcast_tx: broadcast_tx.clone(),
    };
    ui_wiring::register(&hub, wiring).await;

    let _summary_timer = ui_wiring::spawn_buffer_summary_timer(
        action_log,
        buffer_cache,
        session_registry,
        Duration::from_millis(config.buffer_summary_interval_ms),
    );

    let app = paige_ui_hub::router(hub).merge(tool_routes::router(tool_registry, tool_context));

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!(port = config.port, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::warn!("failed to install ctrl-c handler");
    }
    tracing::info!("shutting down");
}
