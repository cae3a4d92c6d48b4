#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vitrine_api::auth::{HostedIdentity, IdentityProvider, LocalIdentity};
use vitrine_api::{construct_router, state::State};
use vitrine_storage::{StorageBackend, StorageConfig, create_backend};

mod config;

fn create_identity(
    config: &config::Config,
    storage: Arc<dyn StorageBackend>,
) -> Arc<dyn IdentityProvider> {
    if let StorageConfig::Hosted(hosted) = &config.storage_config {
        return Arc::new(HostedIdentity::new(hosted));
    }

    let secret = config.session_secret.clone().unwrap_or_else(|| {
        tracing::warn!("VITRINE_SESSION_SECRET not set, sessions will not survive a restart");
        vitrine_types::create_id()
    });
    Arc::new(LocalIdentity::new(storage, &secret, config.session_ttl))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting Vitrine API Service");

    let config = config::Config::from_env()?;
    tracing::info!("Loaded configuration: provider={}", config.provider());

    let storage = create_backend(&config.storage_config)?;
    let identity = create_identity(&config, storage.clone());
    let state = Arc::new(State::new(storage, identity));

    match (&config.admin_seed, config.provider()) {
        (Some(seed), provider) if provider != vitrine_storage::StorageProvider::Hosted => {
            state.auth.ensure_admin(&seed.email, &seed.password).await?;
        }
        (Some(_), _) => {
            tracing::warn!("Admin seeding is only done for local storage, ignoring");
        }
        (None, _) => {}
    }

    let app = construct_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
