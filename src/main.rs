//! Catchup server binary.

use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use catchup::adapters::http::{app_router, AppState};
use catchup::adapters::postgres::{ensure_schema, PostgresPreparationStore, PostgresSessionStore};
use catchup::adapters::supabase::{SupabaseClient, SupabasePreparationStore, SupabaseSessionStore};
use catchup::adapters::{
    FailoverPreparationStore, FailoverSessionStore, FilePreparationStore, FileSessionStore,
    MarkdownReportRenderer,
};
use catchup::config::AppConfig;
use catchup::domain::category::CategoryRegistry;
use catchup::ports::{PreparationStore, SessionStore};

type StoreChains = (Vec<Arc<dyn PreparationStore>>, Vec<Arc<dyn SessionStore>>);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config);
    config.validate()?;

    let (preparation_chain, session_chain) = build_store_chains(&config).await;
    let preparations = FailoverPreparationStore::new(preparation_chain);
    let sessions = FailoverSessionStore::new(session_chain);
    info!(stores = ?preparations.store_names(), "Store chain ready");

    let state = AppState::new(
        Arc::new(preparations),
        Arc::new(sessions),
        Arc::new(MarkdownReportRenderer::new()),
        CategoryRegistry::standard(),
    );
    let router = app_router(
        state,
        &config.server.cors_origins_list(),
        config.server.request_timeout(),
    );

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, environment = ?config.server.environment, "Catchup listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    if config.is_production() {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// PostgreSQL, then Supabase, then the local file store. A remote store
/// that cannot be set up is skipped; the local store is always present.
async fn build_store_chains(config: &AppConfig) -> StoreChains {
    let mut preparations: Vec<Arc<dyn PreparationStore>> = Vec::new();
    let mut sessions: Vec<Arc<dyn SessionStore>> = Vec::new();

    if let Some(database) = &config.database {
        match database.pool_options().connect(&database.url).await {
            Ok(pool) => {
                let schema = if database.ensure_schema {
                    ensure_schema(&pool).await
                } else {
                    Ok(())
                };
                match schema {
                    Ok(()) => {
                        preparations.push(Arc::new(PostgresPreparationStore::new(pool.clone())));
                        sessions.push(Arc::new(PostgresSessionStore::new(pool)));
                    }
                    Err(e) => error!(error = %e, "Could not prepare PostgreSQL schema, skipping store"),
                }
            }
            Err(e) => warn!(error = %e, "PostgreSQL unreachable at startup, skipping store"),
        }
    }

    if let Some(supabase) = &config.supabase {
        match SupabaseClient::new(supabase.rest_config()) {
            Ok(client) => {
                preparations.push(Arc::new(SupabasePreparationStore::new(client.clone())));
                sessions.push(Arc::new(SupabaseSessionStore::new(client)));
            }
            Err(e) => warn!(error = %e, "Supabase client not configured, skipping store"),
        }
    }

    let data_dir = &config.storage.data_dir;
    preparations.push(Arc::new(FilePreparationStore::new(data_dir)));
    sessions.push(Arc::new(FileSessionStore::new(data_dir)));

    (preparations, sessions)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    info!("Shutdown signal received");
}
