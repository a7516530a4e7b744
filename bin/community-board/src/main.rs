//! # Community Board Binary
//!
//! Assembles the application from the plugins selected at compile time.

use std::sync::Arc;

use anyhow::Context;
use cb_api::{configure_routes, middleware, AppState};
use cb_config::{CredentialSchemeKind, LogFormat, Settings};
use cb_core::traits::CredentialScheme;
use cb_services::Services;
use chrono::FixedOffset;
use secrecy::ExposeSecret;
use tracing_subscriber::EnvFilter;

#[cfg(feature = "db-sqlite")]
use cb_db_sqlite::SqliteStore;

#[cfg(feature = "auth-simple")]
use cb_auth_simple::{Argon2Scheme, PlaintextScheme};

#[cfg(not(all(feature = "db-sqlite", feature = "auth-simple")))]
compile_error!("community-board needs the `db-sqlite` and `auth-simple` features");

/// `RUST_LOG` wins over the configured filter when set.
fn init_tracing(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.logging.filter));

    match settings.logging.format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(false)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

fn credential_scheme(kind: CredentialSchemeKind) -> Arc<dyn CredentialScheme> {
    match kind {
        CredentialSchemeKind::LegacyPlaintext => {
            tracing::warn!("credentials are stored in plaintext");
            Arc::new(PlaintextScheme)
        }
        CredentialSchemeKind::Argon2 => Arc::new(Argon2Scheme::new()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load()?;
    init_tracing(&settings);

    // 1. Storage
    let store = SqliteStore::new(
        settings.database.url.expose_secret(),
        settings.database.max_connections,
    )
    .await
    .context("failed to open the board database")?;

    // 2. Credentials
    let credentials = credential_scheme(settings.auth.credential_scheme);

    // 3. Services and routes
    let offset = FixedOffset::east_opt(settings.display.utc_offset_hours * 3600)
        .with_context(|| format!("invalid display offset: {}h", settings.display.utc_offset_hours))?;
    let state = AppState::new(Services::new(Arc::new(store), credentials), offset);

    let app = configure_routes(state)
        .layer(middleware::cors_policy(&settings.server.cors_origin)?)
        .layer(middleware::trace_layer());

    let address = settings.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;

    tracing::info!(%address, "community board listening");
    axum::serve(listener, app).await?;
    Ok(())
}
