use std::sync::Arc;

use linkup::auth::AuthState;
use linkup::config::AppConfig;
use linkup::onboarding::{OnboardingManager, OnboardingRouteState, Reconciler, onboarding_routes};
use linkup::store::{MemoryProfileStore, ProfileStore};

#[tokio::main]
async fn main() -> linkup::error::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::from_env()?;

    eprintln!("Linkup v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Auth API: http://0.0.0.0:{}/api/auth/status", config.port);
    eprintln!(
        "   Usernames: {}-{} characters",
        config.username.min_len, config.username.max_len
    );
    eprintln!("   Profile store: in-memory\n");

    // ── Onboarding ──────────────────────────────────────────────────────
    let store: Arc<dyn ProfileStore> = Arc::new(MemoryProfileStore::new());
    let auth = AuthState::new();

    let reconciler = Arc::new(Reconciler::new(Arc::clone(&store), auth.clone()));
    let manager = Arc::new(OnboardingManager::new(
        Arc::clone(&reconciler),
        Arc::clone(&store),
        config.username.clone(),
    ));

    // Log every auth state transition
    let mut auth_rx = auth.subscribe();
    tokio::spawn(async move {
        while auth_rx.changed().await.is_ok() {
            let snapshot = auth_rx.borrow_and_update().clone();
            tracing::info!(
                uid = snapshot.local_user.as_ref().map(|u| u.uid.as_str()).unwrap_or("-"),
                data_loaded = snapshot.data_loaded,
                "Auth state changed"
            );
        }
    });

    // ── HTTP ────────────────────────────────────────────────────────────
    let app = onboarding_routes(OnboardingRouteState {
        reconciler,
        manager,
        auth,
    });

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    tracing::info!(port = config.port, "Onboarding server started");
    axum::serve(listener, app).await?;

    Ok(())
}
