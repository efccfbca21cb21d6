use axum::Router;
use host_inventory::config::LogSection;
use host_inventory::{common_routes, host_routes, AppState, Config, HostService, HostStore};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let config = Config::load()?;
    init_tracing(&config.log);

    let pool = config.database.connect().await?;
    HostStore::ensure_tables(&pool).await?;

    let state = AppState {
        pool: pool.clone(),
        hosts: HostService::new(HostStore::new(pool)),
    };

    let app = Router::new()
        .merge(common_routes(state.clone()))
        .merge(host_routes(state));

    let listener = TcpListener::bind(config.app.addr()).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("service stop complete");
    Ok(())
}

/// Level comes from the config; `RUST_LOG` overrides it when set.
fn init_tracing(log: &LogSection) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));
    match log.format.as_str() {
        "json" => tracing_subscriber::fmt().with_env_filter(filter).json().init(),
        _ => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("install sigterm handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("received shutdown signal, starting graceful shutdown");
}
