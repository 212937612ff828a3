use dotenv::dotenv;
use social_posts_backend::{
    config::Config,
    routes::{configure_cors, create_routes},
    AppState,
};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match Config::init() {
        Ok(config) => config,
        Err(err) => {
            error!("🔥 Invalid configuration: {}", err);
            std::process::exit(1);
        }
    };
    let port = config.port;

    let app_state = match AppState::init(config).await {
        Ok(app_state) => app_state,
        Err(err) => {
            error!("🔥 Failed to initialize storage: {}", err);
            std::process::exit(1);
        }
    };

    let app = create_routes(app_state.clone()).layer(configure_cors());

    let listener = match tokio::net::TcpListener::bind(format!("[::]:{}", port)).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("🔥 Failed to bind port {}: {}", port, err);
            app_state.shutdown().await;
            std::process::exit(1);
        }
    };
    info!("Server Port: {}", port);

    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", err);
    }

    app_state.shutdown().await;
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!("Failed to listen for ctrl-c: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                error!("Failed to listen for SIGTERM: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutting down");
}
