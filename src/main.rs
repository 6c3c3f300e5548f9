use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use survey_intake::config::Config;
use survey_intake::db::postgres::{primary_pool, replica_pool};
use survey_intake::service::bootstrap;
use survey_intake::{SurveyState, survey_router};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = Config::load()?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        primary = cfg.primary_host(),
        replica = cfg.replica_host(),
        database = cfg.database_name(),
        user = cfg.user(),
        loglevel = cfg.loglevel()
    );

    // Serve only once the schema is in place.
    if let Err(e) = bootstrap(&cfg).await {
        error!(error = %e, "bootstrap failed; exiting");
        return Err(e.into());
    }

    let state = SurveyState::new(primary_pool(&cfg)?, replica_pool(&cfg)?);
    let app = survey_router(state);

    let addr = cfg.listen_addr()?;
    let listener = TcpListener::bind(addr).await?;
    info!("Server is running on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => error!(error = %e, "failed to listen for SIGTERM"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
