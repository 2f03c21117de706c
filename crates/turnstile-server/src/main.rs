use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use turnstile_audit::{start_of_day, AuditLog};
use turnstile_credentials::CleanupScheduler;
use turnstile_identity::{current_timestamp, IdentityStore};

mod config;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "turnstile_server=debug,turnstile_credentials=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!(
        database = %config.database_path.display(),
        "Starting turnstile server"
    );

    let state = AppState::new(config).await?;
    let enrolled = state.identities.count_identities().await?;
    let today = state
        .audit
        .daily_stats(start_of_day(current_timestamp()))
        .await?;
    tracing::info!(
        enrolled,
        attempts_today = today.attempts,
        denied_today = today.denied,
        "Services ready"
    );

    let scheduler = CleanupScheduler::new(state.credentials.clone())
        .with_interval(state.config.cleanup_interval)
        .with_validity(Some(state.config.credential_validity))
        .start();

    shutdown_signal().await?;

    scheduler.stop().await;
    tracing::info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() -> Result<()> {
    #[cfg(unix)]
    {
        let mut terminate =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;

        tokio::select! {
            result = tokio::signal::ctrl_c() => result?,
            _ = terminate.recv() => {},
        }
    }

    #[cfg(not(unix))]
    tokio::signal::ctrl_c().await?;

    tracing::info!("Graceful shutdown initiated");
    Ok(())
}
