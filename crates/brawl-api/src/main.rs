//! Brawl server entry point.

use std::future::IntoFuture;
use std::sync::{Arc, Mutex};

use brawl_api::config::AppConfig;
use brawl_api::error::AppError;
use brawl_api::relay::DisplayRelay;
use brawl_api::state::AppState;
use brawl_arena::application::arena::Arena;
use brawl_broadcast::Broadcaster;
use brawl_core::clock::SystemClock;
use brawl_core::rng::{DeterministicRng, SystemRng};
use brawl_oracle::{HttpOracle, HttpSpeech, Oracle, Speech};
use brawl_orchestrator::{Ingestor, LoopContext, Supervisor, spawn_ingestion};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting brawl server");

    let config = AppConfig::from_env()?;

    let broadcaster = Broadcaster::new(Arc::new(SystemClock), config.keepalive);
    let _keepalive = broadcaster.spawn_keepalive();

    let oracle: Arc<dyn Oracle> = Arc::new(
        HttpOracle::new(&config.oracle_url, config.oracle_timeout)
            .map_err(|e| AppError::Config(format!("oracle client: {e}")))?,
    );
    let speech: Option<Arc<dyn Speech>> = match &config.tts_url {
        Some(url) => Some(Arc::new(
            HttpSpeech::new(url, config.oracle_timeout)
                .map_err(|e| AppError::Config(format!("speech client: {e}")))?,
        )),
        None => None,
    };
    let _relay = match &config.display_url {
        Some(url) => Some(DisplayRelay::new(url, config.oracle_timeout)?.spawn(&broadcaster)),
        None => None,
    };

    let rng: Arc<Mutex<dyn DeterministicRng + Send>> = Arc::new(Mutex::new(SystemRng));
    let ctx = LoopContext {
        config: Arc::new(config.match_config.clone()),
        oracle,
        speech: speech.clone(),
        broadcaster: Arc::clone(&broadcaster),
        rng,
    };

    let arena = Arena::new(config.max_health, config.message_max_length);
    let (supervisor, supervisor_task) = Supervisor::spawn(ctx, arena.clone());

    let (chat_tx, chat_rx) = mpsc::unbounded_channel();
    let mut ingestor =
        Ingestor::new(Arc::clone(arena.inboxes()), supervisor.clone(), &config.admin);
    if let Some(speech) = speech {
        ingestor = ingestor.with_speech(speech);
    }
    let _ingestion = spawn_ingestion(chat_rx, ingestor);

    let app_state = AppState::new(arena.view(), broadcaster, supervisor.clone(), chat_tx);
    let app = brawl_api::build_router(app_state);

    let addr = config.bind_addr()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    tokio::select! {
        result = axum::serve(listener, app).into_future() => result?,
        signal = tokio::signal::ctrl_c() => {
            if let Err(err) = signal {
                tracing::error!(error = %err, "could not listen for shutdown signal");
            }
            tracing::info!("Shutdown signal received");
        }
    }

    supervisor.shutdown_and_wait(supervisor_task).await;

    Ok(())
}
