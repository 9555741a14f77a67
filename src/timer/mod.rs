pub mod display;
pub mod engine;
pub mod shutdown;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::{journal::Journal, utils::clock::DefaultClock};

use display::ConsoleRenderer;
use engine::{TimerConfig, TimerEngine};

/// Starting point for the timer: wires the engine to the console renderer,
/// the system clock and the interrupt watcher, then runs until interrupted.
pub async fn start_timer(config: TimerConfig, journal: Arc<Journal>) {
    let shutdown_token = CancellationToken::new();

    let engine = TimerEngine::new(
        config,
        journal.clone(),
        Box::new(ConsoleRenderer::new()),
        Box::new(DefaultClock),
        shutdown_token.clone(),
    );

    tokio::join!(
        shutdown::watch_shutdown(journal.clone(), shutdown_token),
        engine.run(),
    );

    journal.close();
}
