//! Periodic tick loop.
//!
//! Runs on a current-thread tokio runtime. Each interval the engine is
//! advanced to the wall clock and the colony saved. Missed intervals are
//! delayed rather than bursted since a single tick already catches up the
//! whole gap.

use std::time::Duration;

use colony_core::simulation::{ColonyEngine, TickEvents};
use colony_core::store::ColonyStore;
use tokio::time::MissedTickBehavior;

use crate::error::Result;

/// How the loop runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerOptions {
    /// Time between ticks.
    pub interval: Duration,
    /// Stop after this many ticks; run until Ctrl-C when `None`.
    pub max_ticks: Option<u64>,
}

impl SchedulerOptions {
    /// Tick every `interval_ms` until interrupted.
    #[must_use]
    pub const fn every_ms(interval_ms: u64) -> Self {
        Self {
            interval: Duration::from_millis(interval_ms),
            max_ticks: None,
        }
    }

    /// Stop after `ticks` ticks.
    #[must_use]
    pub const fn with_max_ticks(mut self, ticks: u64) -> Self {
        self.max_ticks = Some(ticks);
        self
    }
}

/// Tick `engine` on a timer until Ctrl-C or `max_ticks`, saving after
/// every tick.
///
/// # Arguments
///
/// * `engine` - The colony engine to drive
/// * `store` - Where the colony is saved after each tick
/// * `clock` - Source of the current Unix time in milliseconds
/// * `options` - Interval and optional tick limit
///
/// # Returns
///
/// The number of ticks run.
pub async fn run_scheduler<S, C>(
    engine: &mut ColonyEngine,
    store: &mut S,
    mut clock: C,
    options: SchedulerOptions,
) -> Result<u64>
where
    S: ColonyStore,
    C: FnMut() -> u64,
{
    let mut interval = tokio::time::interval(options.interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    tracing::info!(
        colony = %engine.colony().id,
        interval_ms = u64::try_from(options.interval.as_millis()).unwrap_or(u64::MAX),
        "scheduler started"
    );

    let mut ticks = 0u64;
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!(ticks, "shutdown requested");
                break;
            }
            _ = interval.tick() => {
                let events = engine.tick(clock());
                log_events(&events);
                let colony = engine.colony();
                store.save(&colony.id, colony)?;
                ticks += 1;
                if options.max_ticks.is_some_and(|max| ticks >= max) {
                    break;
                }
            }
        }
    }

    tracing::info!(ticks, "scheduler stopped");
    Ok(ticks)
}

/// Log what a tick changed.
pub fn log_events(events: &TickEvents) {
    for item in &events.completed {
        tracing::info!(id = item.id, target = %item.target, level_or_amount = item.level_or_amount, "completed");
    }
    for arrival in &events.arrivals {
        tracing::info!(?arrival, "fleet arrived");
    }
    if !events.expired.is_empty() {
        tracing::debug!(count = events.expired.len(), "visibility expired");
    }
    if !events.has_activity() {
        tracing::trace!(now = events.now, elapsed_ms = events.elapsed_ms, "quiet tick");
    }
}
