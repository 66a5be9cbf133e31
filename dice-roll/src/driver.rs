//! Timer-driven loop over the tick schedule: roll on early ticks, shut the
//! telemetry pipelines down mid-cycle, bring them back up at the end of the
//! cycle, repeat until the process is told to stop.

use common_telemetry::initialize;
use tracing::{info, warn};

use crate::config::Config;
use crate::roll::Roller;

/// What a given tick count asks the loop to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickAction {
    /// Record one roll through all three pipelines.
    Record,
    /// Shut the current telemetry generation down.
    Shutdown,
    /// Initialize a fresh generation and re-bind the recording handles.
    Restart,
    /// Nothing; the pipelines stay down between shutdown and restart.
    Idle,
}

/// Scripted schedule over the per-cycle tick count.
pub fn action_for(count: u64) -> TickAction {
    match count {
        0 | 1 => TickAction::Record,
        2 => TickAction::Shutdown,
        20 => TickAction::Restart,
        _ => TickAction::Idle,
    }
}

/// Advance the per-cycle tick count; a restart starts the next cycle at 0.
pub fn next_count(count: u64, action: TickAction) -> u64 {
    match action {
        TickAction::Restart => 0,
        _ => count + 1,
    }
}

/// Run the dice-roll loop until SIGINT/SIGTERM, then shut telemetry down.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let telemetry_config = config.telemetry_config();
    let mut telemetry = initialize(&telemetry_config)?;
    let mut roller = Roller::bind(&telemetry)?;

    let mut ticker = tokio::time::interval(config.tick_interval());
    let shutdown_signal = wait_for_shutdown_signal();
    tokio::pin!(shutdown_signal);

    let mut count: u64 = 0;
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let action = action_for(count);
                match action {
                    TickAction::Record => {
                        roller.roll();
                        info!(count, "rolled the dice");
                    }
                    TickAction::Shutdown => {
                        info!(count, "shutting telemetry down mid-cycle");
                        if let Err(e) = telemetry.shutdown(config.shutdown_timeout()).await {
                            warn!(error = %e, "telemetry shutdown reported failures");
                        }
                    }
                    TickAction::Restart => {
                        info!(count, "restarting telemetry pipelines");
                        telemetry = initialize(&telemetry_config)?;
                        roller = Roller::bind(&telemetry)?;
                    }
                    TickAction::Idle => {}
                }
                count = next_count(count, action);
            }
            () = &mut shutdown_signal => {
                info!("shutdown signal received, stopping");
                if let Err(e) = telemetry.shutdown(config.shutdown_timeout()).await {
                    warn!(error = %e, "telemetry shutdown reported failures");
                }
                return Ok(());
            }
        }
    }
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut term = match signal(SignalKind::terminate()) {
        Ok(term) => term,
        Err(e) => {
            warn!(error = %e, "failed to install SIGTERM handler, falling back to ctrl-c only");
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for ctrl-c");
            }
            return;
        }
    };

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                warn!(error = %e, "failed to listen for ctrl-c");
            }
        }
        _ = term.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_matches_scripted_cycle() {
        let mut count = 0;
        let mut records = 0;
        let mut shutdowns = 0;
        let mut restarts = 0;
        for _ in 0..21 {
            let action = action_for(count);
            match action {
                TickAction::Record => records += 1,
                TickAction::Shutdown => shutdowns += 1,
                TickAction::Restart => restarts += 1,
                TickAction::Idle => {}
            }
            count = next_count(count, action);
        }
        assert_eq!(records, 2);
        assert_eq!(shutdowns, 1);
        assert_eq!(restarts, 1);
        assert_eq!(count, 0, "restart starts the next cycle from zero");
    }

    #[test]
    fn pipelines_stay_down_between_shutdown_and_restart() {
        for count in 3..20 {
            assert_eq!(action_for(count), TickAction::Idle, "count {count}");
        }
    }

    #[test]
    fn second_cycle_repeats_the_first() {
        let mut count = 0;
        let mut actions = Vec::new();
        for _ in 0..42 {
            let action = action_for(count);
            actions.push(action);
            count = next_count(count, action);
        }
        assert_eq!(&actions[..21], &actions[21..]);
    }
}
