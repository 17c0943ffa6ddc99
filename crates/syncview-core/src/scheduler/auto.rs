//! Periodic refresh timer coupled to the visibility signal.
//!
//! While the surface is hidden the timer branch is disabled, so no fetches are
//! issued. When it becomes visible again a stale state is refreshed at once and
//! the timer restarts from that point; a state that is still fresh keeps its
//! original schedule (`last_updated + refresh_interval`).

use std::sync::Arc;

use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};

use super::shared::{spawn_fetch, Shared};

async fn next_visibility(rx: &mut Option<watch::Receiver<bool>>) -> Option<bool> {
    match rx {
        Some(rx) => match rx.changed().await {
            Ok(()) => Some(*rx.borrow_and_update()),
            Err(_) => None,
        },
        None => std::future::pending().await,
    }
}

pub(super) async fn auto_refresh_loop<T: Send + Sync + 'static>(
    shared: Arc<Shared<T>>,
    mut visibility: Option<watch::Receiver<bool>>,
) {
    let period = shared.options.refresh_interval;
    if period.is_zero() {
        tracing::warn!("refresh interval is zero, auto-refresh disabled");
        return;
    }
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut visible = visibility
        .as_mut()
        .map(|rx| *rx.borrow_and_update())
        .unwrap_or(true);
    tracing::debug!(?period, visible, "auto-refresh started");

    while shared.is_alive() {
        tokio::select! {
            _ = ticker.tick(), if visible => {
                tracing::debug!("auto-refresh tick");
                spawn_fetch(&shared);
            }
            next = next_visibility(&mut visibility) => match next {
                Some(true) if !visible => {
                    visible = true;
                    if shared.is_stale() {
                        tracing::debug!("surface visible and state stale, refreshing now");
                        spawn_fetch(&shared);
                        ticker.reset();
                    } else {
                        match shared.last_updated() {
                            Some(at) => ticker.reset_at(at + period),
                            None => ticker.reset(),
                        }
                    }
                }
                Some(false) if visible => {
                    visible = false;
                    tracing::debug!("surface hidden, auto-refresh suspended");
                }
                Some(_) => {}
                None => {
                    // Signal owner went away: behave as permanently visible.
                    visibility = None;
                    if !visible {
                        visible = true;
                        ticker.reset();
                    }
                }
            }
        }
    }
    tracing::debug!("auto-refresh stopped");
}
