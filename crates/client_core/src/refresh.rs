use std::time::Duration;

use shared::domain::Gift;
use thiserror::Error;
use tokio::{
    sync::broadcast,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tracing::{debug, warn};

use crate::gateway::ContributionGateway;

#[derive(Debug, Clone, PartialEq)]
pub enum GiftListUpdate {
    Refreshed(Vec<Gift>),
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("gift list refresh interval must be non-zero")]
pub struct ZeroRefreshInterval;

/// Polls the gift list every `interval` and broadcasts each result. The task ends once
/// no receiver is left.
pub fn spawn_gift_refresh<G>(
    gateway: G,
    interval: Duration,
    updates: broadcast::Sender<GiftListUpdate>,
) -> Result<JoinHandle<()>, ZeroRefreshInterval>
where
    G: ContributionGateway + 'static,
{
    if interval.is_zero() {
        return Err(ZeroRefreshInterval);
    }

    Ok(tokio::spawn(async move {
        let mut ticker = time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let update = match gateway.list_gifts().await {
                Ok(gifts) => {
                    debug!(count = gifts.len(), "gift list refreshed");
                    GiftListUpdate::Refreshed(gifts)
                }
                Err(err) => {
                    warn!(error = %err, "gift list refresh failed");
                    GiftListUpdate::Failed(err.to_string())
                }
            };

            if updates.send(update).is_err() {
                debug!("no gift list subscribers left; stopping refresh");
                break;
            }
        }
    }))
}
