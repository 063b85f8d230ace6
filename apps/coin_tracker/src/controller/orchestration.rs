//! Executes UI commands against the local tracker and the simulated peer.

use std::sync::Arc;

use client_core::{CoinError, CoinTracker, DraftField, InMemoryPlatform};
use shared::domain::{ClientId, NewCoin};

use crate::config::SeedCoin;
use crate::controller::commands::{UiCommand, HELP};

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Continue { status: Option<String> },
    ShowJson,
    Quit,
}

impl Outcome {
    fn status(message: impl Into<String>) -> Self {
        Self::Continue {
            status: Some(message.into()),
        }
    }

    fn silent() -> Self {
        Self::Continue { status: None }
    }
}

/// One terminal session: this client's tracker plus a second client sharing
/// the same platform, so remote pushes can be exercised by hand.
pub struct Session {
    pub tracker: CoinTracker,
    peer: CoinTracker,
    peer_name: String,
}

pub fn seed_platform(feed_capacity: usize, seed: &[SeedCoin]) -> InMemoryPlatform {
    let seed_client = ClientId::random();
    InMemoryPlatform::new(feed_capacity).with_seed(seed.iter().map(|coin| NewCoin {
        name: coin.name.clone(),
        symbol: coin.symbol.clone(),
        price: coin.price,
        client_id: seed_client,
    }))
}

impl Session {
    pub fn new(platform: Arc<InMemoryPlatform>, peer_name: impl Into<String>) -> Self {
        Self {
            tracker: CoinTracker::new(platform.clone()),
            peer: CoinTracker::new(platform),
            peer_name: peer_name.into(),
        }
    }

    /// Push subscription, then the initial load, so nothing created in
    /// between is missed. Failures are logged by the tracker and leave the
    /// view in its loading state.
    pub async fn start(&self) -> Option<String> {
        let mut problems = Vec::new();
        if let Err(err) = self.tracker.subscribe().await {
            problems.push(format!("live updates unavailable: {err}"));
        }
        if let Err(err) = self.tracker.load().await {
            problems.push(format!("initial load failed: {err}"));
        }
        (!problems.is_empty()).then(|| problems.join("; "))
    }

    pub async fn shutdown(&self) {
        self.tracker.unsubscribe().await;
    }

    pub async fn execute(&self, command: UiCommand) -> Outcome {
        match command {
            UiCommand::SetField { field, value } => {
                self.tracker.set_draft_field(field, value).await;
                Outcome::silent()
            }
            UiCommand::ClearDraft => {
                self.tracker.clear_draft().await;
                Outcome::silent()
            }
            UiCommand::Submit => match self.tracker.submit().await {
                Ok(coin) => Outcome::status(format!("created #{} {}", coin.id, coin.name)),
                Err(err) => Outcome::status(failure("create", &err)),
            },
            UiCommand::Delete(id) => match self.tracker.delete(id).await {
                Ok(()) => Outcome::status(format!("deleted #{id}")),
                Err(err) => Outcome::status(failure("delete", &err)),
            },
            UiCommand::Reload => match self.tracker.load().await {
                Ok(view) => Outcome::status(format!("reloaded {} coins", view.coins.len())),
                Err(err) => Outcome::status(failure("reload", &err)),
            },
            UiCommand::PeerAdd {
                name,
                symbol,
                price,
            } => {
                self.peer.clear_draft().await;
                self.peer.set_draft_field(DraftField::Name, name).await;
                self.peer.set_draft_field(DraftField::Symbol, symbol).await;
                self.peer.set_draft_field(DraftField::Price, price).await;
                match self.peer.submit().await {
                    Ok(coin) => Outcome::status(format!(
                        "{} created #{} {}",
                        self.peer_name, coin.id, coin.name
                    )),
                    Err(err) => Outcome::status(failure(&self.peer_name, &err)),
                }
            }
            UiCommand::PeerDelete(id) => match self.peer.delete(id).await {
                Ok(()) => Outcome::status(format!("{} deleted #{id}", self.peer_name)),
                Err(err) => Outcome::status(failure(&self.peer_name, &err)),
            },
            UiCommand::List => Outcome::silent(),
            UiCommand::Json => Outcome::ShowJson,
            UiCommand::Help => Outcome::status(HELP),
            UiCommand::Quit => Outcome::Quit,
        }
    }
}

fn failure(action: &str, err: &CoinError) -> String {
    match err {
        CoinError::Transport(_) => format!("{action} failed, backend unreachable: {err}"),
        CoinError::Validation(_) => format!("{action} rejected: {err}"),
        CoinError::NotFound(_) => format!("{action} failed: {err}"),
    }
}
