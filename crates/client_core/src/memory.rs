//! In-process stand-in for the managed platform.
//!
//! Keeps the catalog in memory, assigns identifiers and fans every create and
//! delete out to all open feeds, the originating client's included.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use futures::StreamExt;
use shared::{
    domain::{Coin, CoinId, NewCoin},
    protocol::{CoinFeedEvent, FeedKind},
};
use tokio::sync::broadcast;
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};
use tracing::{info, warn};

use crate::{
    backend::{CoinBackend, CoinFeed, FeedUpdate, Operation},
    error::CoinError,
};

pub const DEFAULT_FEED_CAPACITY: usize = 256;

struct PlatformState {
    next_id: i64,
    coins: Vec<Coin>,
    offline: bool,
    injected_failures: HashMap<Operation, CoinError>,
}

pub struct InMemoryPlatform {
    state: Mutex<PlatformState>,
    events: broadcast::Sender<CoinFeedEvent>,
}

impl Default for InMemoryPlatform {
    fn default() -> Self {
        Self::new(DEFAULT_FEED_CAPACITY)
    }
}

impl InMemoryPlatform {
    pub fn new(feed_capacity: usize) -> Self {
        let (events, _) = broadcast::channel(feed_capacity.max(1));
        Self {
            state: Mutex::new(PlatformState {
                next_id: 1,
                coins: Vec::new(),
                offline: false,
                injected_failures: HashMap::new(),
            }),
            events,
        }
    }

    /// Seeds the catalog without notifying feeds.
    pub fn with_seed(self, seed: impl IntoIterator<Item = NewCoin>) -> Self {
        {
            let mut state = self.lock();
            for coin in seed {
                let id = CoinId(state.next_id);
                state.next_id += 1;
                state.coins.push(coin.into_coin(id));
            }
        }
        self
    }

    /// While offline every call fails with a transport error.
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
        info!(offline, "in-memory platform connectivity changed");
    }

    /// Makes the next call of `operation` fail with `error`, once.
    pub fn fail_next(&self, operation: Operation, error: CoinError) {
        self.lock().injected_failures.insert(operation, error);
    }

    pub fn coins(&self) -> Vec<Coin> {
        self.lock().coins.clone()
    }

    pub fn feed_subscribers(&self) -> usize {
        self.events.receiver_count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, PlatformState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check_available(
        state: &mut PlatformState,
        operation: Operation,
    ) -> Result<(), CoinError> {
        if state.offline {
            return Err(CoinError::Transport("platform unreachable".into()));
        }
        match state.injected_failures.remove(&operation) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn publish(&self, event: CoinFeedEvent) {
        // No receivers is fine; nobody is listening yet.
        let _ = self.events.send(event);
    }

    fn feed(&self, kind: FeedKind) -> CoinFeed {
        let stream = BroadcastStream::new(self.events.subscribe()).filter_map(move |item| {
            let update = match item {
                Ok(event) if event.kind() == kind => Some(FeedUpdate::Coin(event.into_coin())),
                Ok(_) => None,
                Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                    warn!(?kind, skipped, "push feed lagged; notifications dropped");
                    Some(FeedUpdate::Lagged(skipped))
                }
            };
            futures::future::ready(update)
        });
        CoinFeed::new(stream)
    }
}

fn validate(coin: &NewCoin) -> Result<(), CoinError> {
    if coin.name.trim().is_empty() {
        return Err(CoinError::Validation("name is required".into()));
    }
    if coin.symbol.trim().is_empty() {
        return Err(CoinError::Validation("symbol is required".into()));
    }
    if !coin.price.is_finite() {
        return Err(CoinError::Validation(format!(
            "price {} is not a finite number",
            coin.price
        )));
    }
    Ok(())
}

#[async_trait]
impl CoinBackend for InMemoryPlatform {
    async fn fetch_all(&self) -> Result<Vec<Coin>, CoinError> {
        let mut state = self.lock();
        Self::check_available(&mut state, Operation::FetchAll)?;
        Ok(state.coins.clone())
    }

    async fn create(&self, coin: NewCoin) -> Result<Coin, CoinError> {
        let created = {
            let mut state = self.lock();
            Self::check_available(&mut state, Operation::Create)?;
            validate(&coin)?;
            let id = CoinId(state.next_id);
            state.next_id += 1;
            let created = coin.into_coin(id);
            state.coins.push(created.clone());
            created
        };
        self.publish(CoinFeedEvent::CoinCreated {
            coin: created.clone(),
        });
        Ok(created)
    }

    async fn delete(&self, id: CoinId) -> Result<Coin, CoinError> {
        let removed = {
            let mut state = self.lock();
            Self::check_available(&mut state, Operation::Delete)?;
            let position = state
                .coins
                .iter()
                .position(|coin| coin.id == id)
                .ok_or(CoinError::NotFound(id))?;
            state.coins.remove(position)
        };
        self.publish(CoinFeedEvent::CoinDeleted {
            coin: removed.clone(),
        });
        Ok(removed)
    }

    async fn subscribe_created(&self) -> Result<CoinFeed, CoinError> {
        Self::check_available(&mut self.lock(), Operation::Subscribe)?;
        Ok(self.feed(FeedKind::Created))
    }

    async fn subscribe_deleted(&self) -> Result<CoinFeed, CoinError> {
        Self::check_available(&mut self.lock(), Operation::Subscribe)?;
        Ok(self.feed(FeedKind::Deleted))
    }
}
