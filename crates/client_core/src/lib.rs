use std::sync::Arc;

use futures::{future::BoxFuture, FutureExt};
use shared::{
    domain::{ClientId, Coin, CoinId},
    error::ApiError,
};
use tokio::sync::{broadcast, watch, Mutex};
use tracing::{debug, info, warn};

pub mod backend;
pub mod draft;
pub mod error;
pub mod memory;
pub mod store;

pub use backend::{CoinBackend, CoinFeed, FeedHandle, FeedUpdate, Operation};
pub use draft::{CoinDraft, DraftError, DraftField};
pub use error::CoinError;
pub use memory::InMemoryPlatform;
pub use store::{reduce, CoinStore, CoinView, StoreEvent};

const TRACKER_EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub enum TrackerEvent {
    ViewChanged(CoinView),
    OperationFailed {
        operation: Operation,
        error: ApiError,
    },
}

/// Serializes every store mutation and publishes the resulting view.
struct StoreCell {
    store: Mutex<CoinStore>,
    views: watch::Sender<CoinView>,
    events: broadcast::Sender<TrackerEvent>,
}

impl StoreCell {
    async fn dispatch(&self, event: StoreEvent) -> CoinView {
        let mut store = self.store.lock().await;
        self.commit(&mut store, event)
    }

    /// Must be called with the store lock held so observers never see views
    /// out of order.
    fn commit(&self, store: &mut CoinStore, event: StoreEvent) -> CoinView {
        let event_name = event.name();
        let view = store.apply(event).clone();
        self.views.send_replace(view.clone());
        let _ = self.events.send(TrackerEvent::ViewChanged(view.clone()));

        debug!(
            event = event_name,
            coins = view.coins.len(),
            loading = view.loading,
            "applied store event"
        );
        view
    }

    /// Fetches the full catalog and replaces the collection with it.
    ///
    /// The store stays locked while the fetch is in flight. Pushes received
    /// meanwhile queue behind it and are applied on top of the snapshot
    /// instead of being overwritten by it.
    async fn full_load(&self, backend: &dyn CoinBackend) -> Result<CoinView, CoinError> {
        let mut store = self.store.lock().await;
        let coins = backend
            .fetch_all()
            .await
            .map_err(|err| self.report(Operation::FetchAll, err))?;
        info!(count = coins.len(), "loaded coin catalog");
        Ok(self.commit(&mut store, StoreEvent::FullLoadCompleted(coins)))
    }

    fn report(&self, operation: Operation, error: CoinError) -> CoinError {
        match &error {
            CoinError::Validation(message) => {
                info!(%operation, %message, "coin rejected; view unchanged")
            }
            _ => warn!(%operation, %error, "remote call failed; keeping last known view"),
        }
        let _ = self.events.send(TrackerEvent::OperationFailed {
            operation,
            error: ApiError::from(&error),
        });
        error
    }
}

/// Builds the callback a feed task runs for every update. Coins become store
/// events; a lag means notifications were lost, so the view is reloaded.
fn forward_feed(
    cell: Arc<StoreCell>,
    backend: Arc<dyn CoinBackend>,
    feed: &'static str,
    to_event: fn(Coin) -> StoreEvent,
) -> impl FnMut(FeedUpdate) -> BoxFuture<'static, ()> + Send + 'static {
    move |update| {
        let cell = Arc::clone(&cell);
        let backend = Arc::clone(&backend);
        async move {
            match update {
                FeedUpdate::Coin(coin) => {
                    cell.dispatch(to_event(coin)).await;
                }
                FeedUpdate::Lagged(skipped) => {
                    warn!(feed, skipped, "push feed lagged; reloading the full catalog");
                    // full_load reports its own failure.
                    let _ = cell.full_load(backend.as_ref()).await;
                }
            }
        }
        .boxed()
    }
}

/// Client-side coin tracker: forwards user intents to the platform and folds
/// results and push notifications into the reconciling store.
pub struct CoinTracker {
    backend: Arc<dyn CoinBackend>,
    client_id: ClientId,
    cell: Arc<StoreCell>,
    feeds: Mutex<Vec<FeedHandle>>,
}

impl CoinTracker {
    pub fn new(backend: Arc<dyn CoinBackend>) -> Self {
        Self::with_client_id(backend, ClientId::random())
    }

    pub fn with_client_id(backend: Arc<dyn CoinBackend>, client_id: ClientId) -> Self {
        let store = CoinStore::new(client_id);
        let (views, _) = watch::channel(store.view().clone());
        let (events, _) = broadcast::channel(TRACKER_EVENT_CAPACITY);
        Self {
            backend,
            client_id,
            cell: Arc::new(StoreCell {
                store: Mutex::new(store),
                views,
                events,
            }),
            feeds: Mutex::new(Vec::new()),
        }
    }

    pub fn client_id(&self) -> ClientId {
        self.client_id
    }

    pub fn view(&self) -> CoinView {
        self.cell.views.borrow().clone()
    }

    pub fn watch_view(&self) -> watch::Receiver<CoinView> {
        self.cell.views.subscribe()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<TrackerEvent> {
        self.cell.events.subscribe()
    }

    pub async fn dispatch(&self, event: StoreEvent) -> CoinView {
        self.cell.dispatch(event).await
    }

    /// Replaces the collection with the platform's full catalog.
    ///
    /// Safe to call after [`CoinTracker::subscribe`]: pushes that arrive
    /// during the fetch are applied after the snapshot, never lost to it.
    pub async fn load(&self) -> Result<CoinView, CoinError> {
        self.cell.full_load(self.backend.as_ref()).await
    }

    pub async fn set_draft_field(&self, field: DraftField, value: impl Into<String>) -> CoinView {
        self.dispatch(StoreEvent::DraftFieldChanged {
            field,
            value: value.into(),
        })
        .await
    }

    pub async fn clear_draft(&self) -> CoinView {
        self.dispatch(StoreEvent::DraftCleared).await
    }

    /// Validates the draft and creates the coin it describes.
    ///
    /// An invalid draft never reaches the platform. On any failure the draft
    /// is left filled in so the user can correct it and retry.
    pub async fn submit(&self) -> Result<Coin, CoinError> {
        let draft = self.view().draft;
        let new_coin = draft
            .validate(self.client_id)
            .map_err(|err| self.report(Operation::Create, err.into()))?;

        let coin = self
            .backend
            .create(new_coin)
            .await
            .map_err(|err| self.report(Operation::Create, err))?;
        info!(coin_id = coin.id.0, symbol = %coin.symbol, "coin created");

        self.dispatch(StoreEvent::LocalCoinConfirmed(coin.clone()))
            .await;
        self.dispatch(StoreEvent::DraftCleared).await;
        Ok(coin)
    }

    pub async fn delete(&self, id: CoinId) -> Result<(), CoinError> {
        self.backend
            .delete(id)
            .await
            .map_err(|err| self.report(Operation::Delete, err))?;
        info!(coin_id = id.0, "coin deleted");
        self.dispatch(StoreEvent::CoinRemoved(id)).await;
        Ok(())
    }

    /// Opens the created/deleted push feeds and folds them into the store.
    ///
    /// A no-op while feeds from an earlier call are still running. A feed
    /// that lags triggers a full reload.
    pub async fn subscribe(&self) -> Result<(), CoinError> {
        let mut feeds = self.feeds.lock().await;
        if feeds.iter().any(FeedHandle::is_active) {
            return Ok(());
        }
        for stale in feeds.drain(..) {
            stale.unsubscribe();
        }

        let created = self
            .backend
            .subscribe_created()
            .await
            .map_err(|err| self.report(Operation::Subscribe, err))?;
        let deleted = self
            .backend
            .subscribe_deleted()
            .await
            .map_err(|err| self.report(Operation::Subscribe, err))?;

        feeds.push(FeedHandle::spawn(
            "coin_created",
            created,
            forward_feed(
                Arc::clone(&self.cell),
                Arc::clone(&self.backend),
                "coin_created",
                StoreEvent::RemoteCoinObserved,
            ),
        ));
        feeds.push(FeedHandle::spawn(
            "coin_deleted",
            deleted,
            forward_feed(
                Arc::clone(&self.cell),
                Arc::clone(&self.backend),
                "coin_deleted",
                |coin| StoreEvent::CoinRemoved(coin.id),
            ),
        ));

        info!(client_id = %self.client_id, "subscribed to coin push feeds");
        Ok(())
    }

    /// Tears down every push feed. Returns how many were cancelled.
    pub async fn unsubscribe(&self) -> usize {
        let mut feeds = self.feeds.lock().await;
        let count = feeds.len();
        for feed in feeds.drain(..) {
            feed.unsubscribe();
        }
        if count > 0 {
            info!(client_id = %self.client_id, feeds = count, "unsubscribed from coin push feeds");
        }
        count
    }

    pub async fn is_subscribed(&self) -> bool {
        self.feeds.lock().await.iter().any(FeedHandle::is_active)
    }

    fn report(&self, operation: Operation, error: CoinError) -> CoinError {
        self.cell.report(operation, error)
    }
}

impl Drop for CoinTracker {
    fn drop(&mut self) {
        for feed in self.feeds.get_mut().drain(..) {
            feed.unsubscribe();
        }
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
