//! Capabilities the managed platform exposes to a client.

use std::{fmt, pin::Pin, task::Poll};

use async_trait::async_trait;
use futures::{stream::BoxStream, Stream, StreamExt};
use shared::domain::{Coin, CoinId, NewCoin};
use tokio::task::JoinHandle;

use crate::error::CoinError;

/// Which mutation a remote call performs; used for logging and failure reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    FetchAll,
    Create,
    Delete,
    Subscribe,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FetchAll => "fetch_all",
            Self::Create => "create",
            Self::Delete => "delete",
            Self::Subscribe => "subscribe",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[async_trait]
pub trait CoinBackend: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<Coin>, CoinError>;
    async fn create(&self, coin: NewCoin) -> Result<Coin, CoinError>;
    async fn delete(&self, id: CoinId) -> Result<Coin, CoinError>;
    async fn subscribe_created(&self) -> Result<CoinFeed, CoinError>;
    async fn subscribe_deleted(&self) -> Result<CoinFeed, CoinError>;
}

/// One item delivered by a push feed.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedUpdate {
    Coin(Coin),
    /// The consumer fell behind and `skipped` notifications were lost.
    Lagged(u64),
}

/// Long-lived push feed of coins. Ends when the platform closes it.
pub struct CoinFeed {
    inner: BoxStream<'static, FeedUpdate>,
}

impl CoinFeed {
    pub fn new(stream: impl Stream<Item = FeedUpdate> + Send + 'static) -> Self {
        Self {
            inner: stream.boxed(),
        }
    }
}

impl Stream for CoinFeed {
    type Item = FeedUpdate;

    fn poll_next(
        mut self: Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx)
    }
}

/// Termination handle for a feed being consumed in the background.
///
/// Must be kept alive for as long as the consumer wants updates and
/// [`FeedHandle::unsubscribe`] called on teardown.
pub struct FeedHandle {
    name: &'static str,
    task: JoinHandle<()>,
}

impl FeedHandle {
    pub fn spawn<F>(name: &'static str, mut feed: CoinFeed, mut on_update: F) -> Self
    where
        F: FnMut(FeedUpdate) -> futures::future::BoxFuture<'static, ()> + Send + 'static,
    {
        let task = tokio::spawn(async move {
            while let Some(update) = feed.next().await {
                on_update(update).await;
            }
            tracing::debug!(feed = name, "push feed closed by platform");
        });
        Self { name, task }
    }

    pub fn is_active(&self) -> bool {
        !self.task.is_finished()
    }

    pub fn unsubscribe(self) {
        self.task.abort();
        tracing::debug!(feed = self.name, "unsubscribed from push feed");
    }
}

impl fmt::Debug for FeedHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedHandle")
            .field("name", &self.name)
            .field("active", &self.is_active())
            .finish()
    }
}
