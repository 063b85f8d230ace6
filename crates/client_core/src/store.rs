//! Reconciling state store: the single place the coin view is mutated.
//!
//! Three sources feed it: the initial full load, locally confirmed mutations
//! and push notifications from the platform. Every coin is keyed by its
//! platform identifier, so repeated, reordered or self-echoed pushes converge
//! on the same view. Removed identifiers are remembered, so a pushed create
//! that is delivered after its own delete cannot bring the coin back.

use std::collections::BTreeSet;

use serde::Serialize;
use shared::domain::{ClientId, Coin, CoinId};
use tracing::debug;

use crate::draft::{CoinDraft, DraftField};

/// Everything the rendering layer reads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoinView {
    pub draft: CoinDraft,
    pub coins: Vec<Coin>,
    pub loading: bool,
    /// Identifiers removed from the collection. Platform ids are never reused.
    #[serde(skip)]
    removed: BTreeSet<CoinId>,
}

impl Default for CoinView {
    fn default() -> Self {
        Self {
            draft: CoinDraft::default(),
            coins: Vec::new(),
            loading: true,
            removed: BTreeSet::new(),
        }
    }
}

impl CoinView {
    pub fn contains(&self, id: CoinId) -> bool {
        self.coins.iter().any(|coin| coin.id == id)
    }

    pub fn coin(&self, id: CoinId) -> Option<&Coin> {
        self.coins.iter().find(|coin| coin.id == id)
    }

    pub fn was_removed(&self, id: CoinId) -> bool {
        self.removed.contains(&id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    FullLoadCompleted(Vec<Coin>),
    DraftFieldChanged { field: DraftField, value: String },
    DraftCleared,
    LocalCoinConfirmed(Coin),
    RemoteCoinObserved(Coin),
    CoinRemoved(CoinId),
}

impl StoreEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::FullLoadCompleted(_) => "full_load_completed",
            Self::DraftFieldChanged { .. } => "draft_field_changed",
            Self::DraftCleared => "draft_cleared",
            Self::LocalCoinConfirmed(_) => "local_coin_confirmed",
            Self::RemoteCoinObserved(_) => "remote_coin_observed",
            Self::CoinRemoved(_) => "coin_removed",
        }
    }
}

/// Pure transition function. Never fails and performs no I/O.
pub fn reduce(state: &CoinView, event: StoreEvent) -> CoinView {
    let mut next = state.clone();
    match event {
        StoreEvent::FullLoadCompleted(coins) => {
            next.coins = Vec::with_capacity(coins.len());
            for coin in coins {
                if !next.removed.contains(&coin.id) {
                    append_unique(&mut next.coins, coin);
                }
            }
            next.loading = false;
        }
        StoreEvent::DraftFieldChanged { field, value } => next.draft.set(field, value),
        StoreEvent::DraftCleared => next.draft = CoinDraft::default(),
        // The push echo of a local create can land before the create's own
        // response, so confirmation is keyed by id as well.
        StoreEvent::LocalCoinConfirmed(coin) | StoreEvent::RemoteCoinObserved(coin) => {
            if !next.removed.contains(&coin.id) {
                append_unique(&mut next.coins, coin);
            }
        }
        StoreEvent::CoinRemoved(id) => {
            next.coins.retain(|coin| coin.id != id);
            next.removed.insert(id);
        }
    }
    next
}

fn append_unique(coins: &mut Vec<Coin>, coin: Coin) {
    if !coins.iter().any(|existing| existing.id == coin.id) {
        coins.push(coin);
    }
}

/// Owns the current view and the identity of this client instance.
#[derive(Debug, Clone)]
pub struct CoinStore {
    client_id: ClientId,
    view: CoinView,
}

impl CoinStore {
    pub fn new(client_id: ClientId) -> Self {
        Self {
            client_id,
            view: CoinView::default(),
        }
    }

    pub fn client_id(&self) -> ClientId {
        self.client_id
    }

    pub fn view(&self) -> &CoinView {
        &self.view
    }

    pub fn apply(&mut self, event: StoreEvent) -> &CoinView {
        if let StoreEvent::RemoteCoinObserved(coin) = &event {
            if self.view.was_removed(coin.id) {
                debug!(coin_id = coin.id.0, "dropping push for an already removed coin");
            } else if self.view.contains(coin.id) {
                let self_echo = coin.client_id == self.client_id;
                debug!(coin_id = coin.id.0, self_echo, "dropping already-known pushed coin");
            }
        }
        self.view = reduce(&self.view, event);
        &self.view
    }

    pub fn apply_all(&mut self, events: impl IntoIterator<Item = StoreEvent>) -> &CoinView {
        for event in events {
            self.apply(event);
        }
        &self.view
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
