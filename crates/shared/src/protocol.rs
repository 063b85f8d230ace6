use serde::{Deserialize, Serialize};

use crate::domain::Coin;

/// Kind of mutation a push feed reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedKind {
    Created,
    Deleted,
}

/// Push notification fanned out to every connected client, including the one
/// that performed the mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum CoinFeedEvent {
    CoinCreated { coin: Coin },
    CoinDeleted { coin: Coin },
}

impl CoinFeedEvent {
    pub fn kind(&self) -> FeedKind {
        match self {
            Self::CoinCreated { .. } => FeedKind::Created,
            Self::CoinDeleted { .. } => FeedKind::Deleted,
        }
    }

    pub fn into_coin(self) -> Coin {
        match self {
            Self::CoinCreated { coin } | Self::CoinDeleted { coin } => coin,
        }
    }
}
