use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(CoinId);

/// Random token identifying one running client instance.
///
/// Generated once when a tracker starts and stamped on every coin it creates,
/// so push notifications can be attributed to their originating client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientId(pub Uuid);

impl ClientId {
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A coin confirmed by the platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coin {
    pub id: CoinId,
    pub name: String,
    pub symbol: String,
    pub price: f64,
    pub client_id: ClientId,
}

/// A coin the platform has not assigned an identifier to yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCoin {
    pub name: String,
    pub symbol: String,
    pub price: f64,
    pub client_id: ClientId,
}

impl NewCoin {
    pub fn into_coin(self, id: CoinId) -> Coin {
        Coin {
            id,
            name: self.name,
            symbol: self.symbol,
            price: self.price,
            client_id: self.client_id,
        }
    }
}
