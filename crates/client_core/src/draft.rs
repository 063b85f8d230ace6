//! Form draft for a coin that has not been submitted yet.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use shared::domain::{ClientId, NewCoin};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftField {
    Name,
    Symbol,
    Price,
}

impl DraftField {
    pub const ALL: [DraftField; 3] = [DraftField::Name, DraftField::Symbol, DraftField::Price];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Symbol => "symbol",
            Self::Price => "price",
        }
    }
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown draft field '{0}'")]
pub struct UnknownDraftField(pub String);

impl FromStr for DraftField {
    type Err = UnknownDraftField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(Self::Name),
            "symbol" => Ok(Self::Symbol),
            "price" => Ok(Self::Price),
            _ => Err(UnknownDraftField(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("{0} is required")]
    MissingField(DraftField),
    #[error("price '{0}' is not a valid decimal number")]
    InvalidPrice(String),
}

/// Raw text of the create-coin form, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinDraft {
    pub name: String,
    pub symbol: String,
    pub price: String,
}

impl CoinDraft {
    pub fn get(&self, field: DraftField) -> &str {
        match field {
            DraftField::Name => &self.name,
            DraftField::Symbol => &self.symbol,
            DraftField::Price => &self.price,
        }
    }

    pub fn set(&mut self, field: DraftField, value: impl Into<String>) {
        let value = value.into();
        match field {
            DraftField::Name => self.name = value,
            DraftField::Symbol => self.symbol = value,
            DraftField::Price => self.price = value,
        }
    }

    pub fn is_empty(&self) -> bool {
        DraftField::ALL
            .iter()
            .all(|field| self.get(*field).is_empty())
    }

    /// Checks every field and builds the create request for `client_id`.
    pub fn validate(&self, client_id: ClientId) -> Result<NewCoin, DraftError> {
        for field in DraftField::ALL {
            if self.get(field).trim().is_empty() {
                return Err(DraftError::MissingField(field));
            }
        }

        let raw_price = self.price.trim();
        let price = raw_price
            .parse::<f64>()
            .ok()
            .filter(|price| price.is_finite())
            .ok_or_else(|| DraftError::InvalidPrice(raw_price.to_string()))?;

        Ok(NewCoin {
            name: self.name.trim().to_string(),
            symbol: self.symbol.trim().to_string(),
            price,
            client_id,
        })
    }
}
