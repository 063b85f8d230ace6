use shared::{
    domain::CoinId,
    error::{ApiError, ErrorCode},
};
use thiserror::Error;

use crate::draft::DraftError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoinError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("invalid coin: {0}")]
    Validation(String),
    #[error("coin {0} not found")]
    NotFound(CoinId),
}

impl CoinError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Transport(_) => ErrorCode::Transport,
            Self::Validation(_) => ErrorCode::Validation,
            Self::NotFound(_) => ErrorCode::NotFound,
        }
    }
}

impl From<DraftError> for CoinError {
    fn from(value: DraftError) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<&CoinError> for ApiError {
    fn from(value: &CoinError) -> Self {
        ApiError::new(value.code(), value.to_string())
    }
}
