use crate::error::SquadError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] rmp_serde::encode::Error),

    #[error("Deserialization error: {0}")]
    Deserialization(#[from] rmp_serde::decode::Error),

    #[error("Decompression error")]
    Decompression,

    #[error("Corrupted data: {0}")]
    Corrupted(String),

    #[error("Version mismatch: found {found}, expected {expected}")]
    VersionMismatch { found: u32, expected: u32 },

    #[error("Checksum mismatch")]
    ChecksumMismatch,

    #[error("No roster stored for user {user_id}")]
    NotFound { user_id: String },

    #[error("Invalid user id: {user_id:?}")]
    InvalidUser { user_id: String },

    #[error("Roster data too large: {size} players")]
    DataTooLarge { size: usize },
}

impl From<StoreError> for SquadError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { user_id } => {
                SquadError::NotFound(format!("no roster stored for user {user_id}"))
            }
            other => SquadError::Unavailable(other.to_string()),
        }
    }
}
