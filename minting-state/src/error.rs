use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum StateError {
    #[error("minting plugin storage is corrupt: {0}")]
    Corrupt(String),

    #[error("minting plugin bucket header has an unsupported version: {0}")]
    BadVersion(String),

    #[error("genesis mint condition mismatch: store has a different condition than the one supplied")]
    GenesisMismatch,

    #[error("minting plugin bucket is empty")]
    Empty,

    #[error("io error: {0}")]
    Io(#[from] sled::Error),

    #[error("codec error: {0}")]
    Decode(#[from] chain_core::DecodeError),

    #[error("codec error: {0}")]
    Encode(#[from] chain_core::EncodeError),
}
