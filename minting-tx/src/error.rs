use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum TxError {
    #[error("transaction does not fit within the block size limit")]
    TooLarge,

    #[error("mint fulfillment does not satisfy the active mint condition: {0}")]
    ConditionUnfulfilled(String),

    #[error("nonce must be non-zero")]
    NilNonce,

    #[error("arbitrary data exceeds the configured limit")]
    ArbitraryDataTooLarge,

    #[error("miner fee below the configured minimum")]
    FeeTooSmall,

    #[error("output value must be greater than zero")]
    ZeroOutput,

    #[error("output condition is not standard: {0}")]
    NonStandardCondition(String),

    #[error("transaction carries coin or block-stake inputs/outputs it is not allowed to carry")]
    UnexpectedInputsOrOutputs,

    #[error("coin destruction transaction requires at least one coin input")]
    NoCoinInputs,

    #[error("transaction requires at least one miner fee")]
    NoMinerFees,

    #[error("replacement mint condition is not standard: {0}")]
    NonStandardMintCondition(String),

    #[error("transaction carries no extension for its version")]
    MissingExtension,

    #[error("unrecognized transaction version {0}")]
    UnknownVersion(u64),

    #[error("codec error: {0}")]
    Decode(#[from] chain_core::DecodeError),

    #[error("codec error: {0}")]
    Encode(#[from] chain_core::EncodeError),

    #[error("json error: {0}")]
    Json(String),
}
