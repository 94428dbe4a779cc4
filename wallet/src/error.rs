use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum WalletError {
    #[error("wallet is locked")]
    Locked,

    #[error("wallet is already unlocked")]
    AlreadyUnlocked,

    #[error("wallet has no encrypted seed file")]
    Unencrypted,

    #[error("encryption key does not decrypt the seed file")]
    BadEncryptionKey,

    #[error("seed is already known to the wallet")]
    KnownSeed,

    #[error("address is not known to this wallet")]
    UnknownAddress,

    #[error("not enough spendable balance to cover the requested amount")]
    LowBalance,

    #[error("only outputs respent within the timeout window could cover the requested amount")]
    IncompleteTransactions,

    #[error("at least one output is required")]
    NilOutputs,

    #[error("transaction has already been signed")]
    AlreadySigned,

    #[error("coin inputs minus coin outputs must equal the configured fee")]
    FeeMismatch,

    #[error("arbitrary data exceeds the configured size limit")]
    ArbitraryDataTooLarge,

    #[error("codec error: {0}")]
    Decode(#[from] chain_core::DecodeError),

    #[error("codec error: {0}")]
    Encode(#[from] chain_core::EncodeError),

    #[error(transparent)]
    Condition(#[from] chain_core::ConditionError),

    #[error("consensus collaborator error: {0}")]
    Consensus(BoxError),

    #[error("pool submission error: {0}")]
    Pool(BoxError),
}
