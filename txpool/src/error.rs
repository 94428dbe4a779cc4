use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum PoolError {
    #[error("transaction set is empty after dropping already-confirmed transactions")]
    Empty,

    #[error("a set with this SetID is already in the pool")]
    DuplicateSet,

    #[error("pool is full")]
    Full,

    #[error("transaction set exceeds a size limit")]
    TooLarge,

    #[error("transaction set conflicts with consensus state: {0}")]
    Conflict(BoxError),
}
