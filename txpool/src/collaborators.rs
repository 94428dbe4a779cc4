use chain_core::{BlockHeight, Transaction};

use crate::error::BoxError;

/// The subset of the consensus set's capabilities the pool needs: a dry-run
/// validator and the current tip height. The full collaborator surface
/// (subscribe/unsubscribe/get_coin_output/...) lives with whatever wires the
/// daemon together; the pool only ever consumes these two.
pub trait ConsensusSet: Send + Sync {
    fn height(&self) -> BlockHeight;

    /// Validate `set` against current consensus state without committing
    /// anything. `Ok(())` means every transaction in the set would be
    /// accepted; `Err` carries the underlying conflict reason.
    fn try_transaction_set(&self, set: &[Transaction]) -> Result<(), BoxError>;
}

/// The pool's view of the network layer: broadcasting an admitted or
/// rebroadcast set to peers.
pub trait Gateway: Send + Sync {
    fn broadcast(&self, name: &str, payload: &[u8]);
}
