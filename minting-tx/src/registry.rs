use crate::config::Config;
use crate::controllers::{CoinCreationController, CoinDestructionController, MinterDefinitionController};
use crate::error::TxError;
use crate::traits::{TxController, ValidationContext};
use chain_core::{CodecFlavor, Transaction};
use std::collections::HashMap;

/// Maps a transaction's `version` to the controller that knows how to
/// validate and hash it. Built once during daemon bootstrap and passed
/// through by reference; no implicit process-wide mutation after start.
pub struct ControllerRegistry {
    coin_creation: CoinCreationController,
    minter_definition: MinterDefinitionController,
    coin_destruction: CoinDestructionController,
}

impl ControllerRegistry {
    pub fn new(flavor: CodecFlavor, config: Config) -> ControllerRegistry {
        ControllerRegistry {
            coin_creation: CoinCreationController::new(flavor, config.clone()),
            minter_definition: MinterDefinitionController::new(flavor, config.clone()),
            coin_destruction: CoinDestructionController::new(flavor, config),
        }
    }

    pub fn versions(&self) -> HashMap<u64, &'static str> {
        let mut m = HashMap::new();
        m.insert(self.coin_creation.version(), "coin-creation");
        m.insert(self.minter_definition.version(), "minter-definition");
        m.insert(self.coin_destruction.version(), "coin-destruction");
        m
    }

    pub fn validate(&self, tx: &Transaction, ctx: &ValidationContext) -> Result<(), TxError> {
        if tx.version == self.coin_creation.version() {
            self.coin_creation.validate(tx, ctx)
        } else if tx.version == self.minter_definition.version() {
            self.minter_definition.validate(tx, ctx)
        } else if tx.version == self.coin_destruction.version() {
            self.coin_destruction.validate(tx, ctx)
        } else {
            Err(TxError::UnknownVersion(tx.version))
        }
    }

    pub fn coin_creation(&self) -> &CoinCreationController {
        &self.coin_creation
    }

    pub fn minter_definition(&self) -> &MinterDefinitionController {
        &self.minter_definition
    }

    pub fn coin_destruction(&self) -> &CoinDestructionController {
        &self.coin_destruction
    }
}
