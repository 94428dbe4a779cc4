//! Controllers for the three minting-family transactions: coin creation,
//! minter definition, and coin destruction.

mod config;
mod controllers;
mod error;
mod registry;
mod traits;

pub use config::Config;
pub use controllers::{CoinCreationController, CoinDestructionController, MinterDefinitionController};
pub use error::TxError;
pub use registry::ControllerRegistry;
pub use traits::{CommonExtensionData, TxController, TxExtensionSigner, TxIDEncoder, TxSignatureHasher, ValidationContext};

#[cfg(test)]
mod tests {
    use super::*;
    use chain_core::{
        CodecFlavor, Currency, Extension, Hash, Transaction, UnlockCondition, UnlockFulfillment,
        UnlockHash, UnlockHashType,
    };
    use secp256k1::{Secp256k1, SecretKey};

    fn sample_cc(nonce: [u8; 8], output_value: u64) -> Transaction {
        Transaction {
            version: Config::default().coin_creation_version,
            coin_inputs: vec![],
            coin_outputs: vec![chain_core::CoinOutput {
                value: Currency::from_u64(output_value),
                condition: UnlockCondition::UnlockHash(UnlockHash::new(
                    UnlockHashType::PubKey,
                    Hash::of_parts(&[b"recipient"]),
                )),
            }],
            block_stake_inputs: vec![],
            block_stake_outputs: vec![],
            miner_fees: vec![Currency::from_u64(Config::default().minimum_miner_fee)],
            arbitrary_data: vec![],
            extension: Some(Extension::CoinCreation {
                nonce,
                mint_fulfillment: UnlockFulfillment::Nil,
            }),
        }
    }

    #[test]
    fn coin_creation_fulfills_active_condition_and_is_stable_under_reencode() {
        test_support::init();
        let secp = Secp256k1::new();
        let sk = SecretKey::from_slice(&[9u8; 32]).unwrap();
        let pk = chain_core::keys::PublicKey::from_secret(&secp, &sk);
        let mint_condition = UnlockCondition::UnlockHash(pk.unlock_hash());

        let controller = CoinCreationController::new(CodecFlavor::Compact, Config::default());
        let mut tx = sample_cc([1u8; 8], 500);
        let digest = controller.signature_hash(&tx, &[]).unwrap();
        let sig = chain_core::keys::Signature::sign(&secp, &sk, &digest);
        if let Some(Extension::CoinCreation { mint_fulfillment, .. }) = &mut tx.extension {
            *mint_fulfillment = UnlockFulfillment::single_signature(pk, sig);
        }

        let ctx = ValidationContext {
            height: chain_core::BlockHeight(10),
            time: chrono::Utc::now(),
            active_mint_condition: &mint_condition,
        };
        controller.validate(&tx, &ctx).unwrap();

        let h1 = controller.signature_hash(&tx, &[]).unwrap();
        let bytes = tx.encode_to_vec(CodecFlavor::Compact).unwrap();
        let tx2 = Transaction::decode_from_slice(&bytes, CodecFlavor::Compact).unwrap();
        let h2 = controller.signature_hash(&tx2, &[]).unwrap();
        assert_eq!(h1, h2);
    }

    #[test]
    fn coin_creation_rejects_zero_value_output() {
        test_support::init();
        let controller = CoinCreationController::new(CodecFlavor::Compact, Config::default());
        let tx = sample_cc([1u8; 8], 0);
        let mint_condition = UnlockCondition::Nil;
        let ctx = ValidationContext {
            height: chain_core::BlockHeight(10),
            time: chrono::Utc::now(),
            active_mint_condition: &mint_condition,
        };
        let err = controller.validate(&tx, &ctx).unwrap_err();
        assert_eq!(err, TxError::ZeroOutput);
    }

    #[test]
    fn coin_creation_rejects_nil_nonce() {
        test_support::init();
        let controller = CoinCreationController::new(CodecFlavor::Compact, Config::default());
        let tx = sample_cc([0u8; 8], 500);
        let mint_condition = UnlockCondition::Nil;
        let ctx = ValidationContext {
            height: chain_core::BlockHeight(10),
            time: chrono::Utc::now(),
            active_mint_condition: &mint_condition,
        };
        assert_eq!(controller.validate(&tx, &ctx).unwrap_err(), TxError::NilNonce);
    }
}
