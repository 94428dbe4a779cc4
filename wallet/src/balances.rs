use std::collections::HashMap;

use chain_core::{Currency, FulfillContext, UnlockHash};

use crate::keystore::KeyStore;
use crate::tracking::{classify, Relevance, Tracker};

/// Per-multisig-address aggregate: total value held and the number of
/// owned outputs contributing to it.
#[derive(Clone, Debug)]
pub struct MultisigWalletSummary {
    pub address: UnlockHash,
    pub balance: Currency,
    pub output_count: usize,
}

pub fn confirmed_balance(tracker: &Tracker, ctx: &FulfillContext) -> Currency {
    tracker
        .coin_outputs
        .values()
        .filter(|o| o.relevance == Relevance::Wallet)
        .filter(|o| o.output.condition.fulfillable(ctx))
        .map(|o| o.output.value.clone())
        .sum()
}

pub fn confirmed_locked_balance(tracker: &Tracker, ctx: &FulfillContext) -> Currency {
    tracker
        .coin_outputs
        .values()
        .filter(|o| o.relevance == Relevance::Wallet)
        .filter(|o| !o.output.condition.fulfillable(ctx))
        .map(|o| o.output.value.clone())
        .sum()
}

/// `(outgoing, incoming)`: sum of inputs/outputs across the unconfirmed
/// processed list restricted to entries touching a wallet-owned address.
pub fn unconfirmed_balance(tracker: &Tracker, keystore: &KeyStore) -> (Currency, Currency) {
    let mut outgoing = Currency::zero();
    let mut incoming = Currency::zero();
    for tx in &tracker.unconfirmed_processed_transactions {
        for input in &tx.coin_inputs {
            if let Some(owned) = tracker.coin_outputs.get(&input.parent_id) {
                outgoing += owned.output.value.clone();
            }
        }
        for output in &tx.coin_outputs {
            if classify(&output.condition, keystore) != Relevance::None {
                incoming += output.value.clone();
            }
        }
    }
    (outgoing, incoming)
}

pub fn multisig_wallets(tracker: &Tracker) -> Vec<MultisigWalletSummary> {
    let mut totals: HashMap<UnlockHash, (Currency, usize)> = HashMap::new();
    for owned in tracker.coin_outputs.values() {
        if let Relevance::MultisigWallet(address) = owned.relevance {
            let entry = totals.entry(address).or_insert_with(|| (Currency::zero(), 0));
            entry.0 += owned.output.value.clone();
            entry.1 += 1;
        }
    }
    totals
        .into_iter()
        .map(|(address, (balance, output_count))| MultisigWalletSummary {
            address,
            balance,
            output_count,
        })
        .collect()
}
