use std::collections::HashMap;

use chain_core::keys::Signature;
use chain_core::{Hash, UnlockHash};

use crate::error::WalletError;
use crate::seed::Seed;

/// An index into the wallet's list of seeds: `0` is always the primary
/// seed; `1..` are auxiliary seeds recovered or imported later.
pub type SeedId = usize;

#[derive(Clone, Copy)]
struct KnownKey {
    seed: SeedId,
    index: u64,
}

/// Maps addresses to keys across every seed the wallet holds, with a
/// lookahead buffer so outputs paying an address the wallet hasn't
/// materialized yet are still recognized during a sync.
pub struct KeyStore {
    seeds: Vec<Seed>,
    seed_fingerprints: std::collections::HashSet<Hash>,
    next_index: Vec<u64>,
    lookahead_window: u64,
    rescan_threshold: u64,
    known: HashMap<UnlockHash, KnownKey>,
    lookahead: HashMap<UnlockHash, (SeedId, u64)>,
    pub rescan_requested: bool,
}

impl KeyStore {
    pub fn new(primary: Seed, lookahead_window: u64, rescan_threshold: u64) -> KeyStore {
        let mut fingerprints = std::collections::HashSet::new();
        fingerprints.insert(Hash::of_parts(&[&primary.0]));
        let mut store = KeyStore {
            seeds: vec![primary],
            seed_fingerprints: fingerprints,
            next_index: vec![0],
            lookahead_window,
            rescan_threshold,
            known: HashMap::new(),
            lookahead: HashMap::new(),
            rescan_requested: false,
        };
        store.refill_lookahead(0);
        store
    }

    pub fn add_auxiliary_seed(&mut self, seed: Seed) -> Result<SeedId, WalletError> {
        let fingerprint = Hash::of_parts(&[&seed.0]);
        if !self.seed_fingerprints.insert(fingerprint) {
            return Err(WalletError::KnownSeed);
        }
        let id = self.seeds.len();
        self.seeds.push(seed);
        self.next_index.push(0);
        self.refill_lookahead(id);
        Ok(id)
    }

    fn refill_lookahead(&mut self, seed_id: SeedId) {
        let next = self.next_index[seed_id];
        let highest_known = self
            .known
            .values()
            .filter(|k| k.seed == seed_id)
            .map(|k| k.index)
            .max();
        let floor = highest_known.map(|h| h + 1).unwrap_or(next);
        for index in floor..floor + self.lookahead_window {
            let (_, pk) = self.seeds[seed_id].derive_keypair(index);
            self.lookahead.insert(pk.unlock_hash(), (seed_id, index));
        }
    }

    /// Allocates the next fresh address on the primary seed and advances
    /// its lookahead window.
    pub fn generate_address(&mut self) -> UnlockHash {
        let seed_id = 0;
        let index = self.next_index[seed_id];
        self.next_index[seed_id] += 1;
        let (_, pk) = self.seeds[seed_id].derive_keypair(index);
        let uh = pk.unlock_hash();
        self.known.insert(uh, KnownKey { seed: seed_id, index });
        self.lookahead.remove(&uh);
        self.refill_lookahead(seed_id);
        uh
    }

    /// Called when an incoming output names `uh`: if it was pre-derived in
    /// the lookahead map, promote it to known and extend the window; a
    /// far-future match (beyond `rescan_threshold`) instead flags a rescan.
    pub fn note_seen(&mut self, uh: &UnlockHash) {
        if let Some((seed_id, index)) = self.lookahead.get(uh).copied() {
            if index.saturating_sub(self.next_index[seed_id]) > self.rescan_threshold {
                self.rescan_requested = true;
            }
            self.known.insert(*uh, KnownKey { seed: seed_id, index });
            self.next_index[seed_id] = self.next_index[seed_id].max(index + 1);
            self.lookahead.remove(uh);
            self.refill_lookahead(seed_id);
        }
    }

    pub fn is_known(&self, uh: &UnlockHash) -> bool {
        self.known.contains_key(uh) || self.lookahead.contains_key(uh)
    }

    pub fn sign(&self, uh: &UnlockHash, digest: &Hash) -> Option<Signature> {
        self.known
            .get(uh)
            .map(|k| self.seeds[k.seed].sign(k.index, digest))
    }

    pub fn public_key(&self, uh: &UnlockHash) -> Option<chain_core::keys::PublicKey> {
        self.known
            .get(uh)
            .map(|k| self.seeds[k.seed].derive_keypair(k.index).1)
    }
}
