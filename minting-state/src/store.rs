use crate::config::Config;
use crate::error::StateError;
use chain_core::{Block, BlockHeight, CodecFlavor, Decode, Encode, Extension, Transaction, UnlockCondition};
use tracing::{debug, trace, warn};

const HEADER_NAME: &str = "mintingPlugin";
const HEADER_VERSION: &str = "1.0.0.0";
const META_KEY: &[u8] = b"header";

/// The minter-definition transaction's reconstructed effect: a replacement
/// mint condition to install at the height it confirmed in.
struct MinterDefinition {
    mint_condition: UnlockCondition,
}

fn minter_definition_in(tx: &Transaction, minter_definition_version: u64) -> Option<MinterDefinition> {
    if tx.version != minter_definition_version {
        return None;
    }
    match &tx.extension {
        Some(Extension::MinterDefinition { mint_condition, .. }) => Some(MinterDefinition {
            mint_condition: mint_condition.clone(),
        }),
        _ => None,
    }
}

/// Height-indexed persistent store of the active mint condition, backed by
/// a single sled bucket keyed by big-endian height so iteration order
/// matches numeric order.
pub struct MintConditionStore {
    db: sled::Db,
    bucket: sled::Tree,
    meta: sled::Tree,
    minter_definition_version: u64,
    corrupt: bool,
}

impl MintConditionStore {
    /// Opens (or creates) the store. On first open, writes the genesis
    /// condition at height 0 and the header record. On subsequent opens,
    /// verifies the stored genesis condition matches `genesis_condition`.
    pub fn open(
        config: &Config,
        genesis_condition: UnlockCondition,
        minter_definition_version: u64,
    ) -> Result<MintConditionStore, StateError> {
        let db = sled::open(&config.cache_dir)?;
        let bucket = db.open_tree(b"mintconditions")?;
        let meta = db.open_tree(b"mintconditions_meta")?;

        let mut store = MintConditionStore {
            db,
            bucket,
            meta,
            minter_definition_version,
            corrupt: false,
        };

        match store.meta.get(META_KEY)? {
            None => {
                debug!("initializing minting plugin store at genesis");
                store.write_condition(BlockHeight::GENESIS, &genesis_condition)?;
                store.meta.insert(META_KEY, encode_header())?;
                store.db.flush()?;
            }
            Some(raw) => {
                let (name, version) = decode_header(&raw)?;
                if name != HEADER_NAME || version != HEADER_VERSION {
                    return Err(StateError::BadVersion(format!("{}/{}", name, version)));
                }
                let stored_genesis = store.read_condition(BlockHeight::GENESIS)?;
                match stored_genesis {
                    Some(existing) if existing == genesis_condition => {}
                    Some(_) => return Err(StateError::GenesisMismatch),
                    None => return Err(StateError::Corrupt("missing genesis entry".into())),
                }
            }
        }

        Ok(store)
    }

    fn guard(&self) -> Result<(), StateError> {
        if self.corrupt {
            Err(StateError::Corrupt("store marked corrupt after a failed transaction".into()))
        } else {
            Ok(())
        }
    }

    fn write_condition(&self, h: BlockHeight, condition: &UnlockCondition) -> Result<(), StateError> {
        let bytes = condition.encode_to_vec(CodecFlavor::Compact)?;
        self.bucket.insert(h.to_be_bytes(), bytes)?;
        Ok(())
    }

    fn read_condition(&self, h: BlockHeight) -> Result<Option<UnlockCondition>, StateError> {
        match self.bucket.get(h.to_be_bytes())? {
            Some(raw) => Ok(Some(UnlockCondition::decode_from_slice(&raw, CodecFlavor::Compact)?)),
            None => Ok(None),
        }
    }

    /// Applies every block in `blocks`, each at its header's height. Each
    /// block is its own persistent transaction; any failure marks the
    /// store corrupt and aborts the remaining blocks.
    pub fn apply_blocks(&mut self, blocks: &[Block]) -> Result<(), StateError> {
        self.guard()?;
        for block in blocks {
            if let Err(e) = self.apply_one(block) {
                self.corrupt = true;
                return Err(e);
            }
        }
        Ok(())
    }

    fn apply_one(&self, block: &Block) -> Result<(), StateError> {
        let h = block.height();
        // If a block carries multiple minter-definition transactions only
        // the last one wins; the store keeps one entry per height.
        let mut winner: Option<MinterDefinition> = None;
        for tx in &block.transactions {
            if let Some(def) = minter_definition_in(tx, self.minter_definition_version) {
                winner = Some(def);
            }
        }
        if let Some(def) = winner {
            trace!(height = %h, "installing new mint condition");
            self.write_condition(h, &def.mint_condition)?;
        }
        Ok(())
    }

    /// Reverts every block in `blocks`, each unconditionally deleting its
    /// height's entry — a no-op when that height never held a
    /// minter-definition. This matches the spec literally rather than
    /// special-casing "nothing to revert".
    pub fn revert_blocks(&mut self, blocks: &[Block]) -> Result<(), StateError> {
        self.guard()?;
        for block in blocks {
            if let Err(e) = self.bucket.remove(block.height().to_be_bytes()) {
                self.corrupt = true;
                return Err(StateError::Io(e));
            }
        }
        Ok(())
    }

    /// The value at the greatest stored height.
    pub fn active_mint_condition(&self) -> Result<UnlockCondition, StateError> {
        self.guard()?;
        match self.bucket.iter().next_back() {
            Some(entry) => {
                let (_, raw) = entry?;
                Ok(UnlockCondition::decode_from_slice(&raw, CodecFlavor::Compact)?)
            }
            None => Err(StateError::Empty),
        }
    }

    /// The value at the greatest stored height `<= h`. If `h` exceeds
    /// every stored key, returns the value at the greatest stored key.
    pub fn mint_condition_at(&self, h: BlockHeight) -> Result<UnlockCondition, StateError> {
        self.guard()?;
        let upper = h.to_be_bytes();
        let mut range = self.bucket.range(..=upper.as_slice());
        match range.next_back() {
            Some(entry) => {
                let (_, raw) = entry?;
                Ok(UnlockCondition::decode_from_slice(&raw, CodecFlavor::Compact)?)
            }
            None => {
                // h predates every stored key (shouldn't happen once
                // genesis is present) — fall back to the overall active
                // condition rather than erroring.
                warn!(height = %h, "mint_condition_at queried below genesis");
                self.active_mint_condition()
            }
        }
    }

    pub fn close(self) -> Result<(), StateError> {
        self.db.flush()?;
        Ok(())
    }
}

fn encode_header() -> Vec<u8> {
    format!("{}\n{}", HEADER_NAME, HEADER_VERSION).into_bytes()
}

fn decode_header(raw: &[u8]) -> Result<(String, String), StateError> {
    let s = String::from_utf8(raw.to_vec())
        .map_err(|e| StateError::Corrupt(format!("header is not utf8: {}", e)))?;
    let mut parts = s.splitn(2, '\n');
    let name = parts.next().unwrap_or_default().to_string();
    let version = parts.next().unwrap_or_default().to_string();
    Ok((name, version))
}
