use crate::{
    error::Result,
    ledger::{ChainSnapshot, Ledger},
    pow::CancelToken,
    Block, Transaction,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Cloneable handle to one [`Ledger`] behind a single mutex.
///
/// Every operation that touches the chain or the pool holds the lock for its
/// whole duration, except the proof search in [`SharedLedger::mine_next`],
/// which runs unlocked.
#[derive(Clone, Debug)]
pub struct SharedLedger {
    inner: Arc<Mutex<Ledger>>,
}

impl SharedLedger {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ledger)),
        }
    }

    // Poisoning is ignored: no mutation leaves the ledger half-written.
    fn lock(&self) -> MutexGuard<'_, Ledger> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_transaction(&self, tx: Transaction) -> Result<u64> {
        self.lock().add_transaction(tx)
    }

    pub fn new_block(&self, proof: u64, previous_hash: Option<String>) -> Result<Block> {
        self.lock().new_block(proof, previous_hash)
    }

    pub fn last_block(&self) -> Result<Block> {
        self.lock().last_block().cloned()
    }

    pub fn full_chain(&self) -> ChainSnapshot {
        self.lock().full_chain()
    }

    pub fn pending(&self) -> Vec<Transaction> {
        self.lock().pending().to_vec()
    }

    pub fn verify(&self) -> Result<()> {
        self.lock().verify()
    }

    /// Mines the next block without holding the lock during the search.
    ///
    /// If another block lands while the search runs, the proof no longer
    /// matches the tip and the search starts over from the new last block.
    pub fn mine_next(&self, cancel: &CancelToken) -> Result<Block> {
        loop {
            let (tip, last_proof, pow) = {
                let ledger = self.lock();
                let last = ledger.last_block()?;
                (last.index, last.proof, *ledger.pow())
            };
            let proof = pow.solve(last_proof, cancel)?;

            let mut ledger = self.lock();
            if ledger.last_block()?.index == tip {
                return ledger.commit_proof(proof);
            }
            debug!(tip, "chain advanced during proof search, retrying");
        }
    }
}
