use crate::{
    constants::{GENESIS_PREVIOUS_HASH, GENESIS_PROOF, MINING_REWARD, REWARD_SENDER},
    error::{LedgerError, Result},
    now_millis,
    pool::Pool,
    pow::{CancelToken, ProofOfWork},
    validate::validate_chain,
    Block, Transaction,
};
use serde::Serialize;
use tracing::{debug, info};

#[derive(Clone, Debug)]
pub struct LedgerConfig {
    pub pow: ProofOfWork,
    /// Recipient of mining rewards.
    pub node_id: String,
    pub reward: u64,
    pub genesis_proof: u64,
    pub genesis_previous_hash: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            pow: ProofOfWork::default(),
            node_id: "local".to_string(),
            reward: MINING_REWARD,
            genesis_proof: GENESIS_PROOF,
            genesis_previous_hash: GENESIS_PREVIOUS_HASH.to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct ChainSnapshot {
    pub chain: Vec<Block>,
    pub length: usize,
}

/// The chain plus the pool of transactions waiting for the next block.
///
/// A `Ledger` always holds at least the genesis block. It is not synchronized;
/// see [`crate::SharedLedger`] for the handle used across threads.
#[derive(Debug)]
pub struct Ledger {
    chain: Vec<Block>,
    pool: Pool,
    config: LedgerConfig,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(LedgerConfig::default())
    }
}

impl Ledger {
    pub fn new(config: LedgerConfig) -> Self {
        let proof = config.genesis_proof;
        let previous_hash = config.genesis_previous_hash.clone();
        let mut ledger = Self {
            chain: Vec::new(),
            pool: Pool::new(),
            config,
        };
        let genesis = ledger.append(proof, previous_hash);
        info!(proof = genesis.proof, "genesis block created");
        ledger
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn pow(&self) -> &ProofOfWork {
        &self.config.pow
    }

    pub fn chain(&self) -> &[Block] {
        &self.chain
    }

    pub fn pending(&self) -> &[Transaction] {
        self.pool.pending()
    }

    pub fn last_block(&self) -> Result<&Block> {
        self.chain.last().ok_or(LedgerError::EmptyChain)
    }

    /// Queues `tx` for the next block and returns that block's index.
    pub fn add_transaction(&mut self, tx: Transaction) -> Result<u64> {
        let next_index = self.last_block()?.index + 1;
        debug!(
            sender = %tx.sender,
            recipient = %tx.recipient,
            amount = %tx.amount,
            next_index,
            "transaction queued"
        );
        self.pool.push(tx);
        Ok(next_index)
    }

    /// Seals every pending transaction into a new block carrying `proof`.
    ///
    /// Without an explicit `previous_hash` the digest of the current last
    /// block is used.
    pub fn new_block(&mut self, proof: u64, previous_hash: Option<String>) -> Result<Block> {
        let previous_hash = match previous_hash {
            Some(hash) => hash,
            None => self.last_block()?.hash(),
        };
        let block = self.append(proof, previous_hash);
        info!(
            index = block.index,
            proof = block.proof,
            txs = block.transactions.len(),
            "block forged"
        );
        Ok(block)
    }

    /// Solves the puzzle seeded by the last block's proof, pays the reward to
    /// `config.node_id` and forges the next block.
    pub fn mine_next(&mut self, cancel: &CancelToken) -> Result<Block> {
        let last_proof = self.last_block()?.proof;
        let proof = self.config.pow.solve(last_proof, cancel)?;
        self.commit_proof(proof)
    }

    /// Reward plus `new_block` for a proof already solved against the current
    /// last block.
    pub(crate) fn commit_proof(&mut self, proof: u64) -> Result<Block> {
        let previous_hash = self.last_block()?.hash();
        self.pool.push(Transaction::new(
            REWARD_SENDER,
            self.config.node_id.clone(),
            self.config.reward,
        ));
        self.new_block(proof, Some(previous_hash))
    }

    pub fn full_chain(&self) -> ChainSnapshot {
        ChainSnapshot {
            chain: self.chain.clone(),
            length: self.chain.len(),
        }
    }

    /// Re-checks index continuity and hash links over the whole chain.
    pub fn verify(&self) -> Result<()> {
        validate_chain(&self.chain)
    }

    fn append(&mut self, proof: u64, previous_hash: String) -> Block {
        // Timestamps never go backwards along the chain.
        let floor = self.chain.last().map_or(0, |b| b.timestamp);
        let block = Block {
            index: self.chain.len() as u64 + 1,
            timestamp: now_millis().max(floor),
            transactions: self.pool.drain_all(),
            proof,
            previous_hash,
        };
        self.chain.push(block.clone());
        block
    }
}
