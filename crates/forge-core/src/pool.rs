use crate::Transaction;

/// Transactions waiting for the next block, in arrival order.
#[derive(Clone, Debug, Default)]
pub struct Pool {
    txs: Vec<Transaction>,
}

impl Pool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends as-is; the pool never validates contents.
    pub fn push(&mut self, tx: Transaction) {
        self.txs.push(tx);
    }

    /// Removes and returns every pending transaction, oldest first.
    pub fn drain_all(&mut self) -> Vec<Transaction> {
        std::mem::take(&mut self.txs)
    }

    pub fn pending(&self) -> &[Transaction] {
        &self.txs
    }

    pub fn len(&self) -> usize {
        self.txs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.txs.is_empty()
    }
}
