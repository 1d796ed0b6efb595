use crate::{
    error::{LedgerError, Result},
    Block,
};

/// Walks `chain` checking that indices run 1, 2, 3, ... and that every block
/// after the first names its predecessor's digest as `previous_hash`.
///
/// Proofs are not re-checked: blocks forged through `new_block` carry
/// whatever proof the caller supplied.
pub fn validate_chain(chain: &[Block]) -> Result<()> {
    if chain.is_empty() {
        return Err(LedgerError::EmptyChain);
    }
    for (position, block) in chain.iter().enumerate() {
        if block.index != position as u64 + 1 {
            return Err(LedgerError::IndexMismatch {
                position,
                found: block.index,
            });
        }
    }
    for pair in chain.windows(2) {
        let expected = pair[0].hash();
        if pair[1].previous_hash != expected {
            return Err(LedgerError::HashMismatch {
                index: pair[1].index,
                expected,
                found: pair[1].previous_hash.clone(),
            });
        }
    }
    Ok(())
}
