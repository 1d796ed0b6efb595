pub const HASH_SIZE: usize = 32;
pub const HASH_HEX_SIZE: usize = HASH_SIZE * 2;
pub const POW_DIFFICULTY: u32 = 4;
pub const POW_BATCH_SIZE: u64 = 1_000;
pub const GENESIS_PROOF: u64 = 100;
pub const GENESIS_PREVIOUS_HASH: &str =
    "The Times 03/Jan/2009 Chancellor on brink of second bailout for banks.";
/// Sender recorded on mining rewards; marks newly minted value.
pub const REWARD_SENDER: &str = "0";
pub const MINING_REWARD: u64 = 1;
