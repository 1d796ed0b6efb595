pub mod constants;
pub mod error;
pub mod hasher;
pub mod ledger;
pub mod pool;
pub mod pow;
pub mod shared;
pub mod validate;

pub use error::{LedgerError, Result};
pub use ledger::{ChainSnapshot, Ledger, LedgerConfig};
pub use pool::Pool;
pub use pow::{CancelToken, ProofOfWork, SearchStrategy};
pub use shared::SharedLedger;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Value moved by a transaction. The ledger never interprets it: unit counts,
/// decimals, negative numbers, free text such as `"5 BTC"` and even `null` are
/// carried through untouched.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(Value);

impl Amount {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

impl From<Value> for Amount {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl From<u64> for Amount {
    fn from(units: u64) -> Self {
        Self(Value::from(units))
    }
}

impl From<i64> for Amount {
    fn from(units: i64) -> Self {
        Self(Value::from(units))
    }
}

impl From<&str> for Amount {
    fn from(text: &str) -> Self {
        Self(Value::from(text))
    }
}

impl From<String> for Amount {
    fn from(text: String) -> Self {
        Self(Value::from(text))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Value::String(text) => f.write_str(text),
            other => write!(f, "{other}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: String,
    pub recipient: String,
    pub amount: Amount,
}

impl Transaction {
    pub fn new(
        sender: impl Into<String>,
        recipient: impl Into<String>,
        amount: impl Into<Amount>,
    ) -> Self {
        Self {
            sender: sender.into(),
            recipient: recipient.into(),
            amount: amount.into(),
        }
    }
}

/// A transaction as submitted from outside, before the required fields have
/// been checked. Only an absent key counts as missing; `"amount": null` is a
/// present amount.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct TransactionRequest {
    pub sender: Option<String>,
    pub recipient: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub amount: Option<Amount>,
}

fn present<'de, D>(deserializer: D) -> std::result::Result<Option<Amount>, D::Error>
where
    D: Deserializer<'de>,
{
    Amount::deserialize(deserializer).map(Some)
}

impl TryFrom<TransactionRequest> for Transaction {
    type Error = LedgerError;

    fn try_from(req: TransactionRequest) -> Result<Self> {
        let sender = req.sender.ok_or(LedgerError::MissingField("sender"))?;
        let recipient = req.recipient.ok_or(LedgerError::MissingField("recipient"))?;
        let amount = req.amount.ok_or(LedgerError::MissingField("amount"))?;
        Ok(Transaction {
            sender,
            recipient,
            amount,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
    pub transactions: Vec<Transaction>,
    pub proof: u64,
    pub previous_hash: String,
}

impl Block {
    /// Hex SHA-256 digest of the block's canonical form.
    pub fn hash(&self) -> String {
        hasher::hash_block(self)
    }
}

pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
