//! Canonical block encoding and digests.
//!
//! A block is rendered as compact JSON with every object's keys sorted, encoded
//! as UTF-8 and hashed with SHA-256. The encoding is built field by field here
//! rather than through the serde derive, so the digest does not depend on
//! struct field order or on how the block is rendered to clients.

use crate::{constants::HASH_SIZE, Block, Transaction};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

pub type Hash = [u8; HASH_SIZE];

pub fn sha256(bytes: &[u8]) -> Hash {
    let digest = Sha256::digest(bytes);
    let mut out = [0u8; HASH_SIZE];
    out.copy_from_slice(&digest[..]);
    out
}

/// Lowercase hex SHA-256 of the block's canonical JSON.
pub fn hash_block(block: &Block) -> String {
    hex::encode(sha256(canonical_json(block).as_bytes()))
}

pub fn canonical_json(block: &Block) -> String {
    let mut out = String::new();
    write_canonical(&block_value(block), &mut out);
    out
}

fn block_value(block: &Block) -> Value {
    let mut map = Map::new();
    map.insert("index".into(), Value::from(block.index));
    map.insert("timestamp".into(), Value::from(block.timestamp));
    map.insert(
        "transactions".into(),
        Value::Array(block.transactions.iter().map(transaction_value).collect()),
    );
    map.insert("proof".into(), Value::from(block.proof));
    map.insert(
        "previous_hash".into(),
        Value::from(block.previous_hash.as_str()),
    );
    Value::Object(map)
}

fn transaction_value(tx: &Transaction) -> Value {
    let mut map = Map::new();
    map.insert("sender".into(), Value::from(tx.sender.as_str()));
    map.insert("recipient".into(), Value::from(tx.recipient.as_str()));
    map.insert("amount".into(), tx.amount.as_value().clone());
    Value::Object(map)
}

// `Map` iteration order follows serde_json's `preserve_order` feature; sort keys
// explicitly.
fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::from(key.as_str()).to_string());
                out.push(':');
                write_canonical(item, out);
            }
            out.push('}');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}
