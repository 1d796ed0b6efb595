use forge_core::{
    constants::{GENESIS_PREVIOUS_HASH, GENESIS_PROOF, REWARD_SENDER},
    CancelToken, Ledger, LedgerConfig, LedgerError, ProofOfWork, SearchStrategy, SharedLedger,
    Transaction, TransactionRequest,
};

#[test]
fn test_fresh_ledger_scenario() -> anyhow::Result<()> {
    let mut ledger = Ledger::default();
    let genesis = ledger.last_block()?.clone();
    assert_eq!(genesis.index, 1);
    assert_eq!(genesis.previous_hash, GENESIS_PREVIOUS_HASH);

    assert_eq!(
        ledger.add_transaction(Transaction::new("Satoshi", "Mike", "5 BTC"))?,
        2
    );
    assert_eq!(
        ledger.add_transaction(Transaction::new("Mike", "Satoshi", "1 BTC"))?,
        2
    );
    let block = ledger.new_block(12345, None)?;

    assert_eq!(block.index, 2);
    assert_eq!(block.proof, 12345);
    assert_eq!(block.previous_hash, genesis.hash());
    assert_eq!(
        block.transactions,
        vec![
            Transaction::new("Satoshi", "Mike", "5 BTC"),
            Transaction::new("Mike", "Satoshi", "1 BTC"),
        ]
    );
    assert!(ledger.pending().is_empty());
    ledger.verify()?;
    Ok(())
}

#[test]
fn test_mining_scenario() -> anyhow::Result<()> {
    let ledger = SharedLedger::new(Ledger::new(LedgerConfig {
        pow: ProofOfWork::default().with_strategy(SearchStrategy::Parallel),
        node_id: "3f1c".into(),
        ..LedgerConfig::default()
    }));
    let block = ledger.mine_next(&CancelToken::new())?;

    assert!(ProofOfWork::default().is_valid(GENESIS_PROOF, block.proof));
    assert_eq!(block.transactions.len(), 1);
    assert_eq!(block.transactions[0].sender, REWARD_SENDER);
    assert_eq!(block.transactions[0].recipient, "3f1c");

    let next = ledger.mine_next(&CancelToken::new())?;
    assert!(ProofOfWork::default().is_valid(block.proof, next.proof));
    assert_eq!(next.previous_hash, block.hash());

    let snapshot = ledger.full_chain();
    assert_eq!(snapshot.length, 3);
    ledger.verify()?;
    Ok(())
}

#[test]
fn test_rejected_submission_does_not_touch_pool() -> anyhow::Result<()> {
    let ledger = SharedLedger::new(Ledger::default());
    let req: TransactionRequest = serde_json::from_str(r#"{"sender":"a","amount":1}"#)?;
    let result = Transaction::try_from(req).and_then(|tx| ledger.add_transaction(tx));
    assert_eq!(result, Err(LedgerError::MissingField("recipient")));
    assert!(ledger.pending().is_empty());
    Ok(())
}

#[test]
fn test_chain_renders_as_json() -> anyhow::Result<()> {
    let mut ledger = Ledger::default();
    ledger.add_transaction(Transaction::new("0", "node", 1u64))?;
    ledger.new_block(35293, None)?;

    let json = serde_json::to_value(ledger.full_chain())?;
    assert_eq!(json["length"], 2);
    assert_eq!(json["chain"][0]["index"], 1);
    assert_eq!(json["chain"][0]["previous_hash"], GENESIS_PREVIOUS_HASH);
    assert_eq!(json["chain"][1]["proof"], 35293);
    assert_eq!(json["chain"][1]["transactions"][0]["amount"], 1);
    assert_eq!(
        json["chain"][1]["previous_hash"],
        ledger.chain()[0].hash().as_str()
    );
    Ok(())
}
