pub mod api;

use axum::{
    routing::{get, post},
    Router,
};
use clap::Parser;
use forge_core::{
    constants::{MINING_REWARD, POW_DIFFICULTY},
    Ledger, LedgerConfig, ProofOfWork, SearchStrategy, SharedLedger,
};
use std::{
    sync::{atomic::AtomicUsize, Arc},
    time::Duration,
};
use tower_http::trace::TraceLayer;

#[derive(Parser, Debug, Clone)]
#[command(name = "forge-node")]
#[command(about = "Single-node proof-of-work ledger served over HTTP")]
pub struct Args {
    /// Address to listen on, e.g. 127.0.0.1:5000
    #[arg(long, default_value = "127.0.0.1:5000")]
    pub listen: String,

    /// Identity credited with mining rewards (random when omitted)
    #[arg(long)]
    pub node_id: Option<String>,

    /// Leading zero hex digits a proof digest must have
    #[arg(long, default_value_t = POW_DIFFICULTY, value_parser = clap::value_parser!(u32).range(0..=64))]
    pub difficulty: u32,

    /// Amount paid to the node for each mined block
    #[arg(long, default_value_t = MINING_REWARD)]
    pub reward: u64,

    /// Spread the proof search over all cores
    #[arg(long)]
    pub parallel: bool,

    /// Give up on a /mine request after this many seconds
    #[arg(long)]
    pub mine_timeout_secs: Option<u64>,
}

impl Args {
    pub fn ledger_config(&self) -> LedgerConfig {
        let strategy = if self.parallel {
            SearchStrategy::Parallel
        } else {
            SearchStrategy::Sequential
        };
        LedgerConfig {
            pow: ProofOfWork::new(self.difficulty).with_strategy(strategy),
            node_id: self.node_id.clone().unwrap_or_else(node_identifier),
            reward: self.reward,
            ..LedgerConfig::default()
        }
    }
}

/// 32 lowercase hex characters.
pub fn node_identifier() -> String {
    hex::encode(rand::random::<[u8; 16]>())
}

#[derive(Clone)]
pub struct AppState {
    pub ledger: SharedLedger,
    pub mine_timeout: Option<Duration>,
    /// Proof searches currently running on the blocking pool.
    pub active_searches: Arc<AtomicUsize>,
}

impl AppState {
    pub fn new(config: LedgerConfig, mine_timeout: Option<Duration>) -> Self {
        Self {
            ledger: SharedLedger::new(Ledger::new(config)),
            mine_timeout,
            active_searches: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn from_args(args: &Args) -> Self {
        Self::new(
            args.ledger_config(),
            args.mine_timeout_secs.map(Duration::from_secs),
        )
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/mine", get(api::mine))
        .route("/transactions/new", post(api::new_transaction))
        .route("/transactions/pending", get(api::pending))
        .route("/chain", get(api::full_chain))
        .route("/chain/verify", get(api::verify))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
