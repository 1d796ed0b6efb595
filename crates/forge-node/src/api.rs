use crate::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use forge_core::{
    Block, CancelToken, ChainSnapshot, LedgerError, Transaction, TransactionRequest,
};
use serde::Serialize;
use std::sync::atomic::Ordering;
use tracing::{info, warn};

#[derive(Debug)]
pub enum ApiError {
    Ledger(LedgerError),
    InvalidInput(String),
    Internal(String),
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        ApiError::Ledger(err)
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Ledger(err @ LedgerError::MissingField(_)) => {
                (StatusCode::BAD_REQUEST, err.to_string())
            }
            ApiError::Ledger(err @ LedgerError::Cancelled) => {
                (StatusCode::REQUEST_TIMEOUT, err.to_string())
            }
            ApiError::Ledger(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
            ApiError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        if status.is_server_error() {
            warn!(%status, %message, "request failed");
        }
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

#[derive(Serialize)]
pub struct Health {
    status: &'static str,
    mining: usize,
}

#[derive(Serialize)]
pub struct MineResponse {
    message: &'static str,
    index: u64,
    transactions: Vec<Transaction>,
    proof: u64,
    previous_hash: String,
}

impl From<Block> for MineResponse {
    fn from(block: Block) -> Self {
        Self {
            message: "The new block has been forged",
            index: block.index,
            transactions: block.transactions,
            proof: block.proof,
            previous_hash: block.previous_hash,
        }
    }
}

#[derive(Serialize)]
pub struct MessageResponse {
    message: String,
}

#[derive(Serialize)]
pub struct PendingResponse {
    transactions: Vec<Transaction>,
    length: usize,
}

#[derive(Serialize)]
pub struct VerifyResponse {
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Cancels the proof search if the request is dropped before it finishes.
struct CancelOnDrop(CancelToken);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

pub async fn health(State(state): State<AppState>) -> Json<Health> {
    Json(Health {
        status: "ok",
        mining: state.active_searches.load(Ordering::SeqCst),
    })
}

pub async fn mine(State(state): State<AppState>) -> Result<Json<MineResponse>, ApiError> {
    let cancel = CancelToken::new();
    let _guard = CancelOnDrop(cancel.clone());
    let timer = state.mine_timeout.map(|timeout| {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            cancel.cancel();
        })
    });

    let ledger = state.ledger.clone();
    let searches = state.active_searches.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        searches.fetch_add(1, Ordering::SeqCst);
        let result = ledger.mine_next(&cancel);
        searches.fetch_sub(1, Ordering::SeqCst);
        result
    })
    .await;
    if let Some(timer) = timer {
        timer.abort();
    }
    let block = outcome.map_err(|e| ApiError::Internal(e.to_string()))??;
    info!(index = block.index, proof = block.proof, "mined block");
    Ok(Json(block.into()))
}

/// Accepts the JSON body whatever its declared content type.
pub async fn new_transaction(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let req: TransactionRequest = serde_json::from_slice(&body)
        .map_err(|e| ApiError::InvalidInput(format!("invalid transaction body: {e}")))?;
    let tx = Transaction::try_from(req)?;
    let index = state.ledger.add_transaction(tx)?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: format!("Transaction is scheduled to be added to Block No. {index}"),
        }),
    ))
}

pub async fn pending(State(state): State<AppState>) -> Json<PendingResponse> {
    let transactions = state.ledger.pending();
    Json(PendingResponse {
        length: transactions.len(),
        transactions,
    })
}

pub async fn full_chain(State(state): State<AppState>) -> Json<ChainSnapshot> {
    Json(state.ledger.full_chain())
}

pub async fn verify(State(state): State<AppState>) -> Json<VerifyResponse> {
    let response = match state.ledger.verify() {
        Ok(()) => VerifyResponse {
            valid: true,
            error: None,
        },
        Err(err) => VerifyResponse {
            valid: false,
            error: Some(err.to_string()),
        },
    };
    Json(response)
}
