// Local web UI: an axum JSON API over the same ledger operations as the
// CLI, plus the embedded single-page front-end.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::{
    dfx::DfxClient,
    error::WalletError,
    ledger::{self, TransferCall},
    prices::{self, PriceCache, PriceMap},
    tokens::{self, TokenInfo},
};

pub struct AppState {
    dfx: DfxClient,
    ledgers: HashMap<String, String>,
    prices: PriceCache,
    http: reqwest::Client,
}

impl AppState {
    fn ledger_for(&self, token: &TokenInfo) -> String {
        self.ledgers
            .get(token.symbol)
            .cloned()
            .unwrap_or_else(|| token.ledger.to_string())
    }
}

pub async fn run(
    port: u16,
    open_browser: bool,
    dfx: DfxClient,
    ledgers: HashMap<String, String>,
) -> Result<()> {
    let state = Arc::new(AppState {
        dfx,
        ledgers,
        prices: PriceCache::new(),
        http: prices::http_client()?,
    });

    let app = Router::new()
        .route("/", get(index))
        .route("/api/identity", get(get_identity))
        .route("/api/identities", get(list_identities))
        .route("/api/identity/use", post(use_identity))
        .route("/api/balance/:token", get(get_balance))
        .route("/api/balances", get(get_balances))
        .route("/api/transfer", post(post_transfer))
        .route("/api/info/:token", get(get_info))
        .with_state(state);

    let listener = TcpListener::bind(("127.0.0.1", port))
        .await
        .with_context(|| format!("Failed to bind 127.0.0.1:{port}"))?;
    let url = format!("http://127.0.0.1:{port}");
    info!(%url, "wallet UI listening");
    println!("ICW wallet UI: {url}");

    if open_browser && let Err(e) = open_browser_url(&url) {
        warn!(error = %e, "could not open browser");
    }

    axum::serve(listener, app).await.context("Server failed")?;
    Ok(())
}

async fn index() -> Html<&'static str> {
    Html(include_str!("static/index.html"))
}

async fn get_identity(State(state): State<Arc<AppState>>) -> ApiResult<Json<Value>> {
    let identity = state.dfx.whoami().await?;
    let principal = state.dfx.principal().await?;
    Ok(Json(json!({"identity": identity, "principal": principal})))
}

async fn list_identities(State(state): State<Arc<AppState>>) -> ApiResult<Json<Value>> {
    let current = state.dfx.whoami().await?;
    let identities: Vec<_> = state
        .dfx
        .list_identities()
        .await?
        .into_iter()
        .map(|name| json!({"active": name == current, "name": name}))
        .collect();
    Ok(Json(json!({"identities": identities, "current": current})))
}

#[derive(Deserialize)]
struct IdentityRequest {
    name: String,
}

async fn use_identity(
    State(state): State<Arc<AppState>>,
    Json(req): Json<IdentityRequest>,
) -> ApiResult<Json<Value>> {
    state.dfx.use_identity(&req.name).await?;
    let principal = state.dfx.principal().await?;
    Ok(Json(json!({"switched": req.name, "principal": principal})))
}

#[derive(Deserialize)]
struct BalanceQuery {
    #[serde(default = "default_subaccount")]
    subaccount: String,
}

fn default_subaccount() -> String {
    "0".to_string()
}

async fn get_balance(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
    Query(query): Query<BalanceQuery>,
) -> ApiResult<Json<Value>> {
    let token = tokens::lookup(&token)?;
    let quotes = state.prices.get_all(&state.http).await;
    Ok(Json(balance_json(&state, token, &query.subaccount, &quotes).await?))
}

async fn get_balances(State(state): State<Arc<AppState>>) -> ApiResult<Json<Value>> {
    let quotes = state.prices.get_all(&state.http).await;
    let mut balances = Vec::with_capacity(tokens::TOKENS.len());
    for token in tokens::TOKENS {
        match balance_json(&state, token, "0", &quotes).await {
            Ok(value) => balances.push(value),
            Err(e) => {
                warn!(token = token.symbol, error = %e.detail, "balance query failed");
                balances.push(json!({"token": token.symbol, "error": true}));
            }
        }
    }
    Ok(Json(json!({"balances": balances})))
}

async fn balance_json(
    state: &AppState,
    token: &TokenInfo,
    subaccount: &str,
    quotes: &PriceMap,
) -> ApiResult<Value> {
    let principal = state.dfx.principal().await?;
    let ledger_id = state.ledger_for(token);
    let raw = ledger::fetch_balance(&state.dfx, &ledger_id, &principal, subaccount).await?;
    let human = tokens::to_human(raw, token.decimals);
    let price = token
        .coingecko_id
        .and_then(|id| quotes.get(id).copied().flatten());
    let usd = price.map(|p| (human * p * 100.0).round() / 100.0);
    Ok(json!({
        "token": token.name,
        "balance": human,
        "raw": raw,
        "usd": usd,
        "price": price,
        "principal": principal,
    }))
}

#[derive(Deserialize)]
struct TransferRequest {
    #[serde(default = "default_token")]
    token: String,
    recipient: String,
    amount: String,
    #[serde(default = "default_subaccount")]
    subaccount: String,
    #[serde(default = "default_subaccount")]
    from_subaccount: String,
    #[serde(default)]
    memo: String,
}

fn default_token() -> String {
    "ckbtc".to_string()
}

async fn post_transfer(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TransferRequest>,
) -> ApiResult<Json<Value>> {
    let token = tokens::lookup(&req.token)?;
    let amount = tokens::parse_amount(&req.amount, token.decimals)?;
    let ledger_id = state.ledger_for(token);

    let call = TransferCall {
        recipient: req.recipient.clone(),
        amount,
        fee: token.fee,
        subaccount: req.subaccount.clone(),
        from_subaccount: req.from_subaccount.clone(),
        memo: req.memo.clone(),
    };
    let response = ledger::transfer(&state.dfx, &ledger_id, &call).await?;

    let memo = (!req.memo.is_empty()).then_some(req.memo.as_str());
    Ok(Json(ledger::transfer_result(
        &response,
        token.name,
        tokens::to_human(amount, token.decimals),
        &req.recipient,
        memo,
    )))
}

async fn get_info(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> ApiResult<Json<Value>> {
    let token = tokens::lookup(&token)?;
    let quotes = state.prices.get_all(&state.http).await;
    let price = token
        .coingecko_id
        .and_then(|id| quotes.get(id).copied().flatten());
    let principal = state.dfx.principal().await?;
    Ok(Json(json!({
        "token": token.name,
        "ledger": state.ledger_for(token),
        "decimals": token.decimals,
        "fee": token.fee,
        "fee_human": tokens::to_human(token.fee, token.decimals),
        "price_usd": price,
        "principal": principal,
        "network": state.dfx.network(),
    })))
}

type ApiResult<T> = std::result::Result<T, ApiError>;

// Client-input errors map to 400, upstream failures to 500; both carry a
// JSON detail body the front-end can display.
struct ApiError {
    status: StatusCode,
    detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({"detail": self.detail}))).into_response()
    }
}

impl From<WalletError> for ApiError {
    fn from(err: WalletError) -> Self {
        let status = if err.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        ApiError {
            status,
            detail: err.to_string(),
        }
    }
}

fn open_browser_url(url: &str) -> Result<()> {
    let mut cmd = if cfg!(target_os = "macos") {
        let mut cmd = std::process::Command::new("open");
        cmd.arg(url);
        cmd
    } else if cfg!(target_os = "windows") {
        let mut cmd = std::process::Command::new("cmd");
        cmd.args(["/C", "start", "", url]);
        cmd
    } else {
        let mut cmd = std::process::Command::new("xdg-open");
        cmd.arg(url);
        cmd
    };
    let status = cmd.status().context("Failed to open browser")?;
    if !status.success() {
        return Err(anyhow!("Failed to open browser"));
    }
    Ok(())
}
