use anyhow::Result;
use serde_json::json;
use tracing::info;

use crate::{cli::BalanceArgs, ledger, prices, tokens};

use super::{CommandContext, output, resolve_ledger};

pub async fn handle(args: BalanceArgs, ctx: &CommandContext) -> Result<()> {
    let token = tokens::lookup(&ctx.token)?;
    let ledger_id = resolve_ledger(token, args.ledger.as_deref(), ctx.dfx.network());

    let previous = match &args.identity {
        Some(name) => ctx.dfx.switch_identity(name).await?,
        None => None,
    };
    let queried = query_balance(ctx, &ledger_id, args.principal.as_deref(), &args.subaccount).await;
    ctx.dfx.restore_identity(previous).await;
    let (raw, principal) = queried?;

    let human = tokens::to_human(raw, token.decimals);
    let http = prices::http_client()?;
    let price = prices::fetch_usd_price(&http, token.coingecko_id).await;
    let usd = price.map(|p| (human * p * 100.0).round() / 100.0);

    info!(token = token.name, %principal, balance_base_units = raw, "fetched token balance");
    output(&json!({
        "token": token.name,
        "balance": human,
        "raw": raw,
        "usd": usd,
        "price": price,
        "principal": principal,
    }));
    Ok(())
}

async fn query_balance(
    ctx: &CommandContext,
    ledger_id: &str,
    principal: Option<&str>,
    subaccount: &str,
) -> Result<(u128, String)> {
    let principal = match principal {
        Some(p) => p.to_string(),
        None => ctx.dfx.principal().await?,
    };
    let raw = ledger::fetch_balance(&ctx.dfx, ledger_id, &principal, subaccount).await?;
    Ok((raw, principal))
}
