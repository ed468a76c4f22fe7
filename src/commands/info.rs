use anyhow::Result;
use serde_json::json;

use crate::{cli::InfoArgs, prices, tokens};

use super::{CommandContext, output};

pub async fn handle(_args: InfoArgs, ctx: &CommandContext) -> Result<()> {
    let token = tokens::lookup(&ctx.token)?;
    let http = prices::http_client()?;
    let price = prices::fetch_usd_price(&http, token.coingecko_id).await;
    let principal = ctx.dfx.principal().await?;

    output(&json!({
        "token": token.name,
        "ledger": token.ledger,
        "decimals": token.decimals,
        "fee": token.fee,
        "fee_human": tokens::to_human(token.fee, token.decimals),
        "price_usd": price,
        "principal": principal,
        "network": ctx.dfx.network(),
    }));
    Ok(())
}
