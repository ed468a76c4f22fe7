use anyhow::Result;
use tracing::info;

use crate::{cli::MintArgs, ledger, tokens};

use super::{CommandContext, output, resolve_ledger};

pub async fn handle(args: MintArgs, ctx: &CommandContext) -> Result<()> {
    let token = tokens::lookup(&ctx.token)?;
    let ledger_id = resolve_ledger(token, args.ledger.as_deref(), ctx.dfx.network());
    let amount = tokens::parse_amount(&args.amount, token.decimals)?;

    let recipient = match &args.recipient {
        Some(p) => p.clone(),
        None => ctx.dfx.principal().await?,
    };

    let response = ledger::mint(&ctx.dfx, &ledger_id, &recipient, &args.subaccount, amount).await?;

    info!(token = token.name, %recipient, amount_base_units = amount, "submitted mint");
    output(&ledger::mint_result(
        &response,
        token.name,
        tokens::to_human(amount, token.decimals),
        &recipient,
    ));
    Ok(())
}
