use anyhow::Result;
use tracing::info;

use crate::{
    cli::TransferArgs,
    ledger::{self, TransferCall},
    tokens,
};

use super::{CommandContext, output, resolve_ledger};

pub async fn handle(args: TransferArgs, ctx: &CommandContext) -> Result<()> {
    let token = tokens::lookup(&ctx.token)?;
    let ledger_id = resolve_ledger(token, args.ledger.as_deref(), ctx.dfx.network());
    let amount = tokens::parse_amount(&args.amount, token.decimals)?;

    let call = TransferCall {
        recipient: args.recipient.clone(),
        amount,
        fee: args.fee.unwrap_or(token.fee),
        subaccount: args.subaccount.clone(),
        from_subaccount: args.from_subaccount.clone(),
        memo: args.memo.clone().unwrap_or_default(),
    };

    let previous = match &args.identity {
        Some(name) => ctx.dfx.switch_identity(name).await?,
        None => None,
    };
    let response = ledger::transfer(&ctx.dfx, &ledger_id, &call).await;
    ctx.dfx.restore_identity(previous).await;
    let response = response?;

    info!(
        token = token.name,
        recipient = %args.recipient,
        amount_base_units = amount,
        "submitted transfer"
    );
    output(&ledger::transfer_result(
        &response,
        token.name,
        tokens::to_human(amount, token.decimals),
        &args.recipient,
        args.memo.as_deref(),
    ));
    Ok(())
}
