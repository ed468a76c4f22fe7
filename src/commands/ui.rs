use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;
use tracing::info;

use crate::{cli::UiArgs, server, tokens};

use super::CommandContext;

pub async fn handle(args: UiArgs, ctx: &CommandContext) -> Result<()> {
    let mut ledgers = if ctx.dfx.network() == "local" {
        tokens::detect_local_canisters(Path::new("."))
    } else {
        HashMap::new()
    };

    let flags = [
        ("ckbtc", &args.ckbtc_ledger),
        ("cketh", &args.cketh_ledger),
        ("icp", &args.icp_ledger),
        ("ckusdc", &args.ckusdc_ledger),
        ("ckusdt", &args.ckusdt_ledger),
        ("realms", &args.realms_ledger),
    ];
    for (symbol, flag) in flags {
        if let Some(id) = flag {
            ledgers.insert(symbol.to_string(), id.clone());
        }
    }

    if !ledgers.is_empty() {
        info!(?ledgers, "using ledger canister overrides");
    }

    server::run(args.port, !args.no_browser, ctx.dfx.clone(), ledgers).await
}
