use std::path::Path;

use anyhow::Result;
use serde_json::Value;

use crate::{cli::Command, dfx::DfxClient, tokens, tokens::TokenInfo};

pub mod balance;
pub mod identity;
pub mod info;
pub mod mint;
pub mod transfer;
pub mod ui;

#[derive(Clone)]
pub struct CommandContext {
    pub dfx: DfxClient,
    pub token: String,
}

pub async fn run_command(command: Command, ctx: CommandContext) -> Result<()> {
    match command {
        Command::Balance(args) => balance::handle(args, &ctx).await,
        Command::Transfer(args) => transfer::handle(args, &ctx).await,
        Command::Mint(args) => mint::handle(args, &ctx).await,
        Command::Info(args) => info::handle(args, &ctx).await,
        Command::Id(args) => identity::handle(args, &ctx).await,
        Command::Ui(args) => ui::handle(args, &ctx).await,
    }
}

// Explicit override first, then local auto-detection when on the local
// network, then the mainnet default.
pub fn resolve_ledger(token: &TokenInfo, ledger_override: Option<&str>, network: &str) -> String {
    if let Some(ledger) = ledger_override {
        return ledger.to_string();
    }
    if network == "local"
        && let Some(id) = tokens::detect_local_canisters(Path::new(".")).get(token.symbol)
    {
        return id.clone();
    }
    token.ledger.to_string()
}

// Results go to stdout as pretty JSON; diagnostics go through tracing.
pub fn output(data: &Value) {
    match serde_json::to_string_pretty(data) {
        Ok(text) => println!("{text}"),
        Err(_) => println!("{data}"),
    }
}
