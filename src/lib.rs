pub mod candid;
pub mod cli;
mod commands;
pub mod dfx;
pub mod error;
pub mod ledger;
pub mod normalize;
pub mod prices;
mod server;
pub mod tokens;

use anyhow::Result;
use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt;

use crate::{
    cli::Cli,
    commands::{CommandContext, run_command},
    dfx::DfxClient,
};

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    let max = match cli.global.verbose {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    fmt().with_max_level(max).without_time().try_init().ok();

    let context = CommandContext {
        dfx: DfxClient::new(cli.global.network.clone()),
        token: cli.global.token.clone(),
    };

    run_command(cli.command, context).await
}
