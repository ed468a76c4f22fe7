use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "icw",
    version,
    about = "ICP wallet CLI for ICRC-1 tokens (ckBTC, ckETH, ICP, ckUSDC, ckUSDT)"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug)]
pub struct GlobalOpts {
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[arg(
        short,
        long,
        default_value = "ic",
        help = "Network to talk to (ic or local)"
    )]
    pub network: String,

    #[arg(short, long, default_value = "ckbtc", help = "Token symbol")]
    pub token: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(visible_alias = "b", about = "Query a token balance with USD value")]
    Balance(BalanceArgs),
    #[command(visible_alias = "t", about = "Transfer tokens to a principal")]
    Transfer(TransferArgs),
    #[command(
        visible_alias = "m",
        about = "Mint tokens (NON-STANDARD: requires a canister with a 'mint' method)"
    )]
    Mint(MintArgs),
    #[command(visible_alias = "i", about = "Show token info and USD price")]
    Info(InfoArgs),
    #[command(about = "Identity management")]
    Id(IdArgs),
    #[command(about = "Launch the local web UI")]
    Ui(UiArgs),
}

#[derive(Args, Debug)]
pub struct BalanceArgs {
    #[arg(short, long, help = "Principal to query (default: own principal)")]
    pub principal: Option<String>,

    #[arg(short, long, default_value = "0", help = "Subaccount: index, 64-char hex, or text")]
    pub subaccount: String,

    #[arg(short, long, help = "Override ledger canister ID")]
    pub ledger: Option<String>,

    #[arg(short, long, help = "dfx identity to use (temporarily switches)")]
    pub identity: Option<String>,
}

#[derive(Args, Debug)]
pub struct TransferArgs {
    #[arg(help = "Recipient principal")]
    pub recipient: String,

    #[arg(help = "Amount in whole tokens (with '.') or base units")]
    pub amount: String,

    #[arg(short, long, default_value = "0", help = "Recipient subaccount")]
    pub subaccount: String,

    #[arg(short, long, default_value = "0", help = "Source subaccount")]
    pub from_subaccount: String,

    #[arg(short, long, help = "Override ledger canister ID")]
    pub ledger: Option<String>,

    #[arg(long, help = "Override transfer fee (base units)")]
    pub fee: Option<u128>,

    #[arg(short, long, help = "Transaction memo/tag (max 32 bytes)")]
    pub memo: Option<String>,

    #[arg(short, long, help = "dfx identity to use (temporarily switches)")]
    pub identity: Option<String>,
}

#[derive(Args, Debug)]
pub struct MintArgs {
    #[arg(help = "Amount in whole tokens (with '.') or base units")]
    pub amount: String,

    #[arg(short, long, help = "Recipient principal (default: self)")]
    pub recipient: Option<String>,

    #[arg(short, long, default_value = "0", help = "Recipient subaccount")]
    pub subaccount: String,

    #[arg(short, long, help = "Override ledger canister ID")]
    pub ledger: Option<String>,
}

#[derive(Args, Debug)]
pub struct InfoArgs {}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum IdAction {
    List,
    Use,
    New,
    Whoami,
}

#[derive(Args, Debug)]
pub struct IdArgs {
    #[arg(value_enum, default_value = "whoami")]
    pub action: IdAction,

    #[arg(help = "Identity name (for use/new)")]
    pub name: Option<String>,
}

#[derive(Args, Debug)]
pub struct UiArgs {
    #[arg(short, long, default_value_t = 5555, help = "Port to serve on")]
    pub port: u16,

    #[arg(long, help = "Don't open the browser")]
    pub no_browser: bool,

    #[arg(long, help = "ckBTC ledger canister ID (for local)")]
    pub ckbtc_ledger: Option<String>,

    #[arg(long, help = "ckETH ledger canister ID (for local)")]
    pub cketh_ledger: Option<String>,

    #[arg(long, help = "ICP ledger canister ID (for local)")]
    pub icp_ledger: Option<String>,

    #[arg(long, help = "ckUSDC ledger canister ID (for local)")]
    pub ckusdc_ledger: Option<String>,

    #[arg(long, help = "ckUSDT ledger canister ID (for local)")]
    pub ckusdt_ledger: Option<String>,

    #[arg(long, help = "REALMS ledger canister ID (for local)")]
    pub realms_ledger: Option<String>,
}
