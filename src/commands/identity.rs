use anyhow::{Context, Result, bail};
use serde_json::json;

use crate::cli::{IdAction, IdArgs};

use super::{CommandContext, output};

pub async fn handle(args: IdArgs, ctx: &CommandContext) -> Result<()> {
    match args.action {
        IdAction::List => {
            let current = ctx.dfx.whoami().await?;
            let identities: Vec<_> = ctx
                .dfx
                .list_identities()
                .await?
                .into_iter()
                .map(|name| json!({"active": name == current, "name": name}))
                .collect();
            output(&json!({"identities": identities, "current": current}));
        }
        IdAction::Use => {
            let name = args.name.context("identity name required: icw id use <name>")?;
            ctx.dfx.use_identity(&name).await?;
            let principal = ctx.dfx.principal().await?;
            output(&json!({"switched": name, "principal": principal}));
        }
        IdAction::New => {
            let Some(name) = args.name else {
                bail!("identity name required: icw id new <name>");
            };
            ctx.dfx.new_identity(&name).await?;
            output(&json!({"created": name}));
        }
        IdAction::Whoami => {
            let identity = ctx.dfx.whoami().await?;
            let principal = ctx.dfx.principal().await?;
            output(&json!({"identity": identity, "principal": principal}));
        }
    }
    Ok(())
}
