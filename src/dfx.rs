// Subprocess wrapper around the external dfx tool. dfx owns identities,
// keys and the wire protocol; nonzero exits surface the raw stderr, never
// retried here.

use std::io::ErrorKind;
use std::process::Output;

use serde_json::Value;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::WalletError;
use crate::normalize::normalize_candid_response;

#[derive(Debug, Clone)]
pub struct DfxClient {
    network: String,
}

impl DfxClient {
    pub fn new(network: impl Into<String>) -> Self {
        Self {
            network: network.into(),
        }
    }

    pub fn network(&self) -> &str {
        &self.network
    }

    // Call a canister method and return the normalized JSON result. When
    // dfx prints something other than JSON despite --output json, the
    // trimmed text comes back as a JSON string.
    pub async fn canister_call(
        &self,
        canister: &str,
        method: &str,
        arg: &str,
    ) -> Result<Value, WalletError> {
        let output = self
            .run(&[
                "canister",
                "call",
                canister,
                method,
                arg,
                "--network",
                &self.network,
                "--output",
                "json",
            ])
            .await?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        match serde_json::from_str::<Value>(&stdout) {
            Ok(value) => Ok(normalize_candid_response(value)),
            Err(_) => Ok(Value::String(clean_text_output(&stdout))),
        }
    }

    pub async fn whoami(&self) -> Result<String, WalletError> {
        let output = self.run(&["identity", "whoami"]).await?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    pub async fn principal(&self) -> Result<String, WalletError> {
        let output = self.run(&["identity", "get-principal"]).await?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    pub async fn list_identities(&self) -> Result<Vec<String>, WalletError> {
        let output = self.run(&["identity", "list"]).await?;
        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    pub async fn use_identity(&self, name: &str) -> Result<(), WalletError> {
        self.run(&["identity", "use", name]).await.map(|_| ())
    }

    pub async fn new_identity(&self, name: &str) -> Result<(), WalletError> {
        self.run(&["identity", "new", name]).await.map(|_| ())
    }

    // Returns the identity to hand back to restore_identity afterwards.
    pub async fn switch_identity(&self, name: &str) -> Result<Option<String>, WalletError> {
        let current = self.whoami().await?;
        if current == name {
            return Ok(None);
        }
        self.use_identity(name).await?;
        Ok(Some(current))
    }

    // Restore failures are logged, not propagated, so they cannot mask the
    // result of the operation that ran under the temporary identity.
    pub async fn restore_identity(&self, previous: Option<String>) {
        if let Some(name) = previous
            && let Err(e) = self.use_identity(&name).await
        {
            warn!(identity = %name, error = %e, "failed to restore dfx identity");
        }
    }

    async fn run(&self, args: &[&str]) -> Result<Output, WalletError> {
        debug!(?args, "running dfx");
        let output = Command::new("dfx")
            .args(args)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == ErrorKind::NotFound {
                    WalletError::DfxNotFound
                } else {
                    WalletError::DfxFailed(e.to_string())
                }
            })?;
        if !output.status.success() {
            return Err(WalletError::DfxFailed(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        Ok(output)
    }
}

// dfx sometimes prints quoted text with _ digit separators even under
// --output json; strip both so callers can parse numbers.
fn clean_text_output(raw: &str) -> String {
    raw.trim().replace(['_', '"'], "")
}

// A nat in a dfx JSON result: a plain number, or a string with optional
// _ separators.
pub fn parse_nat(value: &Value) -> Option<u128> {
    match value {
        Value::Number(n) => n.as_u64().map(u128::from),
        Value::String(s) => s.replace('_', "").parse().ok(),
        _ => None,
    }
}
