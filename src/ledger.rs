// Ledger operations shared by the CLI commands and the web API.

use serde_json::{Value, json};

use crate::candid::{balance_record, encode_memo, encode_subaccount, mint_record, transfer_record};
use crate::dfx::{DfxClient, parse_nat};
use crate::error::WalletError;

pub async fn fetch_balance(
    dfx: &DfxClient,
    ledger: &str,
    owner: &str,
    subaccount: &str,
) -> Result<u128, WalletError> {
    let record = balance_record(owner, &encode_subaccount(subaccount)?);
    let response = dfx.canister_call(ledger, "icrc1_balance_of", &record).await?;
    balance_from_response(&response)
}

// An empty or absent result counts as zero; anything else that is not a
// nat is an upstream failure, never a zero balance.
fn balance_from_response(response: &Value) -> Result<u128, WalletError> {
    if let Some(raw) = parse_nat(response) {
        return Ok(raw);
    }
    if response.is_null() || response.as_str().is_some_and(str::is_empty) {
        return Ok(0);
    }
    Err(WalletError::DfxFailed(format!(
        "unparseable balance response: {response}"
    )))
}

// Subaccounts and memo are the raw user inputs; encoding happens in
// transfer() so a too-long value fails before any subprocess runs.
#[derive(Debug, Clone)]
pub struct TransferCall {
    pub recipient: String,
    pub amount: u128,
    pub fee: u128,
    pub subaccount: String,
    pub from_subaccount: String,
    pub memo: String,
}

pub async fn transfer(
    dfx: &DfxClient,
    ledger: &str,
    call: &TransferCall,
) -> Result<Value, WalletError> {
    let record = transfer_record(
        &call.recipient,
        &encode_subaccount(&call.subaccount)?,
        call.amount,
        call.fee,
        &encode_memo(&call.memo)?,
        &encode_subaccount(&call.from_subaccount)?,
    );
    dfx.canister_call(ledger, "icrc1_transfer", &record).await
}

// Mint responses usually arrive with hash-coded field names since no .did
// file ships for custom mints; the dfx wrapper normalizes them first.
pub async fn mint(
    dfx: &DfxClient,
    ledger: &str,
    recipient: &str,
    subaccount: &str,
    amount: u128,
) -> Result<Value, WalletError> {
    let record = mint_record(recipient, &encode_subaccount(subaccount)?, amount);
    dfx.canister_call(ledger, "mint", &record).await
}

pub fn transfer_result(
    response: &Value,
    token_name: &str,
    amount_human: f64,
    recipient: &str,
    memo: Option<&str>,
) -> Value {
    if let Some(block) = response.get("Ok") {
        let mut result = json!({
            "ok": true,
            "block": block,
            "token": token_name,
            "amount": amount_human,
            "to": recipient,
        });
        if let Some(memo) = memo.filter(|m| !m.is_empty()) {
            result["memo"] = json!(memo);
        }
        return result;
    }
    if let Some(err) = response.get("Err") {
        return json!({"ok": false, "error": err});
    }
    json!({"result": response})
}

pub fn mint_result(response: &Value, token_name: &str, amount_human: f64, recipient: &str) -> Value {
    if response.get("success").and_then(Value::as_bool) == Some(true) {
        return json!({
            "ok": true,
            "block": response.get("block_index"),
            "token": token_name,
            "amount": amount_human,
            "to": recipient,
            "new_balance": response.get("new_balance"),
        });
    }
    // Candid opt none arrives as null or an empty array; neither is an error.
    if let Some(err) = response
        .get("error")
        .filter(|e| !e.is_null() && e.as_array().is_none_or(|a| !a.is_empty()))
    {
        return json!({"ok": false, "error": err});
    }
    json!({"result": response})
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balance_parses_numbers_and_separator_strings() {
        assert_eq!(balance_from_response(&json!(42)).unwrap(), 42);
        assert_eq!(
            balance_from_response(&json!("100_000_000")).unwrap(),
            100_000_000
        );
    }

    #[test]
    fn empty_balance_response_is_zero() {
        assert_eq!(balance_from_response(&Value::Null).unwrap(), 0);
        assert_eq!(balance_from_response(&json!("")).unwrap(), 0);
    }

    #[test]
    fn unparseable_balance_response_is_an_error_not_zero() {
        // The text fallback keeps dfx's candid framing when stdout is not
        // JSON; that must surface as a failure, never as balance 0.
        let err = balance_from_response(&json!("(1000000 : nat)")).unwrap_err();
        assert!(matches!(err, WalletError::DfxFailed(_)));
        assert!(err.to_string().contains("(1000000 : nat)"));

        let err = balance_from_response(&json!({"Err": "boom"})).unwrap_err();
        assert!(matches!(err, WalletError::DfxFailed(_)));
    }

    #[test]
    fn successful_transfer_shape() {
        let result = transfer_result(&json!({"Ok": "17"}), "ckBTC", 0.5, "aaaaa-aa", None);
        assert_eq!(result["ok"], json!(true));
        assert_eq!(result["block"], json!("17"));
        assert_eq!(result["to"], json!("aaaaa-aa"));
        assert!(result.get("memo").is_none());
    }

    #[test]
    fn transfer_memo_is_echoed_when_present() {
        let result = transfer_result(
            &json!({"Ok": "17"}),
            "ckBTC",
            0.5,
            "aaaaa-aa",
            Some("invoice_123"),
        );
        assert_eq!(result["memo"], json!("invoice_123"));
    }

    #[test]
    fn failed_transfer_carries_the_ledger_error() {
        let response = json!({"Err": {"InsufficientFunds": {"balance": "0"}}});
        let result = transfer_result(&response, "ckBTC", 0.5, "aaaaa-aa", None);
        assert_eq!(result["ok"], json!(false));
        assert_eq!(result["error"], response["Err"]);
    }

    #[test]
    fn unrecognized_transfer_response_is_echoed() {
        let result = transfer_result(&json!("(variant ...)"), "ckBTC", 0.5, "aaaaa-aa", None);
        assert_eq!(result["result"], json!("(variant ...)"));
    }

    #[test]
    fn mint_success_reads_normalized_fields() {
        let response = json!({
            "success": true,
            "block_index": ["1"],
            "new_balance": ["100_000_000"],
        });
        let result = mint_result(&response, "REALMS", 1.0, "aaaaa-aa");
        assert_eq!(result["ok"], json!(true));
        assert_eq!(result["block"], json!(["1"]));
        assert_eq!(result["new_balance"], json!(["100_000_000"]));
    }

    #[test]
    fn mint_absent_error_opt_is_not_an_error() {
        let result = mint_result(&json!({"success": false, "error": []}), "REALMS", 1.0, "aaaaa-aa");
        assert!(result.get("result").is_some());
    }

    #[test]
    fn mint_error_is_reported() {
        let result = mint_result(&json!({"error": "not authorized"}), "REALMS", 1.0, "aaaaa-aa");
        assert_eq!(result["ok"], json!(false));
        assert_eq!(result["error"], json!("not authorized"));
    }
}
