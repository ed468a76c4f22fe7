use std::collections::HashMap;
use std::path::Path;

use serde_json::Value;

use crate::error::WalletError;

// Mainnet ledger canister, display name, decimal precision, default
// transfer fee (base units), and the CoinGecko id used for USD quotes.
#[derive(Debug, Clone, Copy)]
pub struct TokenInfo {
    pub symbol: &'static str,
    pub ledger: &'static str,
    pub name: &'static str,
    pub decimals: u32,
    pub fee: u128,
    pub coingecko_id: Option<&'static str>,
}

pub const TOKENS: &[TokenInfo] = &[
    TokenInfo {
        symbol: "ckbtc",
        ledger: "mxzaz-hqaaa-aaaar-qaada-cai",
        name: "ckBTC",
        decimals: 8,
        fee: 10,
        coingecko_id: Some("bitcoin"),
    },
    TokenInfo {
        symbol: "cketh",
        ledger: "ss2fx-dyaaa-aaaar-qacoq-cai",
        name: "ckETH",
        decimals: 18,
        fee: 2_000_000_000_000,
        coingecko_id: Some("ethereum"),
    },
    TokenInfo {
        symbol: "icp",
        ledger: "ryjl3-tyaaa-aaaaa-aaaba-cai",
        name: "ICP",
        decimals: 8,
        fee: 10_000,
        coingecko_id: Some("internet-computer"),
    },
    TokenInfo {
        symbol: "ckusdc",
        ledger: "xevnm-gaaaa-aaaar-qafnq-cai",
        name: "ckUSDC",
        decimals: 6,
        fee: 10_000,
        coingecko_id: Some("usd-coin"),
    },
    TokenInfo {
        symbol: "ckusdt",
        ledger: "cngnf-vqaaa-aaaar-qag4q-cai",
        name: "ckUSDT",
        decimals: 6,
        fee: 10_000,
        coingecko_id: Some("tether"),
    },
    // Custom token, no CoinGecko listing
    TokenInfo {
        symbol: "realms",
        ledger: "xbkkh-syaaa-aaaah-qq3ya-cai",
        name: "REALMS",
        decimals: 8,
        fee: 10_000,
        coingecko_id: None,
    },
];

pub fn lookup(symbol: &str) -> Result<&'static TokenInfo, WalletError> {
    TOKENS
        .iter()
        .find(|t| t.symbol == symbol)
        .ok_or_else(|| WalletError::UnknownToken(symbol.to_string()))
}

pub fn coingecko_ids() -> Vec<&'static str> {
    TOKENS.iter().filter_map(|t| t.coingecko_id).collect()
}

// A fractional string goes through float scaling and rounding; a plain
// integer string is taken as base units directly. "1" and "1.0" agree on
// any precision.
pub fn parse_amount(amount: &str, decimals: u32) -> Result<u128, WalletError> {
    let parsed = if amount.contains('.') {
        amount
            .parse::<f64>()
            .ok()
            .map(|v| (v * 10f64.powi(decimals as i32)).round())
            .filter(|v| v.is_finite() && *v >= 0.0)
            .map(|v| v as u128)
    } else {
        amount.parse::<u128>().ok()
    };
    parsed.ok_or_else(|| WalletError::InvalidAmount(amount.to_string()))
}

pub fn to_human(raw: u128, decimals: u32) -> f64 {
    raw as f64 / 10f64.powi(decimals as i32)
}

// Common canister names found in project files, mapped to token symbols.
const CANISTER_NAME_MAP: &[(&str, &str)] = &[
    ("ckbtc_ledger", "ckbtc"),
    ("ckbtc-ledger", "ckbtc"),
    ("ckbtc", "ckbtc"),
    ("cketh_ledger", "cketh"),
    ("cketh-ledger", "cketh"),
    ("cketh", "cketh"),
    ("icp_ledger", "icp"),
    ("icp-ledger", "icp"),
    ("ledger", "icp"),
    ("ckusdc_ledger", "ckusdc"),
    ("ckusdc-ledger", "ckusdc"),
    ("ckusdc", "ckusdc"),
    ("ckusdt_ledger", "ckusdt"),
    ("ckusdt-ledger", "ckusdt"),
    ("ckusdt", "ckusdt"),
    ("realms_ledger", "realms"),
    ("realms-ledger", "realms"),
    ("realms", "realms"),
    ("token_backend", "realms"),
];

fn token_for_canister_name(name: &str) -> Option<&'static str> {
    let lower = name.to_lowercase();
    CANISTER_NAME_MAP
        .iter()
        .find(|(n, _)| *n == lower)
        .map(|(_, token)| *token)
}

// Entries in canister_ids.json may be {"local": id} / {"ic": id} /
// {"canister_id": id} objects or bare strings.
pub fn collect_canister_ids(data: &Value) -> HashMap<String, String> {
    let mut canisters = HashMap::new();
    let Some(entries) = data.as_object() else {
        return canisters;
    };
    for (name, info) in entries {
        let Some(token) = token_for_canister_name(name) else {
            continue;
        };
        let id = match info {
            Value::String(s) => Some(s.clone()),
            Value::Object(obj) => ["local", "ic", "canister_id"]
                .iter()
                .find_map(|k| obj.get(*k).and_then(Value::as_str))
                .map(str::to_string),
            _ => None,
        };
        if let Some(id) = id {
            canisters.insert(token.to_string(), id);
        }
    }
    canisters
}

// Best effort: unreadable or malformed files are skipped.
pub fn detect_local_canisters(dir: &Path) -> HashMap<String, String> {
    let mut canisters = HashMap::new();
    for filename in ["canister_ids.json", ".dfx/local/canister_ids.json"] {
        let path = dir.join(filename);
        let Ok(text) = std::fs::read_to_string(&path) else {
            continue;
        };
        match serde_json::from_str::<Value>(&text) {
            Ok(data) => canisters.extend(collect_canister_ids(&data)),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "skipping malformed canister_ids.json");
            }
        }
    }
    canisters
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn registry_has_expected_tokens() {
        for symbol in ["ckbtc", "cketh", "icp", "ckusdc", "ckusdt", "realms"] {
            assert!(lookup(symbol).is_ok(), "missing {symbol}");
        }
        assert_eq!(lookup("ckbtc").unwrap().ledger, "mxzaz-hqaaa-aaaar-qaada-cai");
        assert_eq!(lookup("ckbtc").unwrap().decimals, 8);
        // stablecoins use 6 decimals
        assert_eq!(lookup("ckusdc").unwrap().decimals, 6);
        assert_eq!(lookup("ckusdt").unwrap().decimals, 6);
    }

    #[test]
    fn unknown_symbol_is_a_client_error() {
        let err = lookup("doge").unwrap_err();
        assert!(err.is_client_error());
        assert!(err.to_string().contains("doge"));
    }

    #[test]
    fn whole_and_fractional_amounts_agree() {
        assert_eq!(parse_amount("1", 8).unwrap(), 100_000_000);
        assert_eq!(parse_amount("1.0", 8).unwrap(), 100_000_000);
        assert_eq!(parse_amount("0.5", 8).unwrap(), 50_000_000);
        assert_eq!(parse_amount("0.29", 8).unwrap(), 29_000_000);
        assert_eq!(parse_amount("250", 6).unwrap(), 250);
    }

    #[test]
    fn bad_amounts_are_rejected() {
        assert!(parse_amount("abc", 8).is_err());
        assert!(parse_amount("-1.5", 8).is_err());
    }

    #[test]
    fn collects_ids_from_both_value_shapes() {
        let data = json!({
            "ckbtc_ledger": {"local": "bkyz2-fmaaa-aaaaa-qaaaq-cai"},
            "icp_ledger": {"local": "ryjl3-tyaaa-aaaaa-aaaba-cai"},
            "token_backend": "xbkkh-syaaa-aaaah-qq3ya-cai",
            "frontend": {"local": "ignored-cai"},
        });
        let ids = collect_canister_ids(&data);
        assert_eq!(ids.get("ckbtc").unwrap(), "bkyz2-fmaaa-aaaaa-qaaaq-cai");
        assert_eq!(ids.get("icp").unwrap(), "ryjl3-tyaaa-aaaaa-aaaba-cai");
        assert_eq!(ids.get("realms").unwrap(), "xbkkh-syaaa-aaaah-qq3ya-cai");
        assert!(!ids.contains_key("frontend"));
    }

    #[test]
    fn detection_is_empty_without_files() {
        let dir = std::env::temp_dir().join("icw-test-empty-dir");
        std::fs::create_dir_all(&dir).unwrap();
        assert!(detect_local_canisters(&dir).is_empty());
    }
}
