// Candid textual argument construction for dfx canister call. Subaccounts
// and memos arrive as loosely-typed strings (an index, a hex dump, or a
// free-text tag) and leave as opt blob literals. Classification is an
// ordered sequence of guards; the order is part of the contract.

use crate::error::WalletError;

// ICRC-1 subaccounts are exactly 32 bytes; memos are capped at 32 bytes
// unpadded.
pub const SUBACCOUNT_LEN: usize = 32;
pub const MEMO_MAX_LEN: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlobInput {
    Absent,
    // 0-255 addressing the last byte of a 32-byte subaccount
    SmallInt(u8),
    Hex(Vec<u8>),
    Text(Vec<u8>),
}

// Precedence is fixed: absent, small integer, 64-char hex, free text. A
// short numeric string like "05" therefore always means subaccount index
// 5, never hex.
pub fn classify_subaccount(input: &str) -> Result<BlobInput, WalletError> {
    if input.is_empty() || input == "0" {
        return Ok(BlobInput::Absent);
    }

    if let Ok(n) = input.parse::<i64>()
        && (0..=255).contains(&n)
    {
        return Ok(BlobInput::SmallInt(n as u8));
    }

    if input.len() == 2 * SUBACCOUNT_LEN
        && let Ok(bytes) = hex::decode(input)
    {
        return Ok(BlobInput::Hex(bytes));
    }

    let raw = input.as_bytes();
    if raw.len() > SUBACCOUNT_LEN {
        return Err(WalletError::TooLong {
            what: "Subaccount text",
            len: raw.len(),
            max: SUBACCOUNT_LEN,
        });
    }
    Ok(BlobInput::Text(raw.to_vec()))
}

// Memos have no small-integer form: any non-empty even-length hex string
// up to 64 chars decodes to raw bytes, everything else is literal text.
pub fn classify_memo(input: &str) -> Result<BlobInput, WalletError> {
    if input.is_empty() {
        return Ok(BlobInput::Absent);
    }

    if input.len() % 2 == 0
        && input.len() <= 2 * MEMO_MAX_LEN
        && let Ok(bytes) = hex::decode(input)
    {
        return Ok(BlobInput::Hex(bytes));
    }

    let raw = input.as_bytes();
    if raw.len() > MEMO_MAX_LEN {
        return Err(WalletError::TooLong {
            what: "Memo",
            len: raw.len(),
            max: MEMO_MAX_LEN,
        });
    }
    Ok(BlobInput::Text(raw.to_vec()))
}

// null, or a 32-byte opt blob; text inputs are right-padded with zeros.
pub fn encode_subaccount(input: &str) -> Result<String, WalletError> {
    let bytes = match classify_subaccount(input)? {
        BlobInput::Absent => return Ok("null".to_string()),
        BlobInput::SmallInt(n) => {
            let mut buf = [0u8; SUBACCOUNT_LEN];
            buf[SUBACCOUNT_LEN - 1] = n;
            buf.to_vec()
        }
        BlobInput::Hex(bytes) => bytes,
        BlobInput::Text(mut raw) => {
            raw.resize(SUBACCOUNT_LEN, 0);
            raw
        }
    };
    Ok(opt_blob_literal(&bytes))
}

// null, or an opt blob whose length is exactly the input byte count.
pub fn encode_memo(input: &str) -> Result<String, WalletError> {
    let bytes = match classify_memo(input)? {
        BlobInput::Absent => return Ok("null".to_string()),
        BlobInput::SmallInt(_) => unreachable!("memos have no integer form"),
        BlobInput::Hex(bytes) | BlobInput::Text(bytes) => bytes,
    };
    Ok(opt_blob_literal(&bytes))
}

fn opt_blob_literal(bytes: &[u8]) -> String {
    let mut escaped = String::with_capacity(3 * bytes.len());
    for b in bytes {
        escaped.push_str(&format!("\\{b:02x}"));
    }
    format!("opt blob \"{escaped}\"")
}

pub fn balance_record(owner: &str, subaccount_literal: &str) -> String {
    format!("(record {{ owner = principal \"{owner}\"; subaccount = {subaccount_literal}; }})")
}

// Principal text is interpolated verbatim; callers pass well-formed
// principal identifiers.
pub fn transfer_record(
    recipient: &str,
    subaccount_literal: &str,
    amount: u128,
    fee: u128,
    memo_literal: &str,
    from_subaccount_literal: &str,
) -> String {
    format!(
        "(record {{ to = record {{ owner = principal \"{recipient}\"; subaccount = {subaccount_literal}; }}; \
amount = {amount}; fee = opt {fee}; memo = {memo_literal}; created_at_time = null; \
from_subaccount = {from_subaccount_literal}; }})"
    )
}

pub fn mint_record(recipient: &str, subaccount_literal: &str, amount: u128) -> String {
    format!(
        "(record {{ to = record {{ owner = principal \"{recipient}\"; subaccount = {subaccount_literal}; }}; \
amount = {amount} : nat }})"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blob_bytes(literal: &str) -> Vec<u8> {
        let inner = literal
            .strip_prefix("opt blob \"")
            .and_then(|s| s.strip_suffix('"'))
            .expect("not an opt blob literal");
        inner
            .split('\\')
            .filter(|s| !s.is_empty())
            .map(|pair| u8::from_str_radix(pair, 16).expect("bad escape"))
            .collect()
    }

    #[test]
    fn zero_and_empty_subaccounts_are_absent() {
        assert_eq!(encode_subaccount("").unwrap(), "null");
        assert_eq!(encode_subaccount("0").unwrap(), "null");
    }

    #[test]
    fn small_int_fills_last_byte() {
        for n in [1u8, 5, 42, 255] {
            let bytes = blob_bytes(&encode_subaccount(&n.to_string()).unwrap());
            assert_eq!(bytes.len(), SUBACCOUNT_LEN);
            assert_eq!(bytes[SUBACCOUNT_LEN - 1], n);
            assert!(bytes[..SUBACCOUNT_LEN - 1].iter().all(|b| *b == 0));
        }
    }

    #[test]
    fn leading_zero_integer_beats_hex_reading() {
        // "05" is two valid hex chars, but the integer guard runs first.
        assert_eq!(classify_subaccount("05").unwrap(), BlobInput::SmallInt(5));
    }

    #[test]
    fn full_hex_subaccount_round_trips() {
        let raw: Vec<u8> = (0u8..32).collect();
        let hex_str = hex::encode(&raw);
        let bytes = blob_bytes(&encode_subaccount(&hex_str).unwrap());
        assert_eq!(bytes, raw);
    }

    #[test]
    fn hex_detection_is_case_insensitive() {
        let upper = "AB".repeat(32);
        let bytes = blob_bytes(&encode_subaccount(&upper).unwrap());
        assert_eq!(bytes, vec![0xabu8; 32]);
    }

    #[test]
    fn text_subaccount_is_zero_padded() {
        let bytes = blob_bytes(&encode_subaccount("savings").unwrap());
        assert_eq!(bytes.len(), SUBACCOUNT_LEN);
        assert_eq!(&bytes[..7], b"savings");
        assert!(bytes[7..].iter().all(|b| *b == 0));
    }

    #[test]
    fn out_of_range_integer_falls_through_to_text() {
        let bytes = blob_bytes(&encode_subaccount("256").unwrap());
        assert_eq!(&bytes[..3], b"256");
        assert_eq!(bytes.len(), SUBACCOUNT_LEN);
    }

    #[test]
    fn long_text_fails_instead_of_truncating() {
        let long = "a".repeat(33);
        let err = encode_subaccount(&long).unwrap_err();
        match err {
            WalletError::TooLong { len, max, .. } => {
                assert_eq!(len, 33);
                assert_eq!(max, 32);
            }
            other => panic!("expected TooLong, got {other}"),
        }
        assert!(matches!(
            encode_memo(&long).unwrap_err(),
            WalletError::TooLong { len: 33, .. }
        ));
    }

    #[test]
    fn empty_memo_is_absent() {
        assert_eq!(encode_memo("").unwrap(), "null");
    }

    #[test]
    fn hex_memo_decodes_without_padding() {
        let bytes = blob_bytes(&encode_memo("0a1b2c3d").unwrap());
        assert_eq!(bytes, vec![0x0a, 0x1b, 0x2c, 0x3d]);
    }

    #[test]
    fn odd_length_hexish_memo_is_text() {
        // "abc" is all hex chars but odd length, so it stays literal text.
        let bytes = blob_bytes(&encode_memo("abc").unwrap());
        assert_eq!(bytes, b"abc");
    }

    #[test]
    fn text_memo_is_unpadded() {
        let bytes = blob_bytes(&encode_memo("invoice_123").unwrap());
        assert_eq!(bytes, b"invoice_123");
    }

    #[test]
    fn transfer_record_shape() {
        let record = transfer_record(
            "aaaaa-aa",
            "null",
            100_000_000,
            10,
            "null",
            "null",
        );
        assert_eq!(
            record,
            "(record { to = record { owner = principal \"aaaaa-aa\"; subaccount = null; }; \
amount = 100000000; fee = opt 10; memo = null; created_at_time = null; \
from_subaccount = null; })"
        );
    }

    #[test]
    fn mint_record_shape() {
        let record = mint_record("aaaaa-aa", "null", 500);
        assert_eq!(
            record,
            "(record { to = record { owner = principal \"aaaaa-aa\"; subaccount = null; }; amount = 500 : nat })"
        );
    }
}
