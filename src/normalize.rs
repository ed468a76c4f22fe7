// When dfx cannot find a .did file it falls back to numeric field hashes
// in its JSON output; the known ones are rewritten back to field names so
// callers (and the web UI) see stable keys.

use serde_json::Value;

// Known Candid field hashes, as dfx prints them (underscore-grouped decimal).
pub const CANDID_HASH_MAP: &[(&str, &str)] = &[
    // MintResult fields
    ("3_092_129_219", "success"),
    ("624_086_880", "block_index"),
    ("2_825_987_837", "new_balance"),
    ("1_932_118_984", "error"),
];

fn field_name(key: &str) -> Option<&'static str> {
    CANDID_HASH_MAP
        .iter()
        .find(|(hash, _)| *hash == key)
        .map(|(_, name)| *name)
}

// Unknown keys and scalars pass through untouched; the rewrite is
// idempotent since no field name is itself a hash code.
pub fn normalize_candid_response(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| {
                    let key = field_name(&k).map(str::to_string).unwrap_or(k);
                    (key, normalize_candid_response(v))
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(
            items.into_iter().map(normalize_candid_response).collect(),
        ),
        scalar => scalar,
    }
}
