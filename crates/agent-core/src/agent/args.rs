use serde_json::{Map, Value};

/// Key used when a raw argument payload degrades to a single free-text query.
pub const QUERY_KEY: &str = "query";

/// Normalizes a tool-call argument payload into a well-formed argument map.
///
/// Total by contract: malformed input degrades to a best-effort map instead of
/// aborting the loop.
/// - An object passes through unchanged.
/// - A string is parsed as strict JSON; if that yields an object, use it.
///   Otherwise strip one layer of surrounding quotes and wrap it as
///   `{"query": <string>}` (most malformed payloads are one free-text query).
/// - Anything else stringifies into `{"query": <stringified>}`.
pub fn normalize_args(raw: &Value) -> Map<String, Value> {
    match raw {
        Value::Object(map) => map.clone(),
        Value::String(s) => {
            if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(s) {
                return map;
            }
            query_map(strip_quote_layer(s))
        }
        Value::Null => query_map(""),
        other => query_map(other.to_string()),
    }
}

fn query_map(query: impl Into<String>) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert(QUERY_KEY.to_string(), Value::String(query.into()));
    map
}

/// Strips a single layer of matching surrounding quote characters.
fn strip_quote_layer(s: &str) -> &str {
    let bytes = s.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'"' || first == b'\'') {
            return &s[1..s.len() - 1];
        }
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn object_passes_through() {
        let raw = json!({"q": "x", "limit": 3});
        let got = normalize_args(&raw);
        assert_eq!(Value::Object(got), raw);
    }

    #[test]
    fn json_string_decodes_to_map() {
        let got = normalize_args(&json!("{\"q\":\"x\"}"));
        assert_eq!(got.get("q"), Some(&json!("x")));
        assert_eq!(got.len(), 1);
    }

    #[test]
    fn plain_string_wraps_as_query() {
        let got = normalize_args(&json!("paris"));
        assert_eq!(got.get(QUERY_KEY), Some(&json!("paris")));
    }

    #[test]
    fn quoted_string_loses_one_quote_layer() {
        let got = normalize_args(&json!("\"paris\""));
        assert_eq!(got.get(QUERY_KEY), Some(&json!("paris")));

        let got = normalize_args(&json!("'paris'"));
        assert_eq!(got.get(QUERY_KEY), Some(&json!("paris")));

        // Only one layer comes off.
        let got = normalize_args(&json!("''paris''"));
        assert_eq!(got.get(QUERY_KEY), Some(&json!("'paris'")));
    }

    #[test]
    fn json_string_that_is_not_an_object_degrades_to_query() {
        // Parses as a JSON number, which is not an argument map.
        let got = normalize_args(&json!("42"));
        assert_eq!(got.get(QUERY_KEY), Some(&json!("42")));

        let got = normalize_args(&json!("[1,2]"));
        assert_eq!(got.get(QUERY_KEY), Some(&json!("[1,2]")));
    }

    #[test]
    fn non_string_non_object_stringifies() {
        let got = normalize_args(&json!(42));
        assert_eq!(got.get(QUERY_KEY), Some(&json!("42")));

        let got = normalize_args(&json!(true));
        assert_eq!(got.get(QUERY_KEY), Some(&json!("true")));

        let got = normalize_args(&Value::Null);
        assert_eq!(got.get(QUERY_KEY), Some(&json!("")));
    }

    #[test]
    fn empty_string_wraps_as_empty_query() {
        let got = normalize_args(&json!(""));
        assert_eq!(got.get(QUERY_KEY), Some(&json!("")));
    }
}
