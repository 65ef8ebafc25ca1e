//! Bidirectional mapping between `ListState` and an opaque continue token.

use super::types::ListState;
use crate::error::{Error, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;

/// Encode a `ListState` into an opaque continue token.
///
/// Deterministic given the same input; the zero `ListState` encodes to the
/// empty string, meaning "no more pages".
pub fn encode(state: &ListState) -> String {
    if state.is_zero() {
        return String::new();
    }
    // `ListState::serialize` cannot fail: every field is a plain scalar.
    let json = serde_json::to_vec(state).expect("ListState always serializes");
    URL_SAFE_NO_PAD.encode(json)
}

/// Decode an opaque continue token into a `ListState`.
///
/// The empty string decodes to the zero `ListState`. Any framing or schema
/// error surfaces as a single `Error::MalformedToken`, a client-class error;
/// unknown fields in the payload are ignored so older clients remain
/// compatible with newer servers.
pub fn decode(token: &str) -> Result<ListState> {
    if token.is_empty() {
        return Ok(ListState::default());
    }
    let bytes = URL_SAFE_NO_PAD
        .decode(token)
        .map_err(|e| Error::malformed_token(format!("invalid base64: {e}")))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| Error::malformed_token(format!("invalid payload: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_zero_state_encodes_to_empty_string() {
        assert_eq!(encode(&ListState::default()), "");
    }

    #[test]
    fn test_empty_string_decodes_to_zero_state() {
        assert_eq!(decode("").unwrap(), ListState::default());
    }

    #[test_case(ListState::default(); "zero value")]
    #[test_case(ListState {
        revision: "100".into(),
        partition_name: "ns-a".into(),
        offset: 3,
        continue_token: String::new(),
        limit: 10,
    }; "mid partition")]
    #[test_case(ListState {
        revision: "200".into(),
        partition_name: "ns-b".into(),
        offset: 0,
        continue_token: "cursor-xyz".into(),
        limit: 50,
    }; "backend cursor set")]
    fn test_round_trip(state: ListState) {
        let token = encode(&state);
        assert_eq!(decode(&token).unwrap(), state);
    }

    #[test]
    fn test_malformed_base64_is_malformed_token_error() {
        let err = decode("not valid base64!!!").unwrap_err();
        assert!(matches!(err, Error::MalformedToken { .. }));
    }

    #[test]
    fn test_malformed_json_is_malformed_token_error() {
        let token = URL_SAFE_NO_PAD.encode(b"not json");
        let err = decode(&token).unwrap_err();
        assert!(matches!(err, Error::MalformedToken { .. }));
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let payload = serde_json::json!({"r": "100", "p": "ns-a", "future_field": 42});
        let token = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&payload).unwrap());
        let state = decode(&token).unwrap();
        assert_eq!(state.revision, "100");
        assert_eq!(state.partition_name, "ns-a");
    }

    #[test]
    fn test_encoding_omits_zero_fields() {
        let state = ListState {
            revision: "100".into(),
            partition_name: "ns-a".into(),
            offset: 0,
            continue_token: String::new(),
            limit: 10,
        };
        let token = encode(&state);
        let bytes = URL_SAFE_NO_PAD.decode(token).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(json.get("o").is_none());
        assert!(json.get("c").is_none());
    }
}
