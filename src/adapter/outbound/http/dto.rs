//! Wire types for the venue HTTP API.

use serde::{Deserialize, Deserializer, Serialize};

/// Amounts arrive either as JSON numbers or decimal strings.
pub(super) fn amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct QuoteResponse {
    #[serde(deserialize_with = "amount")]
    pub out_amount: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SwapRequest<'a> {
    pub user_public_key: &'a str,
    pub routes: Vec<&'a serde_json::Value>,
    pub simulate: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SwapResponse {
    pub success: bool,
    #[serde(default)]
    pub txid: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct BalanceResponse {
    #[serde(deserialize_with = "amount")]
    pub amount: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_accepts_string_amount() {
        let q: QuoteResponse = serde_json::from_str(r#"{"outAmount":"12345","routePlan":[]}"#).unwrap();
        assert_eq!(q.out_amount, 12_345);
    }

    #[test]
    fn test_balance_accepts_number() {
        let b: BalanceResponse = serde_json::from_str(r#"{"amount":42}"#).unwrap();
        assert_eq!(b.amount, 42);
    }

    #[test]
    fn test_bad_amount_is_an_error() {
        assert!(serde_json::from_str::<BalanceResponse>(r#"{"amount":"x"}"#).is_err());
    }
}
