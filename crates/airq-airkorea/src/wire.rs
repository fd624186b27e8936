//! Helpers for the service's JSON envelope and its string-encoded numbers.

use serde::{Deserialize, Deserializer};

use crate::error::AirQualityError;

/// Result code the service reports for a normal response
const RESULT_OK: &str = "00";

#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    response: ResponseBody<T>,
}

#[derive(Debug, Deserialize)]
struct ResponseBody<T> {
    header: ResponseHeader,
    body: Option<ItemsBody<T>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseHeader {
    result_code: String,
    #[serde(default)]
    result_msg: String,
}

#[derive(Debug, Deserialize)]
struct ItemsBody<T> {
    items: Option<Vec<T>>,
}

impl<T> Envelope<T> {
    /// Unwrap the item list, turning a non-success result code into a
    /// transport error.
    pub(crate) fn into_items(self) -> Result<Vec<T>, AirQualityError> {
        let header = self.response.header;
        if header.result_code != RESULT_OK {
            return Err(AirQualityError::transport(format!(
                "service returned {}: {}",
                header.result_code, header.result_msg
            )));
        }
        Ok(self
            .response
            .body
            .and_then(|b| b.items)
            .unwrap_or_default())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Str(String),
    Num(serde_json::Number),
}

/// Accept `"12"`, `12`, `null` or a missing field as an optional string.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<StringOrNumber>::deserialize(deserializer)?.map(|v| match v {
            StringOrNumber::Str(s) => s,
            StringOrNumber::Num(n) => n.to_string(),
        }),
    )
}

/// Parse a wire value. Blank, `"-"` and non-numeric values are missing.
pub(crate) fn parse_number(raw: Option<&str>) -> Option<f64> {
    let raw = raw?.trim();
    if raw.is_empty() || raw == "-" {
        return None;
    }
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}
