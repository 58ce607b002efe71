//! Wire format of the `ForecastSpaceData` JSON response.

use crate::forecast::error::ForecastError;
use crate::types::loose_string::loose_string;
use serde::Deserialize;

/// One forecast slice: a single category value for one forecast time.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastItem {
    #[serde(deserialize_with = "loose_string")]
    pub base_date: String,
    #[serde(deserialize_with = "loose_string")]
    pub base_time: String,
    #[serde(deserialize_with = "loose_string")]
    pub fcst_date: String,
    #[serde(deserialize_with = "loose_string")]
    pub fcst_time: String,
    pub category: String,
    #[serde(deserialize_with = "loose_string")]
    pub fcst_value: String,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    response: ResponseBlock,
}

#[derive(Debug, Deserialize)]
struct ResponseBlock {
    header: Option<Header>,
    body: Option<Body>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Header {
    #[serde(deserialize_with = "loose_string")]
    result_code: String,
    #[serde(default)]
    result_msg: String,
}

#[derive(Debug, Deserialize)]
struct Body {
    #[serde(default)]
    items: Option<Items>,
}

// An empty result is sent as `"items": ""` or as an object without `item`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Items {
    List {
        #[serde(default)]
        item: Option<OneOrMany>,
    },
    Empty(String),
}

// A single result is sent as an object rather than a one-element list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<ForecastItem>),
    One(ForecastItem),
}

const OK_RESULT_CODE: &str = "00";

/// Parses a forecast response body into its items.
pub fn parse_forecast_items(bytes: &[u8]) -> Result<Vec<ForecastItem>, ForecastError> {
    let envelope: Envelope = serde_json::from_slice(bytes)?;
    let response = envelope.response;

    if let Some(header) = response.header {
        if header.result_code != OK_RESULT_CODE {
            return Err(ForecastError::Api {
                code: header.result_code,
                message: header.result_msg,
            });
        }
    }

    Ok(match response.body.and_then(|b| b.items) {
        Some(Items::List {
            item: Some(OneOrMany::Many(items)),
        }) => items,
        Some(Items::List {
            item: Some(OneOrMany::One(item)),
        }) => vec![item],
        Some(Items::List { item: None }) | Some(Items::Empty(_)) | None => Vec::new(),
    })
}
