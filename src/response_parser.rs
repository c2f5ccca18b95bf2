//! Normalization of Finding API search responses.
//!
//! The upstream JSON is an XML conversion: nearly every leaf is wrapped in a
//! single-element list, and the result envelope sits under a key named after
//! the operation. Malformed items are skipped one at a time; a missing
//! envelope or a non-success acknowledgement yields no items rather than an
//! error.

use crate::item::Item;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

pub const SOLD_ENVELOPE_KEY: &str = "findCompletedItemsResponse";
pub const ACTIVE_ENVELOPE_KEY: &str = "findItemsByKeywordsResponse";
const ACK_SUCCESS: &str = "Success";

#[derive(Debug, Error, PartialEq)]
pub enum ItemParseError {
    #[error("item is not a JSON object")]
    NotAnObject,
    #[error("missing sellingStatus/currentPrice")]
    MissingPrice,
    #[error("unparsable price value: {0}")]
    InvalidPrice(String),
}

/// Parsed items plus the number of raw records that were dropped.
#[derive(Debug, Clone, Default)]
pub struct ParseReport {
    pub items: Vec<Item>,
    pub skipped: usize,
}

pub fn envelope_key(sold: bool) -> &'static str {
    if sold {
        SOLD_ENVELOPE_KEY
    } else {
        ACTIVE_ENVELOPE_KEY
    }
}

/// Parse a raw search response into items, dropping malformed records.
pub fn parse_response(data: &Value, sold: bool) -> Vec<Item> {
    parse_response_report(data, sold).items
}

pub fn parse_response_report(data: &Value, sold: bool) -> ParseReport {
    let mut report = ParseReport::default();
    let key = envelope_key(sold);

    let Some(envelope) = data.get(key) else {
        warn!("Response missing expected key: {}", key);
        return report;
    };

    let Some(response) = unwrap_first(Some(envelope)) else {
        warn!("Response envelope {} is empty", key);
        return report;
    };

    let ack = field(response, "ack").and_then(Value::as_str);
    if ack != Some(ACK_SUCCESS) {
        warn!("eBay API returned non-success ack: {:?}", ack);
        return report;
    }

    let raw_items = field(response, "searchResult")
        .and_then(|result| result.get("item"))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    for raw in raw_items {
        match parse_item(raw, sold) {
            Ok(item) => report.items.push(item),
            Err(e) => {
                report.skipped += 1;
                debug!("Failed to parse item: {}", e);
            }
        }
    }

    if report.skipped > 0 {
        warn!("Failed to parse {} of {} items", report.skipped, raw_items.len());
    }

    report
}

/// Build one item from a raw record. Only the price path is mandatory.
pub fn parse_item(raw: &Value, sold: bool) -> Result<Item, ItemParseError> {
    if !raw.is_object() {
        return Err(ItemParseError::NotAnObject);
    }

    let current_price = field(raw, "sellingStatus")
        .and_then(|status| field(status, "currentPrice"))
        .ok_or(ItemParseError::MissingPrice)?;
    let price = parse_price(field(current_price, "__value__"))?;

    let condition = field(raw, "condition")
        .map(|c| text_or(c, "conditionDisplayName", "Unknown"))
        .unwrap_or_else(|| "Unknown".to_string());

    let listing_info = field(raw, "listingInfo");
    let listing_type = listing_info
        .map(|info| text_or(info, "listingType", "Unknown"))
        .unwrap_or_else(|| "Unknown".to_string());

    let mut item = Item::new(text_or(raw, "title", ""), price)
        .with_currency(text_or(current_price, "@currencyId", "USD"))
        .with_item_id(text_or(raw, "itemId", ""))
        .with_url(text_or(raw, "viewItemURL", ""))
        .with_condition(condition)
        .with_listing_type(listing_type);

    if sold {
        let end_time = listing_info
            .map(|info| text_or(info, "endTime", ""))
            .unwrap_or_default();
        item = item.with_sold_date(end_time);
    }

    Ok(item)
}

fn parse_price(value: Option<&Value>) -> Result<f64, ItemParseError> {
    let price = match value {
        None => return Ok(0.0),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| ItemParseError::InvalidPrice(s.clone()))?,
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| ItemParseError::InvalidPrice(n.to_string()))?,
        Some(other) => return Err(ItemParseError::InvalidPrice(other.to_string())),
    };

    if !price.is_finite() {
        return Err(ItemParseError::InvalidPrice(price.to_string()));
    }
    Ok(price)
}

/// Unwrap a list-wrapped value: absent or empty gives `None`, otherwise the
/// first element, descending once more if that element is itself a list.
/// Bare scalars pass through unchanged.
fn unwrap_first(value: Option<&Value>) -> Option<&Value> {
    let first = match value? {
        Value::Array(list) => list.first()?,
        other => return Some(other),
    };

    match first {
        Value::Array(inner) => inner.first(),
        other => Some(other),
    }
}

fn field<'a>(obj: &'a Value, key: &str) -> Option<&'a Value> {
    unwrap_first(obj.get(key))
}

fn text_or(obj: &Value, key: &str, default: &str) -> String {
    match field(obj, key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => default.to_string(),
    }
}
