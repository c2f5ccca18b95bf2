//! Canned Finding API payloads shared by unit tests.

use serde_json::{json, Value};

pub fn finding_item(id: &str, title: &str, price: &str, condition: &str, listing_type: &str, end_time: Option<&str>) -> Value {
    let mut listing_info = json!({ "listingType": [listing_type] });
    if let Some(end_time) = end_time {
        listing_info["endTime"] = json!([end_time]);
    }

    json!({
        "itemId": [id],
        "title": [title],
        "viewItemURL": [format!("https://www.ebay.com/itm/{}", id)],
        "condition": [{ "conditionDisplayName": [condition] }],
        "sellingStatus": [{
            "currentPrice": [{ "@currencyId": "USD", "__value__": price }]
        }],
        "listingInfo": [listing_info]
    })
}

pub fn envelope(key: &str, items: Vec<Value>) -> Value {
    json!({
        key: [{
            "ack": ["Success"],
            "searchResult": [{
                "@count": items.len().to_string(),
                "item": items
            }]
        }]
    })
}

pub fn sold_response() -> Value {
    envelope(
        "findCompletedItemsResponse",
        vec![
            finding_item("123456789", "Nintendo Switch Console", "250.00", "Used", "Auction", Some("2024-01-15T10:30:00.000Z")),
            finding_item("987654321", "Nintendo Switch with Games", "300.00", "Used", "FixedPrice", Some("2024-01-14T08:00:00.000Z")),
            finding_item("555555555", "Nintendo Switch Lite", "180.00", "New", "FixedPrice", Some("2024-01-13T12:00:00.000Z")),
        ],
    )
}

pub fn active_response() -> Value {
    envelope(
        "findItemsByKeywordsResponse",
        vec![
            finding_item("111111111", "Nintendo Switch Console New", "320.00", "New", "FixedPrice", None),
            finding_item("222222222", "Nintendo Switch Bundle", "280.00", "Used", "Auction", None),
        ],
    )
}
