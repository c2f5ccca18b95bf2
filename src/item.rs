use serde::{Deserialize, Serialize};

/// One normalized marketplace listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub title: String,
    pub price: f64,
    pub currency: String,
    pub item_id: String,
    pub url: String,
    pub condition: String,
    pub listing_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sold_date: Option<String>,
}

impl Item {
    pub fn new(title: String, price: f64) -> Self {
        Self {
            title,
            price,
            currency: "USD".to_string(),
            item_id: String::new(),
            url: String::new(),
            condition: "Unknown".to_string(),
            listing_type: "Unknown".to_string(),
            sold_date: None,
        }
    }

    pub fn with_currency(mut self, currency: String) -> Self {
        self.currency = currency;
        self
    }

    pub fn with_item_id(mut self, item_id: String) -> Self {
        self.item_id = item_id;
        self
    }

    pub fn with_url(mut self, url: String) -> Self {
        self.url = url;
        self
    }

    pub fn with_condition(mut self, condition: String) -> Self {
        self.condition = condition;
        self
    }

    pub fn with_listing_type(mut self, listing_type: String) -> Self {
        self.listing_type = listing_type;
        self
    }

    pub fn with_sold_date(mut self, sold_date: String) -> Self {
        self.sold_date = Some(sold_date);
        self
    }

    /// Only items with a strictly positive price take part in statistics.
    pub fn has_valid_price(&self) -> bool {
        self.price > 0.0
    }
}
