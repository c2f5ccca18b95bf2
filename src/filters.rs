//! Condition and sort vocabularies accepted by the search routes and
//! forwarded to the Finding API.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    New,
    OpenBox,
    Refurbished,
    Used,
    ForParts,
}

impl Condition {
    pub fn all() -> [Condition; 5] {
        [
            Condition::New,
            Condition::OpenBox,
            Condition::Refurbished,
            Condition::Used,
            Condition::ForParts,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::New => "new",
            Condition::OpenBox => "open_box",
            Condition::Refurbished => "refurbished",
            Condition::Used => "used",
            Condition::ForParts => "for_parts",
        }
    }

    /// eBay condition id
    pub fn ebay_id(&self) -> &'static str {
        match self {
            Condition::New => "1000",
            Condition::OpenBox => "1500",
            Condition::Refurbished => "2000",
            Condition::Used => "3000",
            Condition::ForParts => "7000",
        }
    }
}

impl FromStr for Condition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Condition::all()
            .into_iter()
            .find(|c| c.as_str() == lower)
            .ok_or_else(|| format!("Unknown condition: {}", s))
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    BestMatch,
    PriceAsc,
    PriceDesc,
    DateAsc,
    DateDesc,
}

impl SortOrder {
    pub fn all() -> [SortOrder; 5] {
        [
            SortOrder::BestMatch,
            SortOrder::PriceAsc,
            SortOrder::PriceDesc,
            SortOrder::DateAsc,
            SortOrder::DateDesc,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::BestMatch => "best_match",
            SortOrder::PriceAsc => "price_asc",
            SortOrder::PriceDesc => "price_desc",
            SortOrder::DateAsc => "date_asc",
            SortOrder::DateDesc => "date_desc",
        }
    }

    /// Value of the Finding API `sortOrder` parameter
    pub fn ebay_sort_order(&self) -> &'static str {
        match self {
            SortOrder::BestMatch => "BestMatch",
            SortOrder::PriceAsc => "PricePlusShippingLowest",
            SortOrder::PriceDesc => "PricePlusShippingHighest",
            SortOrder::DateAsc => "EndTimeSoonest",
            SortOrder::DateDesc => "StartTimeNewest",
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        SortOrder::all()
            .into_iter()
            .find(|o| o.as_str() == lower)
            .ok_or_else(|| format!("Unknown sort order: {}", s))
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
