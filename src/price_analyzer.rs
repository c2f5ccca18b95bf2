//! Price statistics over search results and the sold-vs-active comparison.

use crate::item::Item;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Summary statistics over the positively priced items of a search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceStats {
    pub count: usize,
    pub average: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub std_dev: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recommendation {
    /// Sold prices run below the current asking prices.
    Underpriced,
    Overpriced,
    Fair,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceComparison {
    pub avg_price_difference: f64,
    pub avg_price_difference_percent: f64,
    pub recommendation: Recommendation,
}

/// Round to `decimals` places, ties to even (10.125 -> 10.12).
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

/// Compute price statistics, or `None` when no item has a positive price.
pub fn calculate_price_stats(items: &[Item]) -> Option<PriceStats> {
    let mut prices: Vec<f64> = items
        .iter()
        .filter(|item| item.has_valid_price())
        .map(|item| item.price)
        .collect();

    if prices.is_empty() {
        return None;
    }

    prices.sort_by(|a, b| a.total_cmp(b));

    let count = prices.len();
    let mid = count / 2;
    let median = if count % 2 == 0 {
        (prices[mid - 1] + prices[mid]) / 2.0
    } else {
        prices[mid]
    };

    // A single sample has no sample variance; report zero spread.
    let std_dev = if count > 1 {
        round_to(prices.iter().std_dev(), 2)
    } else {
        0.0
    };

    Some(PriceStats {
        count,
        average: round_to(prices.iter().mean(), 2),
        median: round_to(median, 2),
        min: round_to(prices[0], 2),
        max: round_to(prices[count - 1], 2),
        std_dev,
    })
}

/// Compare sold against active statistics. `None` if either side is missing.
pub fn compare_prices(
    sold_stats: Option<&PriceStats>,
    active_stats: Option<&PriceStats>,
) -> Option<PriceComparison> {
    let (sold, active) = (sold_stats?, active_stats?);

    let avg_price_difference = round_to(active.average - sold.average, 2);

    let avg_price_difference_percent = if sold.average == 0.0 {
        0.0
    } else {
        round_to(avg_price_difference / sold.average * 100.0, 1)
    };

    let recommendation = if avg_price_difference < 0.0 {
        Recommendation::Underpriced
    } else if avg_price_difference > 0.0 {
        Recommendation::Overpriced
    } else {
        Recommendation::Fair
    };

    Some(PriceComparison {
        avg_price_difference,
        avg_price_difference_percent,
        recommendation,
    })
}
