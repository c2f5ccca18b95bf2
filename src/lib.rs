// Core modules
pub mod item;
pub mod response_parser;
pub mod price_analyzer;
pub mod filters;
pub mod search;
pub mod clients;

// Service plumbing
pub mod config;
pub mod error;
pub mod validators;
pub mod rate_limiter;
pub mod routes;

#[cfg(test)]
mod test_fixtures;

// Re-exports
pub use item::Item;
pub use response_parser::{parse_response, parse_response_report, ParseReport};
pub use price_analyzer::{calculate_price_stats, compare_prices, PriceComparison, PriceStats, Recommendation};
pub use filters::{Condition, SortOrder};
pub use search::{SearchQuery, SearchService};
pub use clients::{EbayFindingClient, ListingSource};
pub use crate::config::Settings;
pub use error::{ApiError, UpstreamError};
pub use routes::{router, AppState};
