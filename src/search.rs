use crate::clients::ListingSource;
use crate::error::UpstreamError;
use crate::filters::{Condition, SortOrder};
use crate::item::Item;
use crate::response_parser::parse_response_report;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub keywords: String,
    pub sold: bool,
    pub condition: Option<Condition>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub sort: Option<SortOrder>,
}

impl SearchQuery {
    pub fn new(keywords: impl Into<String>, sold: bool) -> Self {
        Self {
            keywords: keywords.into(),
            sold,
            condition: None,
            min_price: None,
            max_price: None,
            sort: None,
        }
    }

    pub fn with_condition(mut self, condition: Option<Condition>) -> Self {
        self.condition = condition;
        self
    }

    pub fn with_price_range(mut self, min_price: Option<f64>, max_price: Option<f64>) -> Self {
        self.min_price = min_price;
        self.max_price = max_price;
        self
    }

    pub fn with_sort(mut self, sort: Option<SortOrder>) -> Self {
        self.sort = sort;
        self
    }

    /// Same filters, other listing type.
    pub fn as_sold(&self, sold: bool) -> Self {
        Self {
            sold,
            ..self.clone()
        }
    }
}

/// Runs searches against a listing source and normalizes the results.
#[derive(Clone)]
pub struct SearchService {
    source: Arc<dyn ListingSource>,
}

impl SearchService {
    pub fn new(source: Arc<dyn ListingSource>) -> Self {
        Self { source }
    }

    pub async fn search(&self, query: &SearchQuery) -> Result<Vec<Item>, UpstreamError> {
        let data = self.source.fetch(query).await?;
        let report = parse_response_report(&data, query.sold);

        info!(
            "Search {} '{}': {} items ({} skipped)",
            if query.sold { "sold" } else { "active" },
            query.keywords,
            report.items.len(),
            report.skipped
        );

        Ok(report.items)
    }

    /// Run the sold and active searches concurrently. The first failure
    /// cancels the other search and is returned.
    pub async fn search_concurrent(
        &self,
        sold_query: &SearchQuery,
        active_query: &SearchQuery,
    ) -> Result<(Vec<Item>, Vec<Item>), UpstreamError> {
        tokio::try_join!(self.search(sold_query), self.search(active_query))
    }
}
