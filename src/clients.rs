use crate::config::Settings;
use crate::error::UpstreamError;
use crate::search::SearchQuery;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error};

/// Source of raw search payloads for a query.
#[async_trait]
pub trait ListingSource: Send + Sync {
    async fn fetch(&self, query: &SearchQuery) -> Result<Value, UpstreamError>;
}

pub fn operation_name(sold: bool) -> &'static str {
    if sold {
        "findCompletedItems"
    } else {
        "findItemsByKeywords"
    }
}

// eBay Finding API client
#[derive(Clone)]
pub struct EbayFindingClient {
    http_client: Client,
    app_id: Option<String>,
    base_url: String,
    entries_per_page: u32,
}

impl EbayFindingClient {
    pub fn new(settings: &Settings) -> Result<Self, UpstreamError> {
        let http_client = Client::builder()
            .timeout(settings.request_timeout())
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| {
                error!("Failed to build eBay HTTP client: {}", e);
                UpstreamError::from(e)
            })?;

        Ok(Self {
            http_client,
            app_id: settings
                .ebay_app_id
                .clone()
                .filter(|_| settings.is_ebay_configured()),
            base_url: settings.ebay_finding_api.clone(),
            entries_per_page: settings.max_results_per_page,
        })
    }

    /// Query-string parameters for one Finding API call.
    pub fn build_params(&self, query: &SearchQuery) -> Vec<(String, String)> {
        let mut params: Vec<(String, String)> = vec![
            ("OPERATION-NAME".into(), operation_name(query.sold).into()),
            ("SERVICE-VERSION".into(), "1.0.0".into()),
            ("SECURITY-APPNAME".into(), self.app_id.clone().unwrap_or_default()),
            ("RESPONSE-DATA-FORMAT".into(), "JSON".into()),
            ("REST-PAYLOAD".into(), String::new()),
            ("keywords".into(), query.keywords.clone()),
            (
                "paginationInput.entriesPerPage".into(),
                self.entries_per_page.to_string(),
            ),
        ];

        if let Some(sort) = query.sort {
            params.push(("sortOrder".into(), sort.ebay_sort_order().into()));
        }

        let mut item_filters: Vec<(&str, String)> = Vec::new();
        if query.sold {
            item_filters.push(("SoldItemsOnly", "true".into()));
        }
        if let Some(condition) = query.condition {
            item_filters.push(("Condition", condition.ebay_id().into()));
        }
        if let Some(min_price) = query.min_price {
            item_filters.push(("MinPrice", min_price.to_string()));
        }
        if let Some(max_price) = query.max_price {
            item_filters.push(("MaxPrice", max_price.to_string()));
        }

        for (index, (name, value)) in item_filters.into_iter().enumerate() {
            params.push((format!("itemFilter({}).name", index), name.to_string()));
            params.push((format!("itemFilter({}).value", index), value));
        }

        params
    }
}

#[async_trait]
impl ListingSource for EbayFindingClient {
    async fn fetch(&self, query: &SearchQuery) -> Result<Value, UpstreamError> {
        if self.app_id.is_none() {
            return Err(UpstreamError::NotConfigured);
        }

        debug!(
            "Making eBay API request: operation={}, keywords={}",
            operation_name(query.sold),
            query.keywords
        );

        let response = self
            .http_client
            .get(&self.base_url)
            .query(&self.build_params(query))
            .send()
            .await
            .map_err(|e| {
                error!("eBay API request failed: {}", e);
                UpstreamError::from(e)
            })?;

        if !response.status().is_success() {
            error!("eBay API returned status {}", response.status());
            return Err(UpstreamError::Status(response.status().as_u16()));
        }

        let data: Value = response.json().await?;
        Ok(data)
    }
}
