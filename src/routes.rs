//! HTTP routes.
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | API info |
//! | `GET` | `/health` | Health check |
//! | `GET` | `/search/sold` | Sold/completed listings with price stats |
//! | `GET` | `/search/active` | Active listings with price stats |
//! | `GET` | `/search/compare` | Sold vs active price comparison |

use crate::config::Settings;
use crate::error::ApiError;
use crate::filters::{Condition, SortOrder};
use crate::item::Item;
use crate::price_analyzer::{calculate_price_stats, compare_prices, PriceComparison, PriceStats};
use crate::rate_limiter::{rate_limit_middleware, RateLimiterState};
use crate::search::{SearchQuery, SearchService};
use crate::validators::{validate_choice, validate_keywords, validate_price};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{middleware, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub search: SearchService,
}

impl AppState {
    pub fn new(settings: Settings, search: SearchService) -> Self {
        Self {
            settings: Arc::new(settings),
            search,
        }
    }
}

pub fn router(state: AppState) -> Router {
    let rate_limiter = Arc::new(RateLimiterState::new(
        state.settings.rate_limit_default_per_minute,
        state.settings.rate_limit_search_per_minute,
    ));

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/search/sold", get(search_sold))
        .route("/search/active", get(search_active))
        .route("/search/compare", get(search_compare))
        .with_state(state)
        .layer(middleware::from_fn_with_state(rate_limiter, rate_limit_middleware))
        .layer(TraceLayer::new_for_http())
}

/// Raw query parameters; validated by [`SearchRequest::from_params`].
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub condition: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub sort: Option<String>,
}

#[derive(Debug, Clone)]
struct SearchRequest {
    keywords: String,
    condition: Option<Condition>,
    min_price: Option<f64>,
    max_price: Option<f64>,
    sort: Option<SortOrder>,
}

impl SearchRequest {
    /// Keywords are checked first, then configuration, then filters.
    fn from_params(settings: &Settings, params: &SearchParams) -> Result<Self, ApiError> {
        let keywords = validate_keywords(
            params.q.as_deref(),
            settings.min_keyword_length,
            settings.max_keyword_length,
        )?;

        if !settings.is_ebay_configured() {
            return Err(ApiError::NotConfigured);
        }

        Ok(Self {
            keywords,
            condition: validate_choice(params.condition.as_deref(), "condition")?,
            min_price: validate_price(params.min_price.as_deref(), "min_price")?,
            max_price: validate_price(params.max_price.as_deref(), "max_price")?,
            sort: validate_choice(params.sort.as_deref(), "sort")?,
        })
    }

    fn query(&self, sold: bool) -> SearchQuery {
        SearchQuery::new(self.keywords.clone(), sold)
            .with_condition(self.condition)
            .with_price_range(self.min_price, self.max_price)
            .with_sort(self.sort)
    }
}

#[derive(Debug, Default, Serialize)]
pub struct FiltersResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortOrder>,
}

/// Echo of the supplied filters, or `None` when there were none.
pub fn build_filters_response(
    condition: Option<Condition>,
    min_price: Option<f64>,
    max_price: Option<f64>,
    sort: Option<SortOrder>,
) -> Option<FiltersResponse> {
    if condition.is_none() && min_price.is_none() && max_price.is_none() && sort.is_none() {
        return None;
    }

    Some(FiltersResponse {
        condition,
        min_price,
        max_price,
        sort,
    })
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    #[serde(rename = "type")]
    pub listing_type: &'static str,
    pub filters: Option<FiltersResponse>,
    pub stats: Option<PriceStats>,
    pub items: Vec<Item>,
}

#[derive(Debug, Serialize)]
pub struct SideSummary {
    pub stats: Option<PriceStats>,
    pub sample_count: usize,
}

#[derive(Debug, Serialize)]
pub struct CompareResponse {
    pub query: String,
    pub filters: Option<FiltersResponse>,
    pub sold: SideSummary,
    pub active: SideSummary,
    pub comparison: Option<PriceComparison>,
}

async fn index() -> impl IntoResponse {
    Json(json!({
        "name": "Snout",
        "description": "eBay Reseller Price Lookup API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "/search/sold": "Search sold/completed listings",
            "/search/active": "Search active listings",
            "/search/compare": "Compare sold vs active prices",
        },
        "filters": {
            "condition": Condition::all().iter().map(Condition::as_str).collect::<Vec<_>>(),
            "min_price": "Minimum price (float)",
            "max_price": "Maximum price (float)",
        },
        "sort_options": SortOrder::all().iter().map(SortOrder::as_str).collect::<Vec<_>>(),
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "ebay_configured": state.settings.is_ebay_configured(),
    }))
}

async fn search_sold(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    execute_search(&state, &params, true).await.map(Json)
}

async fn search_active(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    execute_search(&state, &params, false).await.map(Json)
}

async fn execute_search(
    state: &AppState,
    params: &SearchParams,
    sold: bool,
) -> Result<SearchResponse, ApiError> {
    let request = SearchRequest::from_params(&state.settings, params)?;
    info!(
        "Search {}: keywords={}, filters={:?}",
        if sold { "sold" } else { "active" },
        request.keywords,
        request
    );

    let items = state.search.search(&request.query(sold)).await?;
    let stats = calculate_price_stats(&items);

    Ok(SearchResponse {
        query: request.keywords,
        listing_type: if sold { "sold" } else { "active" },
        filters: build_filters_response(
            request.condition,
            request.min_price,
            request.max_price,
            request.sort,
        ),
        stats,
        items,
    })
}

async fn search_compare(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<CompareResponse>, ApiError> {
    let request = SearchRequest::from_params(&state.settings, &params)?;
    info!("Compare prices: keywords={}, filters={:?}", request.keywords, request);

    let (sold_items, active_items) = state
        .search
        .search_concurrent(&request.query(true), &request.query(false))
        .await?;

    let sold_stats = calculate_price_stats(&sold_items);
    let active_stats = calculate_price_stats(&active_items);
    let comparison = compare_prices(sold_stats.as_ref(), active_stats.as_ref());

    Ok(Json(CompareResponse {
        query: request.keywords,
        filters: build_filters_response(request.condition, request.min_price, request.max_price, None),
        sold: SideSummary {
            stats: sold_stats,
            sample_count: sold_items.len(),
        },
        active: SideSummary {
            stats: active_stats,
            sample_count: active_items.len(),
        },
        comparison,
    }))
}
